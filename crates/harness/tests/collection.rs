//! Collection-time flow: discovery, status resolution and matrix
//! generation composed together, no browser involved.

use std::fs::{create_dir, write};

use anyhow::Result;
use catalog_harness::discovery::discover_units;
use catalog_harness::matrix::{Side, generate_cases};
use catalog_harness::status::{Status, StatusCache};
use catalog_harness::viewport;

#[test]
fn two_unit_catalog_collects_into_eight_status_gated_cases() -> Result<()> {
    let root = tempfile::tempdir()?;

    create_dir(root.path().join("RG-0001"))?;
    write(root.path().join("RG-0001").join("index.html"), "<html></html>")?;

    create_dir(root.path().join("RG-0002"))?;
    write(root.path().join("RG-0002").join("index.html"), "<html></html>")?;
    write(
        root.path().join("RG-0002").join("status.json"),
        br#"{"status":"sold"}"#,
    )?;

    // A lookalike that must not join the matrix: no entry document.
    create_dir(root.path().join("RG-0003"))?;

    let units = discover_units(root.path())?;
    assert_eq!(units, vec!["RG-0001", "RG-0002"]);

    let cases = generate_cases(&units, viewport::all());
    assert_eq!(cases.len(), 8);

    // Status gates assertions per unit but never removes a case.
    let mut statuses = StatusCache::new(root.path());
    for case in &cases {
        let status = statuses.resolve(&case.unit);
        match case.unit.as_str() {
            "RG-0001" => assert_eq!(status, Status::Available),
            "RG-0002" => assert_eq!(status, Status::Sold),
            other => return Err(anyhow::anyhow!("unexpected unit {other}")),
        }
    }

    // Both sides of both viewports are present for each unit.
    for unit in &units {
        let sides: Vec<Side> = cases
            .iter()
            .filter(|case| &case.unit == unit)
            .map(|case| case.side)
            .collect();
        assert_eq!(sides.len(), 4);
        assert_eq!(sides.iter().filter(|side| **side == Side::Front).count(), 2);
        assert_eq!(sides.iter().filter(|side| **side == Side::Back).count(), 2);
    }
    Ok(())
}
