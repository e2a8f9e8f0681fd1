//! Test matrix generation and the artifact-path function.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::viewport::Viewport;

/// Which face of the flip card a case exercises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    /// Requires a successful flip transition before asserting.
    Back,
}

impl Side {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

/// One generated test case: exactly one (unit, viewport, side) triple.
#[derive(Clone, Debug, Serialize)]
pub struct CaseSpec {
    pub unit: String,
    pub viewport: Viewport,
    pub side: Side,
}

impl CaseSpec {
    /// Case label used in logs and the run report.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {} {}", self.unit, self.viewport.name, self.side.as_str())
    }
}

/// Generates one case per (unit x viewport x side), unit-major, front
/// before back. Every discovered unit appears in the matrix; status never
/// removes a case, it only changes which assertions the case performs.
#[must_use]
pub fn generate_cases(units: &[String], viewports: &[Viewport]) -> Vec<CaseSpec> {
    let mut cases = Vec::with_capacity(units.len() * viewports.len() * 2);
    for unit in units {
        for viewport in viewports {
            for side in [Side::Front, Side::Back] {
                cases.push(CaseSpec {
                    unit: unit.clone(),
                    viewport: *viewport,
                    side,
                });
            }
        }
    }
    cases
}

/// Deterministic artifact path for a case:
/// `<artifact-root>/<unit>/<viewport>-<side>.png`.
///
/// Injective over (unit, viewport, side), so no two cases ever write the
/// same file.
#[must_use]
pub fn artifact_path(artifact_root: &Path, unit: &str, viewport: &Viewport, side: Side) -> PathBuf {
    artifact_root
        .join(unit)
        .join(format!("{}-{}.png", viewport.name, side.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport;
    use std::collections::HashSet;

    fn sample_units() -> Vec<String> {
        vec!["RG-0001".to_owned(), "RG-0002".to_owned()]
    }

    #[test]
    fn two_units_two_viewports_yield_eight_cases() {
        let cases = generate_cases(&sample_units(), viewport::all());
        assert_eq!(cases.len(), 8);

        // Unit-major, viewport order preserved, front before back.
        let labels: Vec<String> = cases.iter().map(CaseSpec::label).collect();
        assert_eq!(
            labels,
            vec![
                "RG-0001 desktop front",
                "RG-0001 desktop back",
                "RG-0001 mobile front",
                "RG-0001 mobile back",
                "RG-0002 desktop front",
                "RG-0002 desktop back",
                "RG-0002 mobile front",
                "RG-0002 mobile back",
            ]
        );
    }

    #[test]
    fn artifact_paths_are_unique_per_case() {
        let root = Path::new("qa-artifacts/screenshots");
        let cases = generate_cases(&sample_units(), viewport::all());
        let paths: HashSet<PathBuf> = cases
            .iter()
            .map(|case| artifact_path(root, &case.unit, &case.viewport, case.side))
            .collect();
        assert_eq!(paths.len(), cases.len());
    }

    #[test]
    fn artifact_path_shape() {
        let path = artifact_path(
            Path::new("out"),
            "RG-0001",
            &viewport::DESKTOP,
            Side::Front,
        );
        assert_eq!(path, Path::new("out/RG-0001/desktop-front.png"));
    }

    #[test]
    fn no_units_means_no_cases() {
        assert!(generate_cases(&[], viewport::all()).is_empty());
    }
}
