//! Unit discovery: scanning the catalog root for testable SKU directories.

use std::fs::read_dir;
use std::path::Path;

use anyhow::{Context as _, Result};

/// SKU directory names are `RG-` followed by exactly four digits.
const SKU_PREFIX: &str = "RG-";
const SKU_DIGITS: usize = 4;

/// Entry document a unit directory must contain to be testable.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Returns whether a directory name is a well-formed SKU.
#[must_use]
pub fn is_sku_name(name: &str) -> bool {
    name.strip_prefix(SKU_PREFIX)
        .is_some_and(|digits| digits.len() == SKU_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Scans `root` for testable units: directories whose name is a well-formed
/// SKU and which contain the entry document. The result is sorted
/// lexicographically and deduplicated so collection order is deterministic.
///
/// The entry-document check is what makes a unit testable; a name match
/// alone is not enough. There is no partial-discovery fallback: any
/// filesystem error aborts the whole run before a single case is generated.
///
/// # Errors
///
/// Returns an error if the root directory or any of its entries cannot be
/// read.
pub fn discover_units(root: &Path) -> Result<Vec<String>> {
    let entries = read_dir(root)
        .with_context(|| format!("Failed to read catalog root {}", root.display()))?;

    let mut units = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read entry under {}", root.display()))?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !is_sku_name(&name) {
            continue;
        }
        if !entry.path().join(ENTRY_DOCUMENT).is_file() {
            continue;
        }
        units.push(name);
    }

    units.sort_unstable();
    units.dedup();
    log::debug!("Discovered {} unit(s) under {}", units.len(), root.display());
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, create_dir};

    #[test]
    fn sku_names_require_prefix_and_exactly_four_digits() {
        assert!(is_sku_name("RG-0001"));
        assert!(is_sku_name("RG-9999"));
        assert!(!is_sku_name("RG-001"));
        assert!(!is_sku_name("RG-00011"));
        assert!(!is_sku_name("RG-00a1"));
        assert!(!is_sku_name("XX-0001"));
        assert!(!is_sku_name("rg-0001"));
        assert!(!is_sku_name("RG-"));
    }

    #[test]
    fn discovery_requires_directory_name_and_entry_document() -> Result<()> {
        let root = tempfile::tempdir()?;

        // Included: well-formed SKU directory with an entry document.
        create_dir(root.path().join("RG-0002"))?;
        File::create(root.path().join("RG-0002").join(ENTRY_DOCUMENT))?;
        create_dir(root.path().join("RG-0001"))?;
        File::create(root.path().join("RG-0001").join(ENTRY_DOCUMENT))?;

        // Excluded: name matches but no entry document.
        create_dir(root.path().join("RG-0003"))?;

        // Excluded: entry document present but the name is not a SKU.
        create_dir(root.path().join("drafts"))?;
        File::create(root.path().join("drafts").join(ENTRY_DOCUMENT))?;

        // Excluded: SKU-named plain file, not a directory.
        File::create(root.path().join("RG-0004"))?;

        let units = discover_units(root.path())?;
        assert_eq!(units, vec!["RG-0001".to_owned(), "RG-0002".to_owned()]);
        Ok(())
    }

    #[test]
    fn discovery_output_is_sorted() -> Result<()> {
        let root = tempfile::tempdir()?;
        for sku in ["RG-0107", "RG-0003", "RG-0042"] {
            create_dir(root.path().join(sku))?;
            File::create(root.path().join(sku).join(ENTRY_DOCUMENT))?;
        }
        let units = discover_units(root.path())?;
        assert_eq!(units, vec!["RG-0003", "RG-0042", "RG-0107"]);
        Ok(())
    }

    #[test]
    fn missing_root_is_fatal() {
        let missing = Path::new("/nonexistent/cardcheck-catalog");
        assert!(discover_units(missing).is_err());
    }
}
