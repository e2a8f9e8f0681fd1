//! Per-unit sale status, resolved lazily from `status.json` and memoized.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File a unit may carry next to its entry document to mark it sold.
pub const STATUS_DOCUMENT: &str = "status.json";

/// Sale status of a unit, derived from its metadata document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Unit is purchasable; the page must show an enabled purchase action.
    Available,
    /// Unit is sold; the page must show a sold marker and no purchase action.
    Sold,
}

#[derive(Deserialize)]
struct StatusDocument {
    status: Option<String>,
}

/// Memoizing status resolver, scoped to one run.
///
/// Resolution is infallible by design: a missing, unreadable or malformed
/// metadata document classifies the unit as [`Status::Available`]. Metadata
/// corruption therefore silently defaults to the more permissive state, and
/// callers can never observe a resolver error. Each unit is read from disk
/// at most once; repeated resolution is a pure cache lookup.
#[derive(Debug)]
pub struct StatusCache {
    catalog_root: PathBuf,
    resolved: HashMap<String, Status>,
}

impl StatusCache {
    /// Creates a cache rooted at the catalog directory.
    #[must_use]
    pub fn new(catalog_root: impl Into<PathBuf>) -> Self {
        Self {
            catalog_root: catalog_root.into(),
            resolved: HashMap::new(),
        }
    }

    /// Resolves the status of `unit`, reading disk only on the first call.
    pub fn resolve(&mut self, unit: &str) -> Status {
        if let Some(status) = self.resolved.get(unit) {
            return *status;
        }
        let status = read_status(&self.catalog_root.join(unit).join(STATUS_DOCUMENT));
        log::debug!("Resolved {unit} as {status:?}");
        self.resolved.insert(unit.to_owned(), status);
        status
    }
}

/// Fail-open read of a status document: only a parseable document whose
/// `status` field is the literal `"sold"` yields [`Status::Sold`].
fn read_status(path: &Path) -> Status {
    let Ok(bytes) = fs::read(path) else {
        return Status::Available;
    };
    match serde_json::from_slice::<StatusDocument>(&bytes) {
        Ok(doc) if doc.status.as_deref() == Some("sold") => Status::Sold,
        Ok(_) | Err(_) => Status::Available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs::{create_dir, remove_file, write};

    fn unit_dir(root: &Path, unit: &str) -> Result<PathBuf> {
        let dir = root.join(unit);
        create_dir(&dir)?;
        Ok(dir)
    }

    #[test]
    fn sold_literal_resolves_sold() -> Result<()> {
        let root = tempfile::tempdir()?;
        let dir = unit_dir(root.path(), "RG-0002")?;
        write(dir.join(STATUS_DOCUMENT), br#"{"status":"sold"}"#)?;

        let mut cache = StatusCache::new(root.path());
        assert_eq!(cache.resolve("RG-0002"), Status::Sold);
        Ok(())
    }

    #[test]
    fn fail_open_law() -> Result<()> {
        let root = tempfile::tempdir()?;
        let cases: &[(&str, Option<&[u8]>)] = &[
            ("RG-0001", None),                                  // missing file
            ("RG-0002", Some(b"")),                             // empty file
            ("RG-0003", Some(b"{not json")),                    // malformed
            ("RG-0004", Some(br#"{"status":"listed"}"#)),       // other value
            ("RG-0005", Some(br#"{"condition":"mint"}"#)),      // absent field
            ("RG-0006", Some(br#"{"status":"SOLD"}"#)),         // wrong case
        ];

        let mut cache = StatusCache::new(root.path());
        for (unit, body) in cases {
            let dir = unit_dir(root.path(), unit)?;
            if let Some(body) = body {
                write(dir.join(STATUS_DOCUMENT), body)?;
            }
            assert_eq!(cache.resolve(unit), Status::Available, "unit {unit}");
        }
        Ok(())
    }

    #[test]
    fn resolution_is_cached_not_reread() -> Result<()> {
        let root = tempfile::tempdir()?;
        let dir = unit_dir(root.path(), "RG-0010")?;
        let doc = dir.join(STATUS_DOCUMENT);
        write(&doc, br#"{"status":"sold"}"#)?;

        let mut cache = StatusCache::new(root.path());
        assert_eq!(cache.resolve("RG-0010"), Status::Sold);

        // Deleting the document must not change the cached classification.
        remove_file(&doc)?;
        assert_eq!(cache.resolve("RG-0010"), Status::Sold);
        Ok(())
    }

    #[test]
    fn late_metadata_does_not_flip_a_cached_unit() -> Result<()> {
        let root = tempfile::tempdir()?;
        let dir = unit_dir(root.path(), "RG-0011")?;

        let mut cache = StatusCache::new(root.path());
        assert_eq!(cache.resolve("RG-0011"), Status::Available);

        write(dir.join(STATUS_DOCUMENT), br#"{"status":"sold"}"#)?;
        assert_eq!(cache.resolve("RG-0011"), Status::Available);
        Ok(())
    }
}
