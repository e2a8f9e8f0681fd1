//! Runtime configuration for the cardcheck harness.
//!
//! Configuration is loaded from environment variables or constructed
//! programmatically. The recognized surface covers the content-server base
//! URL, the layered timeouts, headless/headed rendering, worker parallelism
//! (accepted but clamped to one worker) and the artifact root.

use core::time::Duration;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use url::Url;

use crate::viewport::{self, Viewport};

/// Runtime configuration for a harness run.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Catalog root containing the `RG-####` unit directories.
    pub catalog_root: PathBuf,
    /// Content-server origin. When absent, units are loaded via file URLs.
    pub base_url: Option<Url>,
    /// Root directory for screenshot artifacts and the JSON report.
    pub artifact_root: PathBuf,
    /// Upper bound for any single browser interaction, in milliseconds.
    pub action_timeout_ms: u64,
    /// Upper bound for a page load, in milliseconds.
    pub nav_timeout_ms: u64,
    /// Upper bound for a whole test case, in milliseconds.
    pub case_timeout_ms: u64,
    /// Whether Chrome runs headless.
    pub headless: bool,
    /// Worker parallelism. Always clamped to 1; the suite is sequential
    /// so screenshot I/O and the status cache stay free of races.
    pub workers: usize,
    /// Devtools port for the managed Chrome instance.
    pub debug_port: u16,
    /// Viewport table the matrix is generated against.
    pub viewports: Vec<Viewport>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from("."),
            base_url: None,
            artifact_root: PathBuf::from("qa-artifacts").join("screenshots"),
            action_timeout_ms: 10_000,
            nav_timeout_ms: 30_000,
            case_timeout_ms: 60_000,
            headless: true,
            workers: 1,
            debug_port: 9311,
            viewports: viewport::all().to_vec(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CARDCHECK_ROOT`: catalog root directory (default: current dir)
    /// - `CARDCHECK_BASE_URL`: content-server origin; unset means file URLs
    /// - `CARDCHECK_ARTIFACT_ROOT`: artifact root directory
    /// - `CARDCHECK_ACTION_TIMEOUT_MS` / `CARDCHECK_NAV_TIMEOUT_MS` /
    ///   `CARDCHECK_CASE_TIMEOUT_MS`: layered timeouts
    /// - `CARDCHECK_HEADLESS`: set to "0" to run headed (default: headless)
    /// - `CARDCHECK_WORKERS`: accepted for compatibility, clamped to 1
    /// - `CARDCHECK_DEBUG_PORT`: devtools port for the managed Chrome
    /// - `CARDCHECK_DESKTOP_WIDTH` / `CARDCHECK_DESKTOP_HEIGHT` /
    ///   `CARDCHECK_MOBILE_WIDTH` / `CARDCHECK_MOBILE_HEIGHT`:
    ///   viewport dimension overrides
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_root: env::var("CARDCHECK_ROOT")
                .map_or(defaults.catalog_root, PathBuf::from),
            base_url: env::var("CARDCHECK_BASE_URL")
                .ok()
                .and_then(|raw| Url::parse(&raw).ok()),
            artifact_root: env::var("CARDCHECK_ARTIFACT_ROOT")
                .map_or(defaults.artifact_root, PathBuf::from),
            action_timeout_ms: parse_millis(
                env::var("CARDCHECK_ACTION_TIMEOUT_MS").ok(),
                defaults.action_timeout_ms,
            ),
            nav_timeout_ms: parse_millis(
                env::var("CARDCHECK_NAV_TIMEOUT_MS").ok(),
                defaults.nav_timeout_ms,
            ),
            case_timeout_ms: parse_millis(
                env::var("CARDCHECK_CASE_TIMEOUT_MS").ok(),
                defaults.case_timeout_ms,
            ),
            headless: env::var("CARDCHECK_HEADLESS").ok().as_deref() != Some("0"),
            workers: clamp_workers(env::var("CARDCHECK_WORKERS").ok()),
            debug_port: env::var("CARDCHECK_DEBUG_PORT")
                .ok()
                .and_then(|val| val.parse::<u16>().ok())
                .unwrap_or(defaults.debug_port),
            viewports: viewports_from_env(),
        }
    }

    /// Per-interaction timeout as a `Duration`.
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Per-navigation timeout as a `Duration`.
    #[must_use]
    pub const fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    /// Per-case timeout as a `Duration`.
    #[must_use]
    pub const fn case_timeout(&self) -> Duration {
        Duration::from_millis(self.case_timeout_ms)
    }

    /// Resolves the URL a unit's entry document is served from.
    ///
    /// With a configured base URL the unit is addressed at `<base>/<unit>/`;
    /// without one the entry document is loaded directly via a file URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit segment cannot be joined onto the base
    /// URL, or if the catalog root does not form a valid file path.
    pub fn page_url(&self, unit: &str) -> Result<Url> {
        if let Some(base) = &self.base_url {
            return base
                .join(&format!("{unit}/"))
                .with_context(|| format!("Cannot join unit {unit} onto base URL {base}"));
        }
        file_url(&self.catalog_root.join(unit).join("index.html"))
    }
}

/// Converts a file path to a file URL.
///
/// # Errors
///
/// Returns an error if the path cannot be converted to a valid file URL.
pub fn file_url(path: &Path) -> Result<Url> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&canonical)
        .map_err(|()| anyhow::anyhow!("Invalid file path for URL: {}", canonical.display()))
}

fn viewports_from_env() -> Vec<Viewport> {
    viewport::all()
        .iter()
        .map(|vp| {
            let prefix = vp.name.to_uppercase();
            Viewport {
                width: parse_dimension(
                    env::var(format!("CARDCHECK_{prefix}_WIDTH")).ok(),
                    vp.width,
                ),
                height: parse_dimension(
                    env::var(format!("CARDCHECK_{prefix}_HEIGHT")).ok(),
                    vp.height,
                ),
                ..*vp
            }
        })
        .collect()
}

fn parse_dimension(raw: Option<String>, default_px: u32) -> u32 {
    raw.and_then(|val| val.parse::<u32>().ok())
        .filter(|px| *px > 0)
        .unwrap_or(default_px)
}

fn parse_millis(raw: Option<String>, default_ms: u64) -> u64 {
    raw.and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default_ms)
        .max(1)
}

fn clamp_workers(raw: Option<String>) -> usize {
    let requested = raw.and_then(|val| val.parse::<usize>().ok()).unwrap_or(1);
    if requested > 1 {
        log::warn!("CARDCHECK_WORKERS={requested} requested; suite runs sequentially, using 1");
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timeouts() {
        let config = HarnessConfig::default();
        assert_eq!(config.action_timeout(), Duration::from_secs(10));
        assert_eq!(config.nav_timeout(), Duration::from_secs(30));
        assert_eq!(config.case_timeout(), Duration::from_secs(60));
        assert!(config.headless);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn millis_parsing_falls_back_on_garbage() {
        assert_eq!(parse_millis(Some("2500".to_owned()), 100), 2500);
        assert_eq!(parse_millis(Some("fast".to_owned()), 100), 100);
        assert_eq!(parse_millis(None, 100), 100);
        // Zero would make every await fail instantly.
        assert_eq!(parse_millis(Some("0".to_owned()), 100), 1);
    }

    #[test]
    fn dimension_overrides_reject_zero_and_garbage() {
        assert_eq!(parse_dimension(Some("1920".to_owned()), 1440), 1920);
        assert_eq!(parse_dimension(Some("0".to_owned()), 1440), 1440);
        assert_eq!(parse_dimension(Some("wide".to_owned()), 1440), 1440);
        assert_eq!(parse_dimension(None, 1440), 1440);
    }

    #[test]
    fn default_viewport_table_is_carried() {
        let config = HarnessConfig::default();
        assert_eq!(config.viewports, viewport::all().to_vec());
    }

    #[test]
    fn workers_always_clamp_to_one() {
        assert_eq!(clamp_workers(None), 1);
        assert_eq!(clamp_workers(Some("8".to_owned())), 1);
        assert_eq!(clamp_workers(Some("not-a-number".to_owned())), 1);
    }

    #[test]
    fn page_url_prefers_base_url() -> Result<()> {
        let config = HarnessConfig {
            base_url: Some(Url::parse("http://127.0.0.1:4173/")?),
            ..HarnessConfig::default()
        };
        let url = config.page_url("RG-0007")?;
        assert_eq!(url.as_str(), "http://127.0.0.1:4173/RG-0007/");
        Ok(())
    }

    #[test]
    fn page_url_falls_back_to_file_url() -> Result<()> {
        let config = HarnessConfig {
            catalog_root: PathBuf::from("/srv/catalog"),
            ..HarnessConfig::default()
        };
        let url = config.page_url("RG-0001")?;
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/srv/catalog/RG-0001/index.html"));
        Ok(())
    }
}
