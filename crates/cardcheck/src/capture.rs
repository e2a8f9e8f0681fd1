//! Screenshot capture pipeline: one full-page PNG per (unit, viewport,
//! side) at a deterministic path, overwriting any prior artifact.

use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use catalog_harness::matrix::{Side, artifact_path};
use catalog_harness::viewport::Viewport;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page;

/// Captures a full-page screenshot for a case and writes it to
/// `<artifact-root>/<unit>/<viewport>-<side>.png`.
///
/// Directory creation is idempotent and a prior artifact at the path is
/// overwritten. The PNG payload is decode-validated before anything is
/// written, so a truncated CDP response never replaces a good artifact.
///
/// # Errors
///
/// Returns an error if the screenshot command, base64 decoding, PNG
/// validation or file I/O fails.
pub async fn capture(
    page: &Page,
    artifact_root: &Path,
    unit: &str,
    viewport: &Viewport,
    side: Side,
) -> Result<PathBuf> {
    let out_dir = artifact_root.join(unit);
    create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create artifact dir {}", out_dir.display()))?;

    let params = CaptureScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .from_surface(true)
        .capture_beyond_viewport(true)
        .build();
    let response = page.execute(params).await?;
    let base64_str: &str = response.data.as_ref();
    let bytes = BASE64_STANDARD
        .decode(base64_str)
        .map_err(|err| anyhow!("Failed to decode base64 screenshot: {err}"))?;

    let decoded = image::load_from_memory(&bytes)
        .context("Captured screenshot is not a decodable image")?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(anyhow!("Captured screenshot has zero dimensions"));
    }

    let path = artifact_path(artifact_root, unit, viewport, side);
    write(&path, &bytes)
        .with_context(|| format!("Failed to write screenshot to {}", path.display()))?;
    log::debug!(
        "Captured {}x{} screenshot to {}",
        decoded.width(),
        decoded.height(),
        path.display()
    );
    Ok(path)
}
