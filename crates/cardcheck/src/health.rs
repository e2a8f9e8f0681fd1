//! Structural page health assertions, evaluated in the live rendering
//! context after the page settles.

use anyhow::{Result, anyhow};
use chromiumoxide::page::Page;

/// Pixels of horizontal scroll allowed before the overflow check fails.
/// Exactly this much over the viewport still passes.
pub const OVERFLOW_TOLERANCE_PX: i64 = 1;

/// Asserts that every image in the document reported a completed load with
/// a non-zero intrinsic width. Violators are collected by source attribute
/// and surfaced together, so one run reveals the full broken set.
///
/// # Errors
///
/// Returns an error naming every broken image source, or an evaluation
/// error if the probe cannot run.
pub async fn assert_no_broken_images(page: &Page) -> Result<()> {
    let broken: Vec<String> = page
        .evaluate(BROKEN_IMAGES_PROBE)
        .await?
        .into_value()?;

    if broken.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Broken images found: {}", broken.join(", ")))
    }
}

/// Asserts that the document's scrollable width does not exceed the
/// viewport's inner width by more than [`OVERFLOW_TOLERANCE_PX`].
///
/// # Errors
///
/// Returns an error reporting the overflow amount, or an evaluation error
/// if the probe cannot run.
pub async fn assert_no_horizontal_overflow(page: &Page) -> Result<()> {
    let overflow_px: i64 = page
        .evaluate(HORIZONTAL_OVERFLOW_PROBE)
        .await?
        .into_value()?;

    if overflow_px > OVERFLOW_TOLERANCE_PX {
        Err(anyhow!(
            "Horizontal overflow of {overflow_px}px exceeds the {OVERFLOW_TOLERANCE_PX}px tolerance"
        ))
    } else {
        Ok(())
    }
}

const BROKEN_IMAGES_PROBE: &str = r"(function(){
    return Array.from(document.images)
        .filter(function(img){ return !img.complete || img.naturalWidth === 0; })
        .map(function(img){ return img.getAttribute('src') || img.src; });
})()";

const HORIZONTAL_OVERFLOW_PROBE: &str = r"(function(){
    return document.documentElement.scrollWidth - window.innerWidth;
})()";
