//! Navigation, viewport application and settle points for a live page.

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use catalog_harness::viewport::Viewport;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::page::Page;
use tokio::time::sleep;
use url::Url;

/// Poll interval for settle loops.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Applies a viewport via a device-metrics override.
///
/// # Errors
///
/// Returns an error if the override command fails.
pub async fn set_viewport(page: &Page, viewport: &Viewport) -> Result<()> {
    let params = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(viewport.width))
        .height(i64::from(viewport.height))
        .device_scale_factor(1.0)
        .mobile(viewport.mobile)
        .build()
        .map_err(|err| anyhow!("Failed to build viewport params: {err}"))?;
    page.execute(params).await?;
    Ok(())
}

/// Starts navigation to `url`. The caller bounds this with the navigation
/// timeout; no deadline is applied here.
///
/// # Errors
///
/// Returns an error if the navigation command fails.
pub async fn goto(page: &Page, url: &Url) -> Result<()> {
    page.goto(url.as_str())
        .await
        .map_err(|err| anyhow!("Navigation failed for {url}: {err}"))?;
    Ok(())
}

/// Waits until the document is interactive (DOM parsed; subresources may
/// still be loading). Returns `false` when the budget runs out.
///
/// # Errors
///
/// Returns an error if probe evaluation fails.
pub async fn wait_for_document_interactive(page: &Page, budget: Duration) -> Result<bool> {
    wait_for_condition(page, DOCUMENT_INTERACTIVE_PROBE, budget).await
}

/// Waits for the page to reach network idle, approximated by the document
/// being fully loaded with every image settled. Returns `false` when the
/// budget runs out, so the caller can report a timeout rather than an
/// assertion failure.
///
/// # Errors
///
/// Returns an error if probe evaluation fails.
pub async fn wait_for_network_idle(page: &Page, budget: Duration) -> Result<bool> {
    wait_for_condition(page, NETWORK_IDLE_PROBE, budget).await
}

/// Polls a boolean probe expression until it holds or the budget runs out.
///
/// # Errors
///
/// Returns an error if probe evaluation fails.
pub async fn wait_for_condition(page: &Page, probe: &str, budget: Duration) -> Result<bool> {
    let start = Instant::now();
    loop {
        if eval_bool(page, probe).await? {
            return Ok(true);
        }
        if start.elapsed() >= budget {
            return Ok(false);
        }
        sleep(POLL_INTERVAL.min(budget)).await;
    }
}

/// Evaluates a boolean expression in the page's live rendering context.
///
/// # Errors
///
/// Returns an error if evaluation fails or yields a non-boolean.
pub async fn eval_bool(page: &Page, expression: &str) -> Result<bool> {
    Ok(page.evaluate(expression).await?.into_value::<bool>()?)
}

const DOCUMENT_INTERACTIVE_PROBE: &str = r"(function(){
    return document.readyState === 'interactive' || document.readyState === 'complete';
})()";

const NETWORK_IDLE_PROBE: &str = r"(function(){
    if (document.readyState !== 'complete') { return false; }
    return Array.from(document.images).every(function(img){ return img.complete; });
})()";
