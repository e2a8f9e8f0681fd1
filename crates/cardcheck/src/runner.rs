//! The sequential case runner.
//!
//! Cases run strictly one at a time: each owns a fresh page for its
//! duration and releases it on completion either way, which keeps
//! screenshot I/O and the status cache free of races. Timeouts are
//! layered per action, per navigation and per case; exceeding any fails
//! that case alone and never cancels its siblings.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use catalog_harness::config::HarnessConfig;
use catalog_harness::discovery::discover_units;
use catalog_harness::matrix::{CaseSpec, Side, generate_cases};
use catalog_harness::report::{CaseFailure, CaseOutcome, RunReport};
use catalog_harness::status::{Status, StatusCache};
use chromiumoxide::page::Page;
use tokio::time::timeout;

use crate::browser::{BrowserWithHandler, start_and_connect_chrome};
use crate::capture::capture;
use crate::expectations::assert_front_state;
use crate::flip::flip_card;
use crate::health::{assert_no_broken_images, assert_no_horizontal_overflow};
use crate::page::{goto, set_viewport, wait_for_document_interactive, wait_for_network_idle};

/// File name of the machine-readable report under the artifact root.
pub const RESULTS_FILE: &str = "results.json";

/// Runs the whole suite: discovery, matrix generation, sequential case
/// execution, summary logging and JSON report.
///
/// Discovery errors are fatal and abort before any case is generated.
/// Individual case failures are collected into the report instead.
///
/// # Errors
///
/// Returns an error if discovery fails, Chrome cannot be started or the
/// report cannot be written.
pub async fn run_suite(config: &HarnessConfig) -> Result<RunReport> {
    let units = discover_units(&config.catalog_root)?;
    let mut statuses = StatusCache::new(&config.catalog_root);
    let cases = generate_cases(&units, &config.viewports);
    log::info!(
        "Generated {} case(s) from {} unit(s)",
        cases.len(),
        units.len()
    );

    let browser = start_and_connect_chrome(config).await?;

    let mut report = RunReport::default();
    for case in cases {
        // Resolution gates which assertions the case performs; the cache
        // reads disk at most once per unit across the whole matrix.
        let status = statuses.resolve(&case.unit);
        let start = Instant::now();

        let verdict = timeout(
            config.case_timeout(),
            run_case(&browser, config, &case, status),
        )
        .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let outcome = match verdict {
            Ok(Ok(artifact)) => {
                log::info!("✓ {} ({duration_ms}ms)", case.label());
                CaseOutcome::passed(case, status, artifact, duration_ms)
            }
            Ok(Err(failure)) => {
                log::error!("✗ {} [{:?}] {}", case.label(), failure.kind, failure.message);
                CaseOutcome::failed(case, status, failure, duration_ms)
            }
            Err(_) => {
                let failure = CaseFailure::timeout(format!(
                    "Case exceeded the {:?} case timeout",
                    config.case_timeout()
                ));
                log::error!("✗ {} [{:?}] {}", case.label(), failure.kind, failure.message);
                CaseOutcome::failed(case, status, failure, duration_ms)
            }
        };
        report.push(outcome);
    }

    report.log_summary();
    report.write_json(&config.artifact_root.join(RESULTS_FILE))?;
    Ok(report)
}

/// Runs one case on a fresh page, closing the page on completion either
/// way.
async fn run_case(
    browser: &BrowserWithHandler,
    config: &HarnessConfig,
    case: &CaseSpec,
    status: Status,
) -> Result<PathBuf, CaseFailure> {
    let page = browser
        .new_page()
        .await
        .map_err(CaseFailure::infrastructure)?;

    let result = execute_case(&page, config, case, status).await;

    // Always close the page to prevent Chrome tab accumulation
    let _ignore_close_error = page.close().await;

    result
}

/// Fixed per-case order: viewport, navigation, side-specific work, network
/// idle, both health assertions, capture.
async fn execute_case(
    page: &Page,
    config: &HarnessConfig,
    case: &CaseSpec,
    status: Status,
) -> Result<PathBuf, CaseFailure> {
    let action = config.action_timeout();

    step("Viewport override", action, set_viewport(page, &case.viewport))
        .await
        .map_err(StepError::into_infrastructure)?;

    let url = config
        .page_url(&case.unit)
        .map_err(CaseFailure::infrastructure)?;
    step("Navigation", config.nav_timeout(), goto(page, &url))
        .await
        .map_err(StepError::into_infrastructure)?;
    if !wait_for_document_interactive(page, config.nav_timeout())
        .await
        .map_err(CaseFailure::infrastructure)?
    {
        return Err(CaseFailure::timeout(format!(
            "Document not interactive within {:?} for {url}",
            config.nav_timeout()
        )));
    }

    match case.side {
        Side::Front => {
            step("Front assertions", action, assert_front_state(page, status))
                .await
                .map_err(StepError::into_assertion)?;
        }
        Side::Back => {
            step("Flip interaction", action, flip_card(page))
                .await
                .map_err(StepError::into_assertion)?;
        }
    }

    if !wait_for_network_idle(page, config.nav_timeout())
        .await
        .map_err(CaseFailure::infrastructure)?
    {
        return Err(CaseFailure::timeout(format!(
            "Network did not reach idle within {:?}",
            config.nav_timeout()
        )));
    }

    step("Broken-image check", action, assert_no_broken_images(page))
        .await
        .map_err(StepError::into_assertion)?;
    step(
        "Overflow check",
        action,
        assert_no_horizontal_overflow(page),
    )
    .await
    .map_err(StepError::into_assertion)?;

    step(
        "Screenshot capture",
        action,
        capture(page, &config.artifact_root, &case.unit, &case.viewport, case.side),
    )
    .await
    .map_err(StepError::into_infrastructure)
}

/// A step failure, before it is classified into a case failure kind.
enum StepError {
    TimedOut(String),
    Failed(anyhow::Error),
}

impl StepError {
    fn into_assertion(self) -> CaseFailure {
        match self {
            Self::TimedOut(message) => CaseFailure::timeout(message),
            Self::Failed(err) => CaseFailure::assertion(err),
        }
    }

    fn into_infrastructure(self) -> CaseFailure {
        match self {
            Self::TimedOut(message) => CaseFailure::timeout(message),
            Self::Failed(err) => CaseFailure::infrastructure(err),
        }
    }
}

/// Bounds one awaited operation with a deadline, keeping timeout and
/// operation failure distinguishable for the report.
async fn step<T>(
    what: &str,
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T, StepError> {
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(StepError::Failed(err)),
        Err(_) => Err(StepError::TimedOut(format!(
            "{what} timed out after {limit:?}"
        ))),
    }
}
