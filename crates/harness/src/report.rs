//! Per-case outcomes and the run report.
//!
//! A case failure is data, not a propagated error: every case runs to its
//! own verdict and one case's failure never cancels its siblings. The
//! report is logged as a human-readable summary and written as JSON under
//! the artifact root.

use std::fs::{create_dir_all, write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::matrix::CaseSpec;
use crate::status::Status;

/// Why a case failed, kept distinct so timeouts are never conflated with
/// assertion violations in the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// An expected page condition did not hold (broken images, overflow,
    /// missing or wrong interactive elements, failed flip transition).
    Assertion,
    /// An action, navigation or whole-case deadline was exceeded.
    Timeout,
    /// The harness itself could not drive the case (page creation,
    /// navigation transport, screenshot I/O).
    Infrastructure,
}

/// A case failure: the kind plus collected diagnostic detail.
#[derive(Clone, Debug, Serialize)]
pub struct CaseFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl CaseFailure {
    #[must_use]
    pub fn assertion(err: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Assertion,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn infrastructure(err: impl std::fmt::Display) -> Self {
        Self {
            kind: FailureKind::Infrastructure,
            message: err.to_string(),
        }
    }
}

/// Outcome of one executed case.
#[derive(Clone, Debug, Serialize)]
pub struct CaseOutcome {
    #[serde(flatten)]
    pub spec: CaseSpec,
    /// Status the case's assertions were derived from.
    pub status: Status,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<CaseFailure>,
    /// Screenshot path, present when the case got as far as capturing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    pub duration_ms: u64,
}

impl CaseOutcome {
    #[must_use]
    pub fn passed(spec: CaseSpec, status: Status, artifact: PathBuf, duration_ms: u64) -> Self {
        Self {
            spec,
            status,
            passed: true,
            failure: None,
            artifact: Some(artifact),
            duration_ms,
        }
    }

    #[must_use]
    pub fn failed(spec: CaseSpec, status: Status, failure: CaseFailure, duration_ms: u64) -> Self {
        Self {
            spec,
            status,
            passed: false,
            failure: Some(failure),
            artifact: None,
            duration_ms,
        }
    }
}

/// Ordered outcomes of a full run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<CaseOutcome>,
}

impl RunReport {
    pub fn push(&mut self, outcome: CaseOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.passed_count()
    }

    /// Logs summary statistics plus one detail line per failing case.
    pub fn log_summary(&self) {
        let total = self.outcomes.len();
        let failed = self.failed_count();
        log::info!("{} of {total} case(s) passed", self.passed_count());

        if failed > 0 {
            log::error!("{failed} of {total} case(s) failed:");
            log::error!("────────────────────────────────────────");
            for outcome in &self.outcomes {
                if let Some(failure) = &outcome.failure {
                    log::error!(
                        "  ✗ {} [{:?}] {}",
                        outcome.spec.label(),
                        failure.kind,
                        failure.message.lines().next().unwrap_or(&failure.message)
                    );
                }
            }
            log::error!("────────────────────────────────────────");
        }
    }

    /// Writes the machine-readable report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file I/O fails.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create report dir {}", parent.display()))?;
        }
        let body = serde_json::to_vec_pretty(self).context("Failed to serialize run report")?;
        write(path, body)
            .with_context(|| format!("Failed to write run report to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Side;
    use crate::viewport;

    fn spec(side: Side) -> CaseSpec {
        CaseSpec {
            unit: "RG-0001".to_owned(),
            viewport: viewport::DESKTOP,
            side,
        }
    }

    #[test]
    fn counts_split_by_verdict() {
        let mut report = RunReport::default();
        report.push(CaseOutcome::passed(
            spec(Side::Front),
            Status::Available,
            PathBuf::from("out/RG-0001/desktop-front.png"),
            120,
        ));
        report.push(CaseOutcome::failed(
            spec(Side::Back),
            Status::Available,
            CaseFailure::assertion("flip did not occur"),
            90,
        ));
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn json_report_carries_kind_and_diagnostics() -> Result<()> {
        let mut report = RunReport::default();
        report.push(CaseOutcome::failed(
            spec(Side::Front),
            Status::Sold,
            CaseFailure::timeout("navigation timed out after 30s"),
            30_000,
        ));

        let value: serde_json::Value = serde_json::from_slice(&serde_json::to_vec(&report)?)?;
        let case = &value["outcomes"][0];
        assert_eq!(case["unit"], "RG-0001");
        assert_eq!(case["side"], "front");
        assert_eq!(case["status"], "sold");
        assert_eq!(case["passed"], false);
        assert_eq!(case["failure"]["kind"], "timeout");
        Ok(())
    }

    #[test]
    fn write_json_creates_parent_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reports").join("results.json");
        RunReport::default().write_json(&path)?;
        assert!(path.is_file());
        Ok(())
    }
}
