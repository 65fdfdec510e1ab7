use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use terracheck_expect::ExpectationReport;
use thiserror::Error;
use uuid::Uuid;

/// Scenario lifecycle. `Destroyed` is terminal and reachable from every
/// other phase via the guaranteed cleanup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Applied,
    Inspected,
    Asserted,
    Destroyed,
}

/// Outcome of one scenario run. Always produced, whatever failed; the
/// orchestrator never loses a result to an exception path.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub phase: Phase,
    pub expectations: ExpectationReport,
    /// Primary failure: apply, inspection, or a panicking checks body.
    pub failure: Option<String>,
    /// A destroy failure is reported alongside the primary failure,
    /// never instead of it.
    pub destroy_failure: Option<String>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none() && self.destroy_failure.is_none() && self.expectations.passed()
    }

    /// Convert into a `Result` for use with `?` in test functions.
    pub fn into_result(self) -> Result<(), ScenarioFailure> {
        if self.passed() {
            Ok(())
        } else {
            Err(ScenarioFailure::new(self))
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(
                f,
                "scenario '{}' passed ({})",
                self.scenario, self.expectations
            );
        }
        writeln!(f, "scenario '{}' failed:", self.scenario)?;
        if let Some(failure) = &self.failure {
            writeln!(f, "  {}", failure)?;
        }
        if !self.expectations.passed() {
            writeln!(f, "  {}", self.expectations)?;
        }
        if let Some(destroy) = &self.destroy_failure {
            writeln!(f, "  destroy also failed: {}", destroy)?;
        }
        Ok(())
    }
}

/// A failed scenario as an error value, carrying the full report.
#[derive(Debug, Error)]
#[error("{summary}")]
pub struct ScenarioFailure {
    summary: String,
    pub report: ScenarioReport,
}

impl ScenarioFailure {
    fn new(report: ScenarioReport) -> Self {
        Self {
            summary: report.to_string(),
            report,
        }
    }
}
