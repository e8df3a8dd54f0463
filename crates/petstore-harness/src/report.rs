// crates/petstore-harness/src/report.rs
// ============================================================================
// Module: Scenario Reports
// Description: Per-step and per-scenario outcomes plus run artifacts.
// Purpose: Record which step failed, with its call and expected vs actual.
// Dependencies: serde, serde_jcs, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ScenarioReport`] is produced by the runner for each scenario and
//! [`SuiteReport`] aggregates a run. [`RunArtifacts`] writes a canonical
//! `summary.json`, a readable `summary.md`, and the HTTP transcript under a
//! run root directory.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::client::TranscriptEntry;
use crate::error::StepError;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Final status of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every step passed.
    Passed,
    /// A step failed and the rest were skipped.
    Failed,
}

impl ScenarioStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step met its expectations.
    Passed,
    /// Step failed.
    Failed,
    /// Step did not run because an earlier step failed.
    Skipped,
}

/// Record of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Zero-based step index.
    pub index: usize,
    /// Step description.
    pub description: String,
    /// Rendered call (`METHOD url`), or the template label if not rendered.
    pub call: String,
    /// Last response status, when a response arrived.
    pub status_code: Option<u16>,
    /// Step outcome.
    pub outcome: StepOutcome,
    /// Requests sent for the step.
    pub attempts: u32,
    /// Wall-clock time spent on the step.
    pub elapsed_ms: u64,
}

/// Details of the failing step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDetail {
    /// Zero-based index of the failing step.
    pub step_index: usize,
    /// Step description.
    pub description: String,
    /// Call that failed.
    pub call: String,
    /// Error category: `transport`, `assertion`, or `template`.
    pub category: String,
    /// Failure message.
    pub message: String,
    /// Expected value, when known.
    pub expected: Option<Value>,
    /// Actual value, when known.
    pub actual: Option<Value>,
}

impl FailureDetail {
    /// Builds a failure detail from a step error.
    #[must_use]
    pub fn from_step_error(
        step_index: usize,
        description: &str,
        call: &str,
        error: &StepError,
    ) -> Self {
        let (expected, actual) = match error {
            StepError::Assertion(assertion) => (assertion.expected.clone(), assertion.actual.clone()),
            StepError::Transport(_) | StepError::Template(_) => (None, None),
        };
        Self {
            step_index,
            description: description.to_string(),
            call: call.to_string(),
            category: error.category().to_string(),
            message: error.to_string(),
            expected,
            actual,
        }
    }
}

/// Report for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// Final status.
    pub status: ScenarioStatus,
    /// One record per declared step.
    pub steps: Vec<StepRecord>,
    /// Failing step, when the scenario failed.
    pub failure: Option<FailureDetail>,
    /// Wall-clock time spent on the scenario.
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    /// Returns true when every step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    /// One-line description of the outcome.
    #[must_use]
    pub fn summary_line(&self) -> String {
        match &self.failure {
            None => format!("{}: passed ({} steps, {} ms)", self.scenario, self.steps.len(), self.elapsed_ms),
            Some(failure) => format!(
                "{}: failed at step {} ({}) {}: {}",
                self.scenario, failure.step_index, failure.description, failure.call, failure.message
            ),
        }
    }
}

/// Aggregate of scenario reports for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Scenario reports in declaration order.
    pub scenarios: Vec<ScenarioReport>,
    /// Number of passed scenarios.
    pub passed: usize,
    /// Number of failed scenarios.
    pub failed: usize,
}

impl SuiteReport {
    /// Aggregates scenario reports.
    #[must_use]
    pub fn from_reports(scenarios: Vec<ScenarioReport>) -> Self {
        let passed = scenarios.iter().filter(|report| report.passed()).count();
        let failed = scenarios.len() - passed;
        Self {
            scenarios,
            passed,
            failed,
        }
    }

    /// Returns true when no scenario failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Renders the report as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Contract Run Summary\n\n");
        out.push_str(&format!("- Passed: {}\n", self.passed));
        out.push_str(&format!("- Failed: {}\n", self.failed));
        for scenario in &self.scenarios {
            out.push_str(&format!(
                "\n## {} ({}, {} ms)\n\n",
                scenario.scenario,
                scenario.status.as_str(),
                scenario.elapsed_ms
            ));
            for step in &scenario.steps {
                let mark = match step.outcome {
                    StepOutcome::Passed => "x",
                    StepOutcome::Failed => "!",
                    StepOutcome::Skipped => " ",
                };
                let status = step.status_code.map_or_else(|| "-".to_string(), |code| code.to_string());
                out.push_str(&format!(
                    "- [{mark}] {}. {} `{}` status {status}\n",
                    step.index, step.description, step.call
                ));
            }
            if let Some(failure) = &scenario.failure {
                out.push_str(&format!("\nFailure ({}): {}\n", failure.category, failure.message));
                if let Some(expected) = &failure.expected {
                    out.push_str(&format!("\n- Expected: `{expected}`\n"));
                }
                if let Some(actual) = &failure.actual {
                    out.push_str(&format!("- Actual: `{actual}`\n"));
                }
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact write failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("artifact io error at {path}: {message}")]
    Io {
        /// Path being written.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// Serialization failure.
    #[error("artifact serialization failed: {0}")]
    Serialize(String),
}

/// Returns milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Default run root under `target/contract-runs`.
#[must_use]
pub fn default_run_root() -> PathBuf {
    PathBuf::from("target/contract-runs").join(format!("run_{}", now_millis()))
}

/// Writer for run artifacts under one root directory.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// Root directory for the run.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates the root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| io_error(&root, &err))?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, ReportError> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| ReportError::Serialize(err.to_string()))?;
        fs::write(&path, bytes).map_err(|err| io_error(&path, &err))?;
        Ok(path)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, ReportError> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes()).map_err(|err| io_error(&path, &err))?;
        Ok(path)
    }

    /// Writes `summary.json`, `summary.md`, and `transcript.json`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when any artifact cannot be written.
    pub fn write_run(
        &self,
        report: &SuiteReport,
        transcript: &[TranscriptEntry],
    ) -> Result<Vec<PathBuf>, ReportError> {
        Ok(vec![
            self.write_json("summary.json", report)?,
            self.write_text("summary.md", &report.to_markdown())?,
            self.write_json("transcript.json", &transcript)?,
        ])
    }
}

/// Wraps an IO error with its path.
fn io_error(path: &Path, err: &std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
