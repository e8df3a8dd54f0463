// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Live Run Reporter
// Description: Per-test artifact directories for live contract runs.
// Purpose: Store each live suite's report and transcript through the harness writer.
// Dependencies: petstore-harness
// ============================================================================

use std::path::Path;
use std::time::Instant;

use petstore_harness::ScenarioReport;
use petstore_harness::SuiteReport;
use petstore_harness::client::TranscriptEntry;
use petstore_harness::report::ReportError;
use petstore_harness::report::RunArtifacts;
use petstore_harness::report::default_run_root;

/// Writes one live test's artifacts under `<run root>/<test name>`.
///
/// A reporter dropped before [`TestReporter::finish`] leaves a `summary.md`
/// saying the test ended early.
pub struct TestReporter {
    artifacts: RunArtifacts,
    test_name: String,
    started: Instant,
    finished: bool,
}

impl TestReporter {
    pub fn new(test_name: &str, run_root: Option<&Path>) -> Result<Self, ReportError> {
        let root = run_root.map_or_else(default_run_root, Path::to_path_buf).join(test_name);
        Ok(Self {
            artifacts: RunArtifacts::create(root)?,
            test_name: test_name.to_string(),
            started: Instant::now(),
            finished: false,
        })
    }

    /// Writes `summary.json`, `summary.md`, and `transcript.json` for the run.
    pub fn finish(
        &mut self,
        report: &ScenarioReport,
        transcript: &[TranscriptEntry],
    ) -> Result<(), ReportError> {
        let suite = SuiteReport::from_reports(vec![report.clone()]);
        self.artifacts.write_run(&suite, transcript)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let status = if std::thread::panicking() { "panicked" } else { "returned early" };
        let note = format!(
            "# {}\n\nTest {status} after {} ms without a scenario report.\n",
            self.test_name,
            self.started.elapsed().as_millis()
        );
        let _ = self.artifacts.write_text("summary.md", &note);
    }
}

#[cfg(test)]
mod tests {
    use petstore_harness::report::ScenarioStatus;

    use super::*;

    fn passed_report() -> ScenarioReport {
        ScenarioReport {
            scenario: "order".to_string(),
            status: ScenarioStatus::Passed,
            steps: Vec::new(),
            failure: None,
            elapsed_ms: 1,
        }
    }

    #[test]
    fn finish_writes_run_files_under_test_directory() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let mut reporter =
            TestReporter::new("live_order", Some(dir.path())).map_err(|err| err.to_string())?;
        reporter.finish(&passed_report(), &[]).map_err(|err| err.to_string())?;

        let root = dir.path().join("live_order");
        for name in ["summary.json", "summary.md", "transcript.json"] {
            assert!(root.join(name).is_file(), "{name} missing");
        }
        let summary = std::fs::read_to_string(root.join("summary.json")).map_err(|err| err.to_string())?;
        assert!(summary.contains("\"passed\":1"), "{summary}");
        Ok(())
    }

    #[test]
    fn unfinished_reporter_leaves_a_note() -> Result<(), String> {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        drop(TestReporter::new("live_pet", Some(dir.path())).map_err(|err| err.to_string())?);

        let note = std::fs::read_to_string(dir.path().join("live_pet").join("summary.md"))
            .map_err(|err| err.to_string())?;
        assert!(note.contains("returned early"), "{note}");
        assert!(!dir.path().join("live_pet").join("summary.json").exists());
        Ok(())
    }
}
