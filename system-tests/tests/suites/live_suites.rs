// system-tests/tests/suites/live_suites.rs
// ============================================================================
// Module: Live Resource Suites
// Description: Pet, order, and user suites against a real deployment.
// Purpose: Confirm the deployment honors the pet-store contract end to end.
// Dependencies: system-tests helpers, petstore-harness
// ============================================================================

//! ## Overview
//! Each test runs one resource suite with per-run pet ids and usernames, then
//! writes its summary and HTTP transcript under `<run root>/live_<suite>`.

use helpers::artifacts::TestReporter;
use petstore_harness::HarnessClient;
use petstore_harness::HarnessConfig;
use petstore_harness::ScenarioRunner;
use petstore_harness::SuiteName;
use system_tests::live_suite_options;
use system_tests::run_seed;

use crate::helpers;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Runs one suite live, writes its artifacts, and fails when any step failed.
async fn run_live_suite(suite: SuiteName) -> TestResult {
    let config = HarnessConfig::from_env()?;
    let mut reporter = TestReporter::new(&format!("live_{suite}"), config.run_root.as_deref())?;
    let client = HarnessClient::from_config(&config)?;
    let runner = ScenarioRunner::new(client.clone());
    let scenario = suite.scenario(&live_suite_options(&config, run_seed()))?;

    let report = runner.run(&scenario).await;
    reporter.finish(&report, &client.transcript())?;

    if !report.passed() {
        return Err(report.summary_line().into());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn live_pet_suite_passes() -> TestResult {
    run_live_suite(SuiteName::Pet).await
}

#[tokio::test(flavor = "multi_thread")]
async fn live_order_suite_passes() -> TestResult {
    run_live_suite(SuiteName::Order).await
}

#[tokio::test(flavor = "multi_thread")]
async fn live_user_suite_passes() -> TestResult {
    run_live_suite(SuiteName::User).await
}
