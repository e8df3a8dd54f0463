// crates/petstore-harness/tests/suites_stub.rs
// ============================================================================
// Module: Suite Integration Tests
// Description: Runs the pet, order, and user suites against the loopback stub.
// Purpose: Prove the declared scenarios pass end to end over real HTTP.
// Dependencies: petstore-harness, tokio
// ============================================================================

//! ## Overview
//! Executes every resource suite through [`petstore_harness::ScenarioRunner`]
//! against the in-memory stub, sequentially and concurrently.

#![allow(dead_code, reason = "Common module may have unused helpers.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use petstore_harness::ScenarioReport;
use petstore_harness::ScenarioRunner;
use petstore_harness::SuiteReport;
use petstore_harness::report::StepOutcome;
use petstore_harness::suites::all_scenarios;
use petstore_harness::suites::pet_scenario;
use petstore_harness::suites::user_scenario;

use crate::common::SEEDED_PET_ID;
use crate::common::StubOptions;
use crate::common::spawn_stub;
use crate::common::spawn_stub_with;

type TestResult = Result<(), String>;

fn explain(report: &ScenarioReport) -> String {
    report.summary_line()
}

#[tokio::test]
async fn every_suite_passes_sequentially() -> TestResult {
    let stub = spawn_stub()?;
    let runner = ScenarioRunner::new(stub.client()?);
    let scenarios = all_scenarios(&stub.suite_options()).map_err(|err| err.to_string())?;

    let reports = runner.run_all(&scenarios).await;
    for report in &reports {
        assert!(report.passed(), "{}", explain(report));
        assert!(report.steps.iter().all(|step| step.outcome == StepOutcome::Passed));
    }
    let summary = SuiteReport::from_reports(reports);
    assert_eq!((summary.passed, summary.failed), (3, 0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 3)]
async fn every_suite_passes_concurrently_in_declaration_order() -> TestResult {
    let stub = spawn_stub()?;
    let runner = ScenarioRunner::new(stub.client()?);
    let scenarios = all_scenarios(&stub.suite_options()).map_err(|err| err.to_string())?;

    let reports = runner.run_concurrently(scenarios).await;
    let names: Vec<&str> = reports.iter().map(|report| report.scenario.as_str()).collect();
    assert_eq!(names, vec!["pet", "order", "user"]);
    for report in &reports {
        assert!(report.passed(), "{}", explain(report));
    }
    Ok(())
}

#[tokio::test]
async fn pet_suite_cleans_up_and_sends_api_key() -> TestResult {
    let stub = spawn_stub()?;
    let runner = ScenarioRunner::new(stub.client()?);
    let report = runner.run(&pet_scenario(&stub.suite_options()).map_err(|err| err.to_string())?).await;
    assert!(report.passed(), "{}", explain(&report));

    assert_eq!(stub.pet_ids(), vec![SEEDED_PET_ID]);
    let keys = stub.api_keys();
    assert!(!keys.is_empty());
    assert!(keys.iter().all(|key| key == "special_key"));
    Ok(())
}

#[tokio::test]
async fn user_suite_removes_both_users() -> TestResult {
    let stub = spawn_stub()?;
    let runner = ScenarioRunner::new(stub.client()?);
    let report = runner.run(&user_scenario(&stub.suite_options()).map_err(|err| err.to_string())?).await;
    assert!(report.passed(), "{}", explain(&report));
    assert!(stub.usernames().is_empty());

    let login = report
        .steps
        .iter()
        .find(|step| step.description == "log in as second user")
        .ok_or("login step missing")?;
    assert!(login.call.contains("username=secondTest"), "{}", login.call);
    assert!(login.call.contains("password=secondTestPass"), "{}", login.call);
    Ok(())
}

#[tokio::test]
async fn delete_lag_is_absorbed_by_gone_polling() -> TestResult {
    let stub = spawn_stub_with(StubOptions {
        delete_lag: 2,
    })?;
    let runner = ScenarioRunner::new(stub.client()?);
    let scenarios = all_scenarios(&stub.suite_options()).map_err(|err| err.to_string())?;

    for report in runner.run_all(&scenarios).await {
        assert!(report.passed(), "{}", explain(&report));
        let Some(gone) = report.steps.iter().find(|step| step.description.ends_with("is gone")) else {
            return Err(format!("{} has no gone step", report.scenario));
        };
        assert_eq!(gone.attempts, 3, "{}", report.scenario);
        assert_eq!(gone.status_code, Some(404));
    }
    Ok(())
}
