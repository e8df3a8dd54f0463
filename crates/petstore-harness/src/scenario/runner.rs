// crates/petstore-harness/src/scenario/runner.rs
// ============================================================================
// Module: Scenario Execution
// Description: Fail-fast execution of scenarios against a harness client.
// Purpose: Run ordered steps, carry captured values, and report failures.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`ScenarioRunner`] executes each [`Scenario`] step by step. Within a
//! scenario, steps are strictly sequential. Independent scenarios run either
//! one after another ([`ScenarioRunner::run_all`]) or on separate tokio tasks
//! ([`ScenarioRunner::run_concurrently`]); both keep going past failures and
//! return reports in declaration order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde_json::Value;
use tokio::task::JoinSet;

use crate::assertions::assert_eventually_gone;
use crate::client::HarnessClient;
use crate::client::TransportError;
use crate::client::TransportErrorKind;
use crate::error::StepError;
use crate::report::FailureDetail;
use crate::report::ScenarioReport;
use crate::report::ScenarioStatus;
use crate::report::StepOutcome;
use crate::report::StepRecord;
use crate::scenario::step::Step;
use crate::scenario::step::StepMode;
use crate::scenario::template::Variables;

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// Named, ordered list of dependent steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Variables bound before the first step.
    pub variables: Variables,
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Creates a scenario with no seed variables.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            variables: Variables::new(),
            steps,
        }
    }

    /// Seeds a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name, value);
        self
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Result of executing one step.
struct StepRun {
    /// Rendered call label.
    call: String,
    /// Last response status.
    status_code: Option<u16>,
    /// Requests sent.
    attempts: u32,
    /// Failure, if any.
    error: Option<StepError>,
}

/// Executes scenarios against one client.
#[derive(Clone)]
pub struct ScenarioRunner {
    /// Client shared by every step.
    client: HarnessClient,
}

impl ScenarioRunner {
    /// Creates a runner around `client`.
    #[must_use]
    pub const fn new(client: HarnessClient) -> Self {
        Self {
            client,
        }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &HarnessClient {
        &self.client
    }

    /// Runs one scenario, stopping at the first failing step.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        let started = Instant::now();
        let mut vars = scenario.variables.clone();
        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut failure = None;
        tracing::info!(scenario = %scenario.name, steps = scenario.steps.len(), "scenario started");

        for (index, step) in scenario.steps.iter().enumerate() {
            if failure.is_some() {
                steps.push(StepRecord {
                    index,
                    description: step.description.clone(),
                    call: step.call_label(),
                    status_code: None,
                    outcome: StepOutcome::Skipped,
                    attempts: 0,
                    elapsed_ms: 0,
                });
                continue;
            }
            let step_started = Instant::now();
            let run = self.run_step(step, &mut vars).await;
            let elapsed_ms = elapsed_millis(step_started);
            let outcome = if run.error.is_some() { StepOutcome::Failed } else { StepOutcome::Passed };
            match &run.error {
                None => tracing::info!(
                    scenario = %scenario.name,
                    step = index,
                    call = %run.call,
                    status = run.status_code,
                    elapsed_ms,
                    "step passed"
                ),
                Some(error) => {
                    tracing::warn!(
                        scenario = %scenario.name,
                        step = index,
                        call = %run.call,
                        category = error.category(),
                        error = %error,
                        "step failed"
                    );
                    failure =
                        Some(FailureDetail::from_step_error(index, &step.description, &run.call, error));
                }
            }
            steps.push(StepRecord {
                index,
                description: step.description.clone(),
                call: run.call,
                status_code: run.status_code,
                outcome,
                attempts: run.attempts,
                elapsed_ms,
            });
        }

        let status = if failure.is_some() { ScenarioStatus::Failed } else { ScenarioStatus::Passed };
        let elapsed_ms = elapsed_millis(started);
        tracing::info!(scenario = %scenario.name, status = status.as_str(), elapsed_ms, "scenario finished");
        ScenarioReport {
            scenario: scenario.name.clone(),
            status,
            steps,
            failure,
            elapsed_ms,
        }
    }

    /// Runs scenarios one after another, continuing past failures.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioReport> {
        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.run(scenario).await);
        }
        reports
    }

    /// Runs scenarios on separate tasks and returns reports in input order.
    ///
    /// A task that dies without a report is recorded as a failed scenario.
    pub async fn run_concurrently(&self, scenarios: Vec<Scenario>) -> Vec<ScenarioReport> {
        let names: Vec<String> = scenarios.iter().map(|scenario| scenario.name.clone()).collect();
        let mut tasks = JoinSet::new();
        for (position, scenario) in scenarios.into_iter().enumerate() {
            let runner = self.clone();
            tasks.spawn(async move { (position, runner.run(&scenario).await) });
        }
        let mut slots: Vec<Option<ScenarioReport>> = vec![None; names.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, report)) => {
                    if let Some(slot) = slots.get_mut(position) {
                        *slot = Some(report);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "scenario task aborted"),
            }
        }
        slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| slot.unwrap_or_else(|| aborted_report(name)))
            .collect()
    }

    /// Renders, sends, and checks one step, capturing values on success.
    async fn run_step(&self, step: &Step, vars: &mut Variables) -> StepRun {
        let mut run = StepRun {
            call: step.call_label(),
            status_code: None,
            attempts: 0,
            error: None,
        };
        let rendered = match step.request.render(vars) {
            Ok(rendered) => rendered,
            Err(err) => {
                run.error = Some(err);
                return run;
            }
        };
        let url = match self.client.url_for_segments(&rendered.segments) {
            Ok(url) => url,
            Err(message) => {
                run.error = Some(StepError::Transport(TransportError {
                    kind: TransportErrorKind::InvalidUrl,
                    method: rendered.method,
                    url: self.client.base_url().to_string(),
                    message,
                }));
                return run;
            }
        };
        run.call = call_label(rendered.method.as_str(), &url, &rendered.options.query);

        match step.mode {
            StepMode::Once => {
                run.attempts = 1;
                let response = match self.client.send(rendered.method, url, &rendered.options).await {
                    Ok(response) => response,
                    Err(err) => {
                        run.error = Some(err.into());
                        return run;
                    }
                };
                run.status_code = Some(response.status());
                for expectation in &step.expectations {
                    if let Err(err) = expectation.check(&response, vars) {
                        run.error = Some(err);
                        return run;
                    }
                }
                for capture in &step.captures {
                    if let Err(err) = vars.capture(response.body(), &capture.pointer, &capture.var) {
                        run.error = Some(err.into());
                        return run;
                    }
                }
            }
            StepMode::EventuallyGone(policy) => {
                let client = &self.client;
                let options = &rendered.options;
                let method = rendered.method;
                let target = &url;
                match assert_eventually_gone(move || client.send(method, target.clone(), options), policy)
                    .await
                {
                    Ok(attempts) => {
                        run.attempts = attempts;
                        run.status_code = Some(404);
                    }
                    Err(err) => {
                        run.attempts = policy.attempts();
                        run.error = Some(err.into());
                    }
                }
            }
        }
        run
    }
}

/// Formats `METHOD url` including query parameters.
fn call_label(method: &str, url: &url::Url, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return format!("{method} {url}");
    }
    let mut full = url.clone();
    full.query_pairs_mut().extend_pairs(query.iter().map(|(name, value)| (name.as_str(), value.as_str())));
    format!("{method} {full}")
}

/// Milliseconds elapsed since `started`, saturating.
fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Report for a scenario whose task ended without producing one.
fn aborted_report(name: String) -> ScenarioReport {
    ScenarioReport {
        scenario: name,
        status: ScenarioStatus::Failed,
        steps: Vec::new(),
        failure: Some(FailureDetail {
            step_index: 0,
            description: "scenario task".to_string(),
            call: String::new(),
            category: "task".to_string(),
            message: "scenario task aborted before reporting".to_string(),
            expected: None,
            actual: None,
        }),
        elapsed_ms: 0,
    }
}
