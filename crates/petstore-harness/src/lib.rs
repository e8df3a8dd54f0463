// crates/petstore-harness/src/lib.rs
// ============================================================================
// Module: Pet Store Contract Harness
// Description: HTTP contract-test harness for the pet-store REST API.
// Purpose: Drive ordered, dependent HTTP scenarios and report failing steps.
// Dependencies: reqwest, serde, serde_json, thiserror, time, tokio, tracing
// ============================================================================

//! ## Overview
//! The harness issues real HTTP requests against a pet-store deployment and
//! checks status codes and response shapes. HTTP error responses are returned
//! as data; only transport failures surface as errors from the client.
//! Scenarios are declarative step lists executed fail-fast by
//! [`ScenarioRunner`], with values captured from earlier responses carried
//! into later requests.
//!
//! The remote service is untrusted: responses may be stale, shared with other
//! clients, or eventually consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod report;
pub mod scenario;
pub mod suites;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use assertions::AssertionError;
pub use assertions::AssertionKind;
pub use assertions::RetryPolicy;
pub use client::HarnessClient;
pub use client::HttpError;
pub use client::HttpMethod;
pub use client::HttpResponse;
pub use client::RequestOptions;
pub use client::TransportError;
pub use client::TransportErrorKind;
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use error::StepError;
pub use report::ScenarioReport;
pub use report::SuiteReport;
pub use scenario::Scenario;
pub use scenario::ScenarioRunner;
pub use scenario::Step;
pub use suites::SuiteName;
pub use suites::SuiteOptions;
