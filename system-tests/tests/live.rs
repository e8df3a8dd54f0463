// system-tests/tests/live.rs
// ============================================================================
// Module: Live Contract Suite
// Description: Aggregates live pet-store system tests into one binary.
// Purpose: Run every resource suite against a real deployment.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Aggregates live contract tests into one binary. The target deployment is
//! taken from `PETSTORE_BASE_URL` and the other `PETSTORE_*` variables; see
//! [`petstore_harness::HarnessConfig::from_env`].

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod helpers;

#[path = "suites/live_suites.rs"]
mod live_suites;
