// crates/petstore-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Crate-level error types shared across harness modules.
// Purpose: Separate setup failures from per-step scenario failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`HarnessError`] covers setup problems (client construction, fixture
//! serialization, suite lookup). [`StepError`] is the failure of a single
//! scenario step and keeps transport, assertion, and template failures apart
//! so reports never conflate an unreachable server with a 404.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::assertions::AssertionError;
use crate::client::TransportError;
use crate::scenario::TemplateError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Setup errors raised before any scenario step runs.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// HTTP client could not be constructed.
    #[error("http client setup failed: {0}")]
    ClientSetup(String),
    /// Fixture could not be serialized to JSON.
    #[error("fixture serialization failed: {0}")]
    Fixture(String),
    /// Suite name is not recognized.
    #[error("unknown suite: {0}")]
    UnknownSuite(String),
}

/// Failure of a single scenario step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The response did not meet an expectation.
    #[error(transparent)]
    Assertion(#[from] AssertionError),
    /// The step could not be rendered from scenario variables.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl StepError {
    /// Returns a stable label for the error category.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Assertion(_) => "assertion",
            Self::Template(_) => "template",
        }
    }
}
