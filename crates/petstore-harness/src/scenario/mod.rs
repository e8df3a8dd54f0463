// crates/petstore-harness/src/scenario/mod.rs
// ============================================================================
// Module: Scenario Runner
// Description: Ordered, dependent HTTP steps executed fail-fast.
// Purpose: Make step ordering and carried-forward keys explicit.
// Dependencies: serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! A [`Scenario`] is a linear list of [`Step`]s. Each step renders a request
//! template from scenario [`Variables`], sends it, checks its expectations,
//! and captures values for later steps. The first failing step stops the
//! scenario; the report names its index, description, and HTTP call.
//!
//! ```text
//! Init -> Step(0) -> Step(1) -> ... -> Passed
//!              \-> Failed { step }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

mod runner;
mod step;
mod template;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use runner::Scenario;
pub use runner::ScenarioRunner;
pub use step::BodyMatcher;
pub use step::Capture;
pub use step::Expectation;
pub use step::RenderedRequest;
pub use step::RequestTemplate;
pub use step::Step;
pub use step::StepMode;
pub use template::TemplateError;
pub use template::Variables;
