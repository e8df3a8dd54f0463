// crates/petstore-harness/src/scenario/step.rs
// ============================================================================
// Module: Scenario Steps
// Description: Declarative request templates, expectations, and captures.
// Purpose: Describe one HTTP step as data the runner can render and check.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`Step`] holds a [`RequestTemplate`], the [`Expectation`]s its response
//! must meet, and [`Capture`]s that feed later steps. Steps are plain data so
//! suites can be listed (`plan`) without sending any request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::assertions::AssertionError;
use crate::assertions::AssertionKind;
use crate::assertions::RetryPolicy;
use crate::assertions::assert_has_keys;
use crate::assertions::assert_matches_subset;
use crate::assertions::assert_message_contains;
use crate::assertions::assert_status;
use crate::assertions::assert_status_in;
use crate::assertions::json_equal;
use crate::client::HttpMethod;
use crate::client::HttpResponse;
use crate::client::RequestOptions;
use crate::error::StepError;
use crate::scenario::template::Variables;

// ============================================================================
// SECTION: Request Templates
// ============================================================================

/// Request with `{var}` placeholders resolved at run time.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTemplate {
    /// HTTP method.
    pub method: HttpMethod,
    /// `/`-separated path relative to the base URL.
    pub path: String,
    /// Query parameters; values may reference variables.
    pub query: Vec<(String, String)>,
    /// Headers; values may reference variables.
    pub headers: Vec<(String, String)>,
    /// JSON body sent as-is apart from bindings.
    pub body: Option<Value>,
    /// Body bindings as `(pointer, variable)` pairs.
    pub bindings: Vec<(String, String)>,
}

impl RequestTemplate {
    /// Creates a template with no query, headers, or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            bindings: Vec::new(),
        }
    }

    /// GET template.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST template.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT template.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// DELETE template.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Writes variable `var` into the body at `pointer` before sending.
    #[must_use]
    pub fn bind(mut self, pointer: impl Into<String>, var: impl Into<String>) -> Self {
        self.bindings.push((pointer.into(), var.into()));
        self
    }

    /// Returns the unrendered call label, e.g. `GET /pet/{pet_id}`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} /{}", self.method, self.path.trim_start_matches('/'))
    }

    /// Resolves every placeholder against `vars`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Template`] for unbound variables, malformed
    /// templates, or binding pointers missing from the body.
    pub fn render(&self, vars: &Variables) -> Result<RenderedRequest, StepError> {
        let segments = vars.render_path(&self.path)?;
        let mut options = RequestOptions::default();
        for (name, value) in &self.query {
            options.query.push((name.clone(), vars.render(value)?));
        }
        for (name, value) in &self.headers {
            options.headers.push((name.clone(), vars.render(value)?));
        }
        if let Some(body) = &self.body {
            let mut body = body.clone();
            for (pointer, var) in &self.bindings {
                vars.bind(&mut body, pointer, var)?;
            }
            options.body = Some(body);
        }
        Ok(RenderedRequest {
            method: self.method,
            segments,
            options,
        })
    }
}

/// Request with every placeholder resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Raw path segments, not yet percent-encoded.
    pub segments: Vec<String>,
    /// Body, headers, and query.
    pub options: RequestOptions,
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Check applied to a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyMatcher {
    /// Body contains the given JSON as a subset.
    Subset(Value),
    /// Body is an object with every named key.
    HasKeys(Vec<String>),
    /// Body `message` contains the text.
    MessageContains(String),
    /// Body is an array and every item meets every matcher.
    EachItem(Vec<BodyMatcher>),
    /// Field at `pointer` equals the value bound to `var`.
    FieldEqualsVar {
        /// JSON pointer into the body.
        pointer: String,
        /// Variable name.
        var: String,
    },
    /// Whole body equals the value bound to the variable.
    EqualsVar(String),
}

impl BodyMatcher {
    /// Checks `body` against the matcher.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Assertion`] on a mismatch, or
    /// [`StepError::Template`] when a referenced variable is unbound.
    pub fn check(&self, body: &Value, vars: &Variables) -> Result<(), StepError> {
        match self {
            Self::Subset(expected) => assert_matches_subset(body, expected)?,
            Self::HasKeys(keys) => assert_has_keys(body, keys)?,
            Self::MessageContains(needle) => assert_message_contains(body, needle)?,
            Self::EachItem(matchers) => {
                let Some(items) = body.as_array() else {
                    return Err(AssertionError::new(
                        AssertionKind::ShapeMismatch,
                        "expected a json array",
                    )
                    .with_values(Value::Array(Vec::new()), body.clone())
                    .into());
                };
                for (index, item) in items.iter().enumerate() {
                    for matcher in matchers {
                        matcher.check(item, vars).map_err(|err| prefix_item(err, index))?;
                    }
                }
            }
            Self::FieldEqualsVar {
                pointer,
                var,
            } => {
                let expected = vars.require(var)?;
                let actual = body.pointer(pointer).cloned().unwrap_or(Value::Null);
                if !json_equal(&actual, expected) {
                    return Err(AssertionError::new(
                        AssertionKind::ShapeMismatch,
                        format!("field {pointer} does not equal {{{var}}}"),
                    )
                    .with_values(expected.clone(), actual)
                    .into());
                }
            }
            Self::EqualsVar(var) => {
                let expected = vars.require(var)?;
                if !json_equal(body, expected) {
                    return Err(AssertionError::new(
                        AssertionKind::ShapeMismatch,
                        format!("body does not equal {{{var}}}"),
                    )
                    .with_values(expected.clone(), body.clone())
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Prefixes an item assertion detail with its array index.
fn prefix_item(error: StepError, index: usize) -> StepError {
    match error {
        StepError::Assertion(mut assertion) => {
            assertion.detail = format!("item {index}: {}", assertion.detail);
            StepError::Assertion(assertion)
        }
        other => other,
    }
}

/// Expectation on a step response.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Status equals the code.
    Status(u16),
    /// Status is one of the codes.
    StatusIn(Vec<u16>),
    /// Body meets the matcher.
    Body(BodyMatcher),
}

impl Expectation {
    /// Checks `response` against the expectation.
    ///
    /// # Errors
    ///
    /// Returns [`StepError`] describing the first mismatch.
    pub fn check(&self, response: &HttpResponse, vars: &Variables) -> Result<(), StepError> {
        match self {
            Self::Status(expected) => assert_status(response, *expected)?,
            Self::StatusIn(expected) => assert_status_in(response, expected)?,
            Self::Body(matcher) => matcher.check(response.body(), vars)?,
        }
        Ok(())
    }
}

/// Value read from a response body into a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Variable name.
    pub var: String,
    /// JSON pointer into the body (`""` for the whole body).
    pub pointer: String,
}

/// How a step is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Send once and check expectations.
    Once,
    /// Poll until the response is 404, within the policy.
    EventuallyGone(RetryPolicy),
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// One HTTP call in a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Human-readable description.
    pub description: String,
    /// Request to send.
    pub request: RequestTemplate,
    /// Checks applied in order.
    pub expectations: Vec<Expectation>,
    /// Values captured after the checks pass.
    pub captures: Vec<Capture>,
    /// Execution mode.
    pub mode: StepMode,
}

impl Step {
    /// Creates a step with no expectations.
    #[must_use]
    pub fn new(description: impl Into<String>, request: RequestTemplate) -> Self {
        Self {
            description: description.into(),
            request,
            expectations: Vec::new(),
            captures: Vec::new(),
            mode: StepMode::Once,
        }
    }

    /// Adds an expectation.
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Expects an exact status.
    #[must_use]
    pub fn expect_status(self, status: u16) -> Self {
        self.expect(Expectation::Status(status))
    }

    /// Adds a body matcher.
    #[must_use]
    pub fn expect_body(self, matcher: BodyMatcher) -> Self {
        self.expect(Expectation::Body(matcher))
    }

    /// Captures the body value at `pointer` as `var`.
    #[must_use]
    pub fn capture(mut self, var: impl Into<String>, pointer: impl Into<String>) -> Self {
        self.captures.push(Capture {
            var: var.into(),
            pointer: pointer.into(),
        });
        self
    }

    /// Switches the step to an eventually-gone poll.
    #[must_use]
    pub const fn eventually_gone(mut self, policy: RetryPolicy) -> Self {
        self.mode = StepMode::EventuallyGone(policy);
        self
    }

    /// Returns the unrendered call label.
    #[must_use]
    pub fn call_label(&self) -> String {
        self.request.label()
    }
}
