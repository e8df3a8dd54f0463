// crates/petstore-harness/src/assertions.rs
// ============================================================================
// Module: Assertion Helpers
// Description: Status, subset-shape, message, and eventually-gone checks.
// Purpose: Turn response expectations into typed assertion failures.
// Dependencies: serde_json, thiserror, tokio, tracing
// ============================================================================

//! ## Overview
//! Assertions inspect [`HttpResponse`] values as data. Subset matching walks
//! the expected JSON and ignores extra keys in the actual value; failures
//! carry the JSON pointer of the first mismatch. The eventually-gone poll is
//! the only helper that retries, and only within its [`RetryPolicy`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Number;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::time::sleep;

use crate::client::HttpResponse;
use crate::client::TransportError;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Bounded poll budget for eventually-gone checks.
///
/// # Invariants
/// - Total attempts are `retries + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy.
    #[must_use]
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            delay,
        }
    }

    /// Returns the total number of attempts.
    #[must_use]
    pub const fn attempts(self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(500))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Assertion failure classification.
///
/// # Invariants
/// - Variants are stable for report labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    /// Response status differs from the expected status.
    StatusMismatch,
    /// Response body does not contain the expected shape.
    ShapeMismatch,
    /// Response `message` does not contain the expected text.
    MessageMismatch,
    /// Resource was still reachable after the poll budget.
    StillPresent,
}

impl AssertionKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusMismatch => "status_mismatch",
            Self::ShapeMismatch => "shape_mismatch",
            Self::MessageMismatch => "message_mismatch",
            Self::StillPresent => "still_present",
        }
    }
}

/// Expectation mismatch with expected and actual values when known.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}: {}", .kind.as_str(), .detail)]
pub struct AssertionError {
    /// Failure classification.
    pub kind: AssertionKind,
    /// Human-readable description.
    pub detail: String,
    /// Expected value, if the check had one.
    pub expected: Option<Value>,
    /// Observed value, if one was available.
    pub actual: Option<Value>,
}

impl AssertionError {
    /// Creates an assertion error without expected/actual values.
    #[must_use]
    pub fn new(kind: AssertionKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            expected: None,
            actual: None,
        }
    }

    /// Attaches expected and actual values.
    #[must_use]
    pub fn with_values(mut self, expected: Value, actual: Value) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self
    }
}

// ============================================================================
// SECTION: Status Assertions
// ============================================================================

/// Asserts that the response carries the expected status.
///
/// # Errors
///
/// Returns [`AssertionKind::StatusMismatch`] naming expected and actual.
pub fn assert_status(response: &HttpResponse, expected: u16) -> Result<(), AssertionError> {
    assert_status_in(response, &[expected])
}

/// Asserts that the response status is one of `expected`.
///
/// # Errors
///
/// Returns [`AssertionKind::StatusMismatch`] naming expected and actual.
pub fn assert_status_in(response: &HttpResponse, expected: &[u16]) -> Result<(), AssertionError> {
    let actual = response.status();
    if expected.contains(&actual) {
        return Ok(());
    }
    let expected_label = expected.iter().map(u16::to_string).collect::<Vec<_>>().join(" or ");
    Err(AssertionError::new(
        AssertionKind::StatusMismatch,
        format!("expected status {expected_label}, got {actual}"),
    )
    .with_values(json!(expected), json!(actual))
    .with_body_hint(response.body()))
}

impl AssertionError {
    /// Appends a short body excerpt to the detail for status mismatches.
    fn with_body_hint(mut self, body: &Value) -> Self {
        if !body.is_null() {
            let mut text = body.to_string();
            if text.len() > 200 {
                let cut = (0..=200).rev().find(|idx| text.is_char_boundary(*idx)).unwrap_or(0);
                text.truncate(cut);
                text.push_str("...");
            }
            self.detail = format!("{} (body: {text})", self.detail);
        }
        self
    }
}

// ============================================================================
// SECTION: Shape Assertions
// ============================================================================

/// Asserts that `actual` contains every key and value in `expected`.
///
/// Objects ignore extra keys in `actual`; arrays compare index by index with
/// the same subset rule, so `actual` may hold extra trailing items; numbers
/// compare by numeric value.
///
/// # Errors
///
/// Returns [`AssertionKind::ShapeMismatch`] naming the first mismatching
/// JSON pointer.
pub fn assert_matches_subset(actual: &Value, expected: &Value) -> Result<(), AssertionError> {
    match find_mismatch(actual, expected, String::new()) {
        None => Ok(()),
        Some(mismatch) => {
            let location = if mismatch.pointer.is_empty() { "/" } else { &mismatch.pointer };
            Err(AssertionError::new(
                AssertionKind::ShapeMismatch,
                format!("{} at {location}", mismatch.reason),
            )
            .with_values(mismatch.expected, mismatch.actual))
        }
    }
}

/// Asserts that the body is an object holding every key in `keys`.
///
/// # Errors
///
/// Returns [`AssertionKind::ShapeMismatch`] naming the first missing key.
pub fn assert_has_keys(body: &Value, keys: &[String]) -> Result<(), AssertionError> {
    let Some(object) = body.as_object() else {
        return Err(AssertionError::new(AssertionKind::ShapeMismatch, "expected a json object")
            .with_values(json!(keys), body.clone()));
    };
    match keys.iter().find(|key| !object.contains_key(key.as_str())) {
        Some(missing) => Err(AssertionError::new(
            AssertionKind::ShapeMismatch,
            format!("missing key {missing}"),
        )
        .with_values(json!(keys), body.clone())),
        None => Ok(()),
    }
}

/// Asserts that the body's `message` string contains `needle`.
///
/// # Errors
///
/// Returns [`AssertionKind::MessageMismatch`] when `message` is absent, not a
/// string, or lacks the text.
pub fn assert_message_contains(body: &Value, needle: &str) -> Result<(), AssertionError> {
    let message = body.get("message").and_then(Value::as_str);
    match message {
        Some(message) if message.contains(needle) => Ok(()),
        Some(message) => Err(AssertionError::new(
            AssertionKind::MessageMismatch,
            format!("message \"{message}\" does not contain \"{needle}\""),
        )
        .with_values(json!(needle), json!(message))),
        None => Err(AssertionError::new(
            AssertionKind::MessageMismatch,
            format!("response has no string message; expected one containing \"{needle}\""),
        )
        .with_values(json!(needle), body.clone())),
    }
}

/// Compares two JSON values structurally, treating numbers by value.
#[must_use]
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

/// First mismatch found while walking the expected value.
struct Mismatch {
    /// JSON pointer of the mismatch.
    pointer: String,
    /// Short description.
    reason: &'static str,
    /// Expected fragment.
    expected: Value,
    /// Actual fragment (`null` when missing).
    actual: Value,
}

/// Walks `expected` and returns the first location `actual` disagrees with.
fn find_mismatch(actual: &Value, expected: &Value, pointer: String) -> Option<Mismatch> {
    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (key, expected_value) in expected_map {
                let child = format!("{pointer}/{}", escape_pointer_token(key));
                match actual_map.get(key) {
                    Some(actual_value) => {
                        if let Some(found) = find_mismatch(actual_value, expected_value, child) {
                            return Some(found);
                        }
                    }
                    None => {
                        return Some(Mismatch {
                            pointer: child,
                            reason: "missing key",
                            expected: expected_value.clone(),
                            actual: Value::Null,
                        });
                    }
                }
            }
            None
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            if actual_items.len() < expected_items.len() {
                return Some(Mismatch {
                    pointer,
                    reason: "array too short",
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
            expected_items.iter().zip(actual_items).enumerate().find_map(
                |(index, (expected_item, actual_item))| {
                    find_mismatch(actual_item, expected_item, format!("{pointer}/{index}"))
                },
            )
        }
        (Value::Number(expected_number), Value::Number(actual_number)) => {
            if numbers_equal(expected_number, actual_number) {
                None
            } else {
                Some(Mismatch {
                    pointer,
                    reason: "value differs",
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            }
        }
        _ if expected == actual => None,
        (Value::Object(_) | Value::Array(_), _) => Some(Mismatch {
            pointer,
            reason: "type differs",
            expected: expected.clone(),
            actual: actual.clone(),
        }),
        _ => Some(Mismatch {
            pointer,
            reason: "value differs",
            expected: expected.clone(),
            actual: actual.clone(),
        }),
    }
}

/// Compares numbers by value across integer and float representations.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= f64::EPSILON * x.abs().max(y.abs()).max(1.0),
        _ => false,
    }
}

/// Escapes a key for use in a JSON pointer (RFC 6901).
fn escape_pointer_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

// ============================================================================
// SECTION: Eventually Gone
// ============================================================================

/// Polls `fetch` until it yields a 404 or the retry budget is exhausted.
///
/// Transport failures during polling count as "not gone yet". Returns the
/// number of attempts used.
///
/// # Errors
///
/// Returns [`AssertionKind::StillPresent`] describing the last observation
/// when no attempt returned 404.
pub async fn assert_eventually_gone<F, Fut>(
    mut fetch: F,
    policy: RetryPolicy,
) -> Result<u32, AssertionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpResponse, TransportError>>,
{
    let attempts = policy.attempts();
    let mut last_observation = Value::Null;
    let mut last_label = String::from("no response");
    for attempt in 1..=attempts {
        match fetch().await {
            Ok(response) if response.status() == 404 => {
                tracing::debug!(attempt, "resource gone");
                return Ok(attempt);
            }
            Ok(response) => {
                tracing::debug!(attempt, status = response.status(), "resource still present");
                last_label = format!("status {}", response.status());
                last_observation = json!(response.status());
            }
            Err(err) => {
                tracing::debug!(attempt, error = %err, "poll attempt failed");
                last_label = format!("transport error: {err}");
                last_observation = Value::String(err.to_string());
            }
        }
        if attempt < attempts && !policy.delay.is_zero() {
            sleep(policy.delay).await;
        }
    }
    Err(AssertionError::new(
        AssertionKind::StillPresent,
        format!("resource still reachable after {attempts} attempts (last: {last_label})"),
    )
    .with_values(json!(404), last_observation))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
