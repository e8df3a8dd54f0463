// crates/petstore-harness/src/scenario/template.rs
// ============================================================================
// Module: Scenario Variables
// Description: Named values carried between steps and template rendering.
// Purpose: Substitute captured keys into paths, query values, and bodies.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Templates reference variables as `{name}`. A reference to a variable that
//! no earlier step captured (and the scenario did not seed) is an error, which
//! makes every step's precondition explicit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Template rendering and capture failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateError {
    /// A template referenced a variable that is not bound.
    #[error("unbound variable {{{name}}}")]
    UnboundVariable {
        /// Variable name.
        name: String,
    },
    /// A template contains an unterminated `{`.
    #[error("malformed template \"{template}\"")]
    Malformed {
        /// Offending template text.
        template: String,
    },
    /// A body binding pointed at a location absent from the body.
    #[error("body has no field at {pointer} to bind {{{name}}}")]
    MissingBindingTarget {
        /// JSON pointer into the request body.
        pointer: String,
        /// Variable name.
        name: String,
    },
    /// A capture pointed at a location absent from the response.
    #[error("response has no field at {pointer} to capture as {{{name}}}")]
    MissingCapture {
        /// JSON pointer into the response body.
        pointer: String,
        /// Variable name.
        name: String,
    },
}

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Scenario variables keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    /// Bound values.
    values: BTreeMap<String, Value>,
}

impl Variables {
    /// Creates an empty variable set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the value bound to `name` or an unbound-variable error.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnboundVariable`] when `name` is not bound.
    pub fn require(&self, name: &str) -> Result<&Value, TemplateError> {
        self.get(name).ok_or_else(|| TemplateError::UnboundVariable {
            name: name.to_string(),
        })
    }

    /// Substitutes every `{name}` in `template` with its bound value.
    ///
    /// Strings render raw; other JSON values render as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] for unbound variables or an unterminated `{`.
    pub fn render(&self, template: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(TemplateError::Malformed {
                    template: template.to_string(),
                });
            };
            let value = self.require(&after[..close])?;
            out.push_str(&value_text(value));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Renders a `/`-separated path template into raw path segments.
    ///
    /// Substituted values stay inside their segment even if they contain `/`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when any segment fails to render.
    pub fn render_path(&self, template: &str) -> Result<Vec<String>, TemplateError> {
        template
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.render(segment))
            .collect()
    }

    /// Writes the value of `name` into `body` at `pointer` (`""` replaces the
    /// whole body).
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when `name` is unbound or `pointer` does not
    /// exist in `body`.
    pub fn bind(&self, body: &mut Value, pointer: &str, name: &str) -> Result<(), TemplateError> {
        let value = self.require(name)?.clone();
        let Some(slot) = body.pointer_mut(pointer) else {
            return Err(TemplateError::MissingBindingTarget {
                pointer: pointer.to_string(),
                name: name.to_string(),
            });
        };
        *slot = value;
        Ok(())
    }

    /// Reads `pointer` from `body` and binds it to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingCapture`] when `pointer` is absent.
    pub fn capture(&mut self, body: &Value, pointer: &str, name: &str) -> Result<(), TemplateError> {
        let Some(value) = body.pointer(pointer) else {
            return Err(TemplateError::MissingCapture {
                pointer: pointer.to_string(),
                name: name.to_string(),
            });
        };
        self.insert(name, value.clone());
        Ok(())
    }
}

/// Renders a JSON value for interpolation into text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
