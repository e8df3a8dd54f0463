// crates/petstore-harness/src/suites/mod.rs
// ============================================================================
// Module: Resource Suites
// Description: Pet, order, and user scenarios declared as step lists.
// Purpose: Build the contract scenarios from options and fixtures.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Each suite is a single [`Scenario`] whose steps depend on one another
//! through captured variables. Suites are built fresh from [`SuiteOptions`]
//! so concurrent runs never share fixture values.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod order;
mod pet;
mod user;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::assertions::RetryPolicy;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fixtures::OrderOverrides;
use crate::fixtures::PetOverrides;
use crate::fixtures::UserOverrides;
use crate::scenario::BodyMatcher;
use crate::scenario::Scenario;

pub use order::order_scenario;
pub use pet::pet_scenario;
pub use user::user_scenario;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Inputs shared by every suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteOptions {
    /// Value of the `api_key` header on pet reads and deletes.
    pub api_key: String,
    /// Pet id expected not to exist.
    pub missing_pet_id: i64,
    /// Order id expected not to exist.
    pub missing_order_id: i64,
    /// Username expected not to exist.
    pub missing_username: String,
    /// Poll budget for eventually-gone steps.
    pub gone_policy: RetryPolicy,
    /// Pet fixture overrides.
    pub pet: PetOverrides,
    /// Order fixture overrides.
    pub order: OrderOverrides,
    /// First user fixture overrides.
    pub first_user: UserOverrides,
    /// Second user fixture overrides (the `secondTest` user by default).
    pub second_user: UserOverrides,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            api_key: "special_key".to_string(),
            missing_pet_id: 2,
            missing_order_id: 6,
            missing_username: "random user".to_string(),
            gone_policy: RetryPolicy::default(),
            pet: PetOverrides::default(),
            order: OrderOverrides::default(),
            first_user: UserOverrides::default(),
            second_user: UserOverrides::second_user(),
        }
    }
}

impl SuiteOptions {
    /// Options carrying the configured api key and poll budget.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            gone_policy: config.gone_policy,
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Suite Names
// ============================================================================

/// Resource suite identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SuiteName {
    /// `/pet` endpoints.
    Pet,
    /// `/store` endpoints.
    Order,
    /// `/user` endpoints.
    User,
}

impl SuiteName {
    /// Every suite in run order.
    pub const ALL: [Self; 3] = [Self::Pet, Self::Order, Self::User];

    /// Returns the suite label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pet => "pet",
            Self::Order => "order",
            Self::User => "user",
        }
    }

    /// Builds the suite's scenario.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Fixture`] when a fixture cannot be serialized.
    pub fn scenario(self, options: &SuiteOptions) -> Result<Scenario, HarnessError> {
        match self {
            Self::Pet => pet_scenario(options),
            Self::Order => order_scenario(options),
            Self::User => user_scenario(options),
        }
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteName {
    type Err = HarnessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| HarnessError::UnknownSuite(value.to_string()))
    }
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Builds the pet, order, and user scenarios in that order.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when a fixture cannot be serialized.
pub fn all_scenarios(options: &SuiteOptions) -> Result<Vec<Scenario>, HarnessError> {
    SuiteName::ALL.into_iter().map(|suite| suite.scenario(options)).collect()
}

/// Builds the scenario for the suite named `name`.
///
/// # Errors
///
/// Returns [`HarnessError::UnknownSuite`] for unrecognized names.
pub fn suite_by_name(name: &str, options: &SuiteOptions) -> Result<Scenario, HarnessError> {
    name.parse::<SuiteName>()?.scenario(options)
}

/// Matcher comparing a body field to a captured variable.
fn field_is_var(pointer: &str, var: &str) -> BodyMatcher {
    BodyMatcher::FieldEqualsVar {
        pointer: pointer.to_string(),
        var: var.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
