// system-tests/src/lib.rs
// ============================================================================
// Module: Pet Store System Tests Library
// Description: Shared options for live contract runs.
// Purpose: Keep live runs from colliding with other clients of a shared server.
// Dependencies: petstore-harness
// ============================================================================

//! ## Overview
//! Live runs target a public, shared pet-store deployment. The helpers here
//! derive per-run pet ids and usernames from a seed so two concurrent runs do
//! not create, update, or delete each other's records.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use petstore_harness::HarnessConfig;
use petstore_harness::SuiteOptions;
use petstore_harness::fixtures::PetOverrides;
use petstore_harness::fixtures::UserOverrides;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Base for per-run pet ids, well above ids seeded by the demo server.
const LIVE_PET_ID_BASE: i64 = 9_200_000_000;

/// Span of per-run pet ids.
const LIVE_PET_ID_SPAN: u64 = 1_000_000;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Returns a seed for the current run (milliseconds since the epoch).
#[must_use]
pub fn run_seed() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Suite options with per-run pet id and usernames.
///
/// The order suite keeps its baseline id because the demo server only serves
/// orders with small ids reliably.
#[must_use]
pub fn live_suite_options(config: &HarnessConfig, seed: u64) -> SuiteOptions {
    let offset = i64::try_from(seed % LIVE_PET_ID_SPAN).unwrap_or_default();
    let defaults = SuiteOptions::from_config(config);
    SuiteOptions {
        pet: PetOverrides {
            id: Some(LIVE_PET_ID_BASE + offset),
            ..PetOverrides::default()
        },
        first_user: UserOverrides {
            username: Some(format!("firstTest{seed}")),
            ..UserOverrides::default()
        },
        second_user: UserOverrides {
            username: Some(format!("secondTest{seed}")),
            ..UserOverrides::second_user()
        },
        ..defaults
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_options_are_unique_per_seed() {
        let config = HarnessConfig::default();
        let first = live_suite_options(&config, 1_700_000_000_123);
        let second = live_suite_options(&config, 1_700_000_000_124);
        assert_ne!(first.pet.id, second.pet.id);
        assert_ne!(first.first_user.username, second.first_user.username);
        assert_eq!(first.second_user.username.as_deref(), Some("secondTest1700000000123"));
        assert_eq!(first.second_user.password.as_deref(), Some("secondTestPass"));
        assert_eq!(first.api_key, config.api_key);
    }
}
