// crates/petstore-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for contract runs.
// Purpose: Provide typed access to the target deployment and retry settings.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is layered: defaults, then an optional TOML file, then
//! environment variables. Every layer is parsed strictly and fails closed on
//! empty, non-UTF-8, or out-of-range values.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_BASE_URL;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::MAX_CONFIG_FILE_BYTES;
pub use env::parse_base_url;
pub use env::read_env_strict;
