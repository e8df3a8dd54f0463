// crates/petstore-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: File- and environment-backed configuration for contract runs.
// Purpose: Centralize config parsing with strict UTF-8 validation.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. Config files are size-capped
//! and reject unknown keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::assertions::RetryPolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Public pet-store deployment used when nothing overrides it.
pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";
/// API key accepted by the public demo deployment.
const DEFAULT_API_KEY: &str = "special_key";
/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for config files read from disk.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Base URL of the pet-store API (`http` or `https`).
    BaseUrl,
    /// API key sent on pet reads and deletes.
    ApiKey,
    /// Per-request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Retries for eventually-gone polls (non-negative integer).
    GoneRetries,
    /// Delay between eventually-gone attempts in milliseconds.
    GoneDelayMs,
    /// Optional artifact root for run summaries and transcripts.
    RunRoot,
}

impl HarnessEnv {
    /// All known environment keys.
    pub const ALL: [Self; 6] = [
        Self::BaseUrl,
        Self::ApiKey,
        Self::TimeoutSeconds,
        Self::GoneRetries,
        Self::GoneDelayMs,
        Self::RunRoot,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "PETSTORE_BASE_URL",
            Self::ApiKey => "PETSTORE_API_KEY",
            Self::TimeoutSeconds => "PETSTORE_TIMEOUT_SEC",
            Self::GoneRetries => "PETSTORE_GONE_RETRIES",
            Self::GoneDelayMs => "PETSTORE_GONE_DELAY_MS",
            Self::RunRoot => "PETSTORE_RUN_ROOT",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("{0}")]
    Invalid(String),
    /// Config file could not be read.
    #[error("config file io error: {0}")]
    Io(String),
    /// Config file exceeds [`MAX_CONFIG_FILE_BYTES`].
    #[error("config file exceeds size limit ({actual} > {max} bytes)")]
    TooLarge {
        /// Observed file size in bytes.
        actual: u64,
        /// Allowed size in bytes.
        max: u64,
    },
    /// Config file is not UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// Config file is not valid TOML for the expected schema.
    #[error("config parse error: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration.
///
/// # Invariants
/// - `base_url` uses the `http` or `https` scheme and can carry path segments.
/// - `timeout` is strictly positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Root URL that `/pet`, `/store`, and `/user` are joined onto.
    pub base_url: Url,
    /// API key sent in the `api_key` header.
    pub api_key: String,
    /// Timeout applied to every HTTP call.
    pub timeout: Duration,
    /// Poll budget for eventually-gone checks.
    pub gone_policy: RetryPolicy,
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: DEFAULT_API_KEY.to_string(),
            timeout: DEFAULT_TIMEOUT,
            gone_policy: RetryPolicy::default(),
            run_root: None,
        }
    }
}

/// On-disk config shape; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// Base URL override.
    base_url: Option<String>,
    /// API key override.
    api_key: Option<String>,
    /// Timeout override in seconds.
    timeout_sec: Option<u64>,
    /// Eventually-gone retry override.
    gone_retries: Option<u32>,
    /// Eventually-gone delay override in milliseconds.
    gone_delay_ms: Option<u64>,
    /// Artifact root override.
    run_root: Option<PathBuf>,
}

impl HarnessConfig {
    /// Loads defaults, the optional config file, then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or any environment value is
    /// unreadable or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Loads configuration from environment variables on top of defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8,
    /// is empty, or fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Loads configuration from a TOML file on top of defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing, too large, not UTF-8,
    /// contains unknown keys, or holds invalid values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge {
                actual: metadata.len(),
                max: MAX_CONFIG_FILE_BYTES,
            });
        }
        let bytes =
            fs::read(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        Self::from_toml_str(&text)
    }

    /// Parses configuration from TOML text on top of defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the TOML is malformed or holds invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();
        if let Some(raw) = file.base_url {
            config.base_url = parse_base_url("base_url", &raw)?;
        }
        if let Some(api_key) = file.api_key {
            config.api_key = require_nonempty("api_key", api_key)?;
        }
        if let Some(secs) = file.timeout_sec {
            if secs == 0 {
                return Err(ConfigError::Invalid("timeout_sec must be greater than zero".into()));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = file.gone_retries {
            config.gone_policy.retries = retries;
        }
        if let Some(delay_ms) = file.gone_delay_ms {
            config.gone_policy.delay = Duration::from_millis(delay_ms);
        }
        if file.run_root.is_some() {
            config.run_root = file.run_root;
        }
        Ok(config)
    }

    /// Applies environment overrides in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is invalid.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(raw) = read_env_nonempty(HarnessEnv::BaseUrl.as_str())? {
            self.base_url = parse_base_url(HarnessEnv::BaseUrl.as_str(), &raw)?;
        }
        if let Some(api_key) = read_env_nonempty(HarnessEnv::ApiKey.as_str())? {
            self.api_key = api_key;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())? {
            self.timeout = parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &raw)?;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::GoneRetries.as_str())? {
            self.gone_policy.retries = parse_number(HarnessEnv::GoneRetries.as_str(), &raw)?;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::GoneDelayMs.as_str())? {
            let millis: u64 = parse_number(HarnessEnv::GoneDelayMs.as_str(), &raw)?;
            self.gone_policy.delay = Duration::from_millis(millis);
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::RunRoot.as_str())? {
            self.run_root = Some(PathBuf::from(raw));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and validates a base URL.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the URL does not parse, uses a scheme
/// other than `http`/`https`, or cannot carry path segments.
pub fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ConfigError::Invalid(format!("{name} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{name} must use http or https")));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid(format!("{name} must be a hierarchical url")));
    }
    Ok(url)
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) => require_nonempty(name, value).map(Some),
        None => Ok(None),
    }
}

/// Rejects empty or whitespace-only values.
fn require_nonempty(name: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{name} must not be empty")));
    }
    Ok(value)
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer number of seconds")))?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a non-negative integer.
fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a non-negative integer")))
}

/// Returns the parsed default base URL.
#[allow(clippy::expect_used, reason = "DEFAULT_BASE_URL is a well-formed literal covered by tests.")]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url parses")
}
