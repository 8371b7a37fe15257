//! Tracking configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DRIFTWOOD_API_BASE_URL` - Order-management backend base URL
//!
//! ## Optional
//! - `DRIFTWOOD_STREAM_URL` - Push channel endpoint (default: `{base}/orders/stream`)
//! - `DRIFTWOOD_API_TOKEN` - Account credential; absent for guest sessions
//! - `DRIFTWOOD_DATA_DIR` - Guest store directory (default: `.driftwood`)
//! - `DRIFTWOOD_TICK_INTERVAL_SECS` - Simulator tick interval (default: 10)
//! - `DRIFTWOOD_RECONNECT_DELAY_SECS` - Push reconnect delay (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN (read by the CLI)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::simulator::SimulatorSchedule;

const DEFAULT_DATA_DIR: &str = ".driftwood";
const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tracking subsystem configuration.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Order-management backend base URL (normalized to end in `/`).
    pub api_base_url: Url,
    /// Push channel streaming endpoint.
    pub stream_url: Url,
    /// Account credential; absent for guest sessions.
    pub api_token: Option<SecretString>,
    /// Directory of the guest session store.
    pub data_dir: PathBuf,
    /// Simulator tick interval.
    pub tick_interval: Duration,
    /// Push channel reconnect delay.
    pub reconnect_delay: Duration,
    /// Simulator threshold schedule.
    pub schedule: SimulatorSchedule,
}

impl TrackingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("DRIFTWOOD_API_BASE_URL")?)?;
        let stream_url = match get_optional_env("DRIFTWOOD_STREAM_URL") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("DRIFTWOOD_STREAM_URL".to_string(), e.to_string())
            })?,
            None => api_base_url.join("orders/stream").map_err(|e| {
                ConfigError::InvalidEnvVar("DRIFTWOOD_API_BASE_URL".to_string(), e.to_string())
            })?,
        };
        let api_token = get_optional_env("DRIFTWOOD_API_TOKEN").map(SecretString::from);
        let data_dir = PathBuf::from(get_env_or_default("DRIFTWOOD_DATA_DIR", DEFAULT_DATA_DIR));
        let tick_interval = Duration::from_secs(get_secs_or_default(
            "DRIFTWOOD_TICK_INTERVAL_SECS",
            DEFAULT_TICK_INTERVAL_SECS,
        )?);
        let reconnect_delay = Duration::from_secs(get_secs_or_default(
            "DRIFTWOOD_RECONNECT_DELAY_SECS",
            DEFAULT_RECONNECT_DELAY_SECS,
        )?);

        Ok(Self {
            api_base_url,
            stream_url,
            api_token,
            data_dir,
            tick_interval,
            reconnect_delay,
            schedule: SimulatorSchedule::default(),
        })
    }

    /// Whether the session holds an account credential.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.api_token.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a seconds value from the environment, falling back to a default.
fn get_secs_or_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Parse the backend base URL, normalizing it to end in `/` so relative
/// endpoint joins keep the full path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|e| {
        ConfigError::InvalidEnvVar("DRIFTWOOD_API_BASE_URL".to_string(), e.to_string())
    })
}
