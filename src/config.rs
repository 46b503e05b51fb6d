//! Client configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize `SEAMLESSCHEX_*` variables into a type-safe struct.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::gateway::GatewayParameters;
use crate::services::ApiContext;

/// Prefix shared by every environment variable this client reads.
pub const ENV_PREFIX: &str = "SEAMLESSCHEX_";

/// Client configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SEAMLESSCHEX_API_KEY` (required): bearer token for the gateway API
/// - `SEAMLESSCHEX_TEST_MODE` (optional): use the sandbox host, defaults to false
/// - `SEAMLESSCHEX_TIMEOUT_SECS` (optional): HTTP timeout, defaults to 30
/// - `SEAMLESSCHEX_STORE` (optional): default store for tokens and token payments
/// - `SEAMLESSCHEX_MEMO` (optional): default check memo
#[derive(Clone, Deserialize)]
pub struct Config {
    pub api_key: String,

    #[serde(default)]
    pub test_mode: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub store: Option<String>,

    #[serde(default)]
    pub memo: Option<String>,
}

/// Default timeout if SEAMLESSCHEX_TIMEOUT_SECS is not set.
fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first when one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SEAMLESSCHEX_API_KEY` is missing
    /// - A value cannot be parsed into its expected type
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX).from_env::<Config>()
    }

    /// Load configuration from explicit `SEAMLESSCHEX_*` pairs instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl From<&Config> for GatewayParameters {
    fn from(config: &Config) -> Self {
        GatewayParameters {
            context: ApiContext::new(config.api_key.clone(), config.test_mode),
            store: config.store.clone(),
            token: None,
            memo: config.memo.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("test_mode", &self.test_mode)
            .field("timeout_secs", &self.timeout_secs)
            .field("store", &self.store)
            .field("memo", &self.memo)
            .finish()
    }
}
