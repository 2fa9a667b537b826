//! Environment-driven configuration of the calculator demo.

use offerdesk_store::RuntimeMode;
use std::path::PathBuf;
use thiserror::Error;

/// Selects `development` or `production`
pub const MODE_VAR: &str = "OFFERDESK_ENV";
/// Directory holding the persisted snapshot
pub const STATE_DIR_VAR: &str = "OFFERDESK_STATE_DIR";
/// Standard `tracing` filter
pub const LOG_VAR: &str = "RUST_LOG";

const DEFAULT_STATE_DIR: &str = ".offerdesk";
const DEFAULT_LOG_FILTER: &str =
    "offerdesk_calculator=info,offerdesk_legacy=info,offerdesk_runtime=warn";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `OFFERDESK_ENV` holds something other than `development` or `production`
    #[error("{MODE_VAR} must be 'development' or 'production', got '{0}'")]
    InvalidMode(String),

    /// A variable was set to an empty string
    #[error("{0} is set but empty")]
    Empty(&'static str),
}

/// Demo settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Deployment mode recorded in `app.environment`
    pub mode: RuntimeMode,
    /// Where the snapshot file lives
    pub state_dir: PathBuf,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl DemoConfig {
    /// Read the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = match lookup(MODE_VAR).as_deref().map(str::trim) {
            None => RuntimeMode::default(),
            Some("development" | "dev") => RuntimeMode::Development,
            Some("production" | "prod") => RuntimeMode::Production,
            Some(other) => return Err(ConfigError::InvalidMode(other.to_string())),
        };

        let state_dir = match lookup(STATE_DIR_VAR) {
            None => PathBuf::from(DEFAULT_STATE_DIR),
            Some(dir) if dir.trim().is_empty() => return Err(ConfigError::Empty(STATE_DIR_VAR)),
            Some(dir) => PathBuf::from(dir),
        };

        let log_filter = lookup(LOG_VAR)
            .filter(|filter| !filter.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            mode,
            state_dir,
            log_filter,
        })
    }
}
