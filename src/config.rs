//! Configuration System
//!
//! Layered configuration for the sync engine: built-in defaults, an optional
//! config file, and `REPOSYNC_*` environment variable overrides, merged with
//! the `config` crate.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Sync servers, tried in order. May be empty when a custom transport is
    /// injected instead of the HTTP one.
    #[serde(default)]
    pub servers: Vec<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            timeout_secs: default_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from defaults, an optional file, and environment.
    ///
    /// Environment overrides use the `REPOSYNC_` prefix with `__` as the
    /// nesting separator, e.g. `REPOSYNC_TIMEOUT_SECS=10` or
    /// `REPOSYNC_LOGGING__LEVEL=debug`.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("timeout_secs", default_timeout_secs() as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("REPOSYNC")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: SyncConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
