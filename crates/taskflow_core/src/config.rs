//! Store runtime configuration.
//!
//! # Responsibility
//! - Hold the behavior switches shared by all stores.
//! - Parse overrides from process environment.
//!
//! # Invariants
//! - `StoreConfig::default()` preserves non-cascading deletes.
//! - Environment parsing never panics; bad values yield `ConfigError`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const ENV_CASCADE_ON_DELETE: &str = "TASKFLOW_CASCADE_ON_DELETE";
pub const ENV_LOAD_LATENCY_MS: &str = "TASKFLOW_LOAD_LATENCY_MS";
pub const ENV_LOG_LEVEL: &str = "TASKFLOW_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { var: &'static str, value: String },
    InvalidDuration { var: &'static str, value: String },
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBool { var, value } => {
                write!(f, "{var} must be true|false|1|0|yes|no, got `{value}`")
            }
            Self::InvalidDuration { var, value } => {
                write!(f, "{var} must be a non-negative integer of milliseconds, got `{value}`")
            }
            Self::InvalidLogLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Behavior switches for the board/column/task stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// When set, deleting a board removes its columns and tasks, and deleting
    /// a column removes its tasks. When unset, children are left orphaned.
    pub cascade_on_delete: bool,
    /// How long `is_loading()` keeps reporting `true` after a load.
    ///
    /// Data is available immediately regardless of this value.
    pub load_latency: Duration,
    pub log_level: &'static str,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cascade_on_delete: false,
            load_latency: Duration::ZERO,
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    pub fn with_cascade_on_delete(mut self, cascade: bool) -> Self {
        self.cascade_on_delete = cascade;
        self
    }

    pub fn with_load_latency(mut self, latency: Duration) -> Self {
        self.load_latency = latency;
        self
    }

    /// Builds a config from defaults overridden by `TASKFLOW_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StoreConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_CASCADE_ON_DELETE) {
            config.cascade_on_delete = parse_bool(ENV_CASCADE_ON_DELETE, &value)?;
        }
        if let Some(value) = lookup(ENV_LOAD_LATENCY_MS) {
            config.load_latency = parse_millis(ENV_LOAD_LATENCY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?;
        }
        Ok(config)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_millis(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidDuration {
            var,
            value: value.to_string(),
        })
}
