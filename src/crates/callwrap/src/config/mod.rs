//! Configuration management
//!
//! - `ConfigBuilder` trait for consistent configuration APIs
//! - Environment variable loading with proper error handling
//! - `WrapConfig`, the defaults applied to deadline wrappers
//!
//! # Example
//!
//! ```rust,no_run
//! use callwrap::config::{ConfigBuilder, WrapConfig};
//! use callwrap::Deadline;
//!
//! // CALLWRAP_DEADLINE_SECS=5 CALLWRAP_LOG_LEVEL=info
//! let config = WrapConfig::from_env_with_defaults(WrapConfig::ENV_PREFIX)?;
//! let deadline = Deadline::from_config(&config);
//! # Ok::<(), callwrap::CallwrapError>(())
//! ```

mod builder;
mod env;

pub use builder::ConfigBuilder;
pub use env::{
    build_env_key, get_env, get_env_bool, get_env_or, get_env_parse, get_env_parse_or,
};

use crate::logging::LogLevel;
use crate::{CallwrapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults applied to deadline-wrapped calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Deadline in whole seconds
    pub deadline_secs: u64,
    /// Level for call entry/exit events
    pub log_level: LogLevel,
    /// Name given to deadline worker threads
    pub worker_name: String,
}

impl WrapConfig {
    /// Prefix for environment variables read by [`ConfigBuilder::from_env`]
    pub const ENV_PREFIX: &'static str = "CALLWRAP_";

    pub const DEFAULT_DEADLINE_SECS: u64 = 30;

    pub const DEFAULT_WORKER_NAME: &'static str = "callwrap-deadline";

    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline in seconds
    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.deadline_secs = secs;
        self
    }

    /// Set the log level for call spans
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set the worker thread name
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    /// The configured deadline as a `Duration`
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            deadline_secs: Self::DEFAULT_DEADLINE_SECS,
            log_level: LogLevel::default(),
            worker_name: Self::DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

impl ConfigBuilder for WrapConfig {
    fn validate(&self) -> Result<()> {
        if self.deadline_secs == 0 {
            return Err(CallwrapError::Config(
                "deadline_secs must be a positive number of seconds".into(),
            ));
        }
        if self.worker_name.trim().is_empty() {
            return Err(CallwrapError::Config("worker_name must not be empty".into()));
        }
        Ok(())
    }

    fn from_env(prefix: &str) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            deadline_secs: get_env_parse_or(
                &build_env_key(prefix, "deadline_secs"),
                defaults.deadline_secs,
            )?,
            log_level: get_env_parse_or(&build_env_key(prefix, "log_level"), defaults.log_level)?,
            worker_name: get_env_or(&build_env_key(prefix, "worker_name"), defaults.worker_name)?,
        })
    }

    /// Overlay fields of `other` that differ from the defaults
    ///
    /// A field in `other` equal to its default counts as unset, so an
    /// overlay cannot reset a non-default base value back to the default.
    /// Set such a field directly with the `with_*` builders instead.
    fn merge(&mut self, other: Self) -> &mut Self {
        let defaults = Self::default();

        if other.deadline_secs != defaults.deadline_secs {
            self.deadline_secs = other.deadline_secs;
        }
        if other.log_level != defaults.log_level {
            self.log_level = other.log_level;
        }
        if other.worker_name != defaults.worker_name {
            self.worker_name = other.worker_name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WrapConfig::default();
        assert_eq!(config.deadline_secs, 30);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.worker_name, "callwrap-deadline");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = WrapConfig::new()
            .with_deadline_secs(2)
            .with_log_level(LogLevel::Warn)
            .with_worker_name("slow-io");

        assert_eq!(config.deadline(), Duration::from_secs(2));
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.worker_name, "slow-io");
    }

    #[test]
    fn test_validate_rejects_zero_deadline() {
        let config = WrapConfig::new().with_deadline_secs(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("deadline_secs"));
    }

    #[test]
    fn test_validate_rejects_blank_worker_name() {
        let config = WrapConfig::new().with_worker_name("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("CALLWRAP_ENVTEST_DEADLINE_SECS", "7");
        std::env::set_var("CALLWRAP_ENVTEST_LOG_LEVEL", "info");

        let config = WrapConfig::from_env_with_defaults("CALLWRAP_ENVTEST_").unwrap();
        assert_eq!(config.deadline_secs, 7);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.worker_name, WrapConfig::DEFAULT_WORKER_NAME);

        std::env::remove_var("CALLWRAP_ENVTEST_DEADLINE_SECS");
        std::env::remove_var("CALLWRAP_ENVTEST_LOG_LEVEL");
    }

    #[test]
    fn test_from_env_rejects_zero() {
        std::env::set_var("CALLWRAP_ZEROTEST_DEADLINE_SECS", "0");
        assert!(WrapConfig::from_env_with_defaults("CALLWRAP_ZEROTEST_").is_err());
        std::env::remove_var("CALLWRAP_ZEROTEST_DEADLINE_SECS");
    }

    #[test]
    fn test_from_env_invalid_level() {
        std::env::set_var("CALLWRAP_LVLTEST_LOG_LEVEL", "loud");
        assert!(WrapConfig::from_env("CALLWRAP_LVLTEST_").is_err());
        std::env::remove_var("CALLWRAP_LVLTEST_LOG_LEVEL");
    }

    #[test]
    fn test_merge_keeps_non_default_values() {
        let mut base = WrapConfig::new().with_deadline_secs(10);
        base.merge(WrapConfig::new().with_log_level(LogLevel::Error));

        assert_eq!(base.deadline_secs, 10);
        assert_eq!(base.log_level, LogLevel::Error);
    }

    #[test]
    fn test_merge_cannot_restore_default() {
        let mut base = WrapConfig::new().with_deadline_secs(10);
        base.merge(WrapConfig::new().with_deadline_secs(WrapConfig::DEFAULT_DEADLINE_SECS));
        assert_eq!(base.deadline_secs, 10);

        let base = base.with_deadline_secs(WrapConfig::DEFAULT_DEADLINE_SECS);
        assert_eq!(base.deadline_secs, 30);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: WrapConfig = serde_json::from_str(r#"{"deadline_secs": 3}"#).unwrap();
        assert_eq!(config.deadline_secs, 3);
        assert_eq!(config.log_level, LogLevel::Debug);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["log_level"], "debug");
    }
}
