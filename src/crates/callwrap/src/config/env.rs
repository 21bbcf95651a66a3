//! Environment variable loading
//!
//! Helpers that read and parse environment variables, reporting malformed
//! values as configuration errors instead of silently falling back.

use crate::{CallwrapError, Result};
use std::env;
use std::str::FromStr;

/// Read an environment variable as a string
///
/// # Returns
///
/// * `Ok(Some(value))` if the variable is set
/// * `Ok(None)` if it is not set
/// * `Err` if it is set but not valid UTF-8
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(CallwrapError::Config(format!(
            "Environment variable {} contains invalid UTF-8",
            key
        ))),
    }
}

/// Read and parse an environment variable
///
/// An unset variable is `Ok(None)`; a set variable that fails to parse is
/// an error naming the variable.
///
/// # Example
///
/// ```rust,ignore
/// let secs: Option<u64> = get_env_parse("CALLWRAP_DEADLINE_SECS")?;
/// let level: Option<LogLevel> = get_env_parse("CALLWRAP_LOG_LEVEL")?;
/// ```
pub fn get_env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env(key)?
        .map(|val| {
            val.trim().parse::<T>().map_err(|e| {
                CallwrapError::Config(format!(
                    "Failed to parse environment variable {}: {}",
                    key, e
                ))
            })
        })
        .transpose()
}

/// Read an environment variable, using `default` when it is unset
pub fn get_env_or(key: &str, default: impl Into<String>) -> Result<String> {
    Ok(get_env(key)?.unwrap_or_else(|| default.into()))
}

/// Read and parse an environment variable, using `default` when it is unset
///
/// A set but unparsable value is still an error.
pub fn get_env_parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse(key)?.unwrap_or(default))
}

/// Read a boolean environment variable
///
/// Accepts `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`, ignoring case
/// and surrounding whitespace. Any other value is an error naming the
/// variable.
pub fn get_env_bool(key: &str) -> Result<Option<bool>> {
    let Some(val) = get_env(key)? else {
        return Ok(None);
    };

    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Some(true)),
        "false" | "0" | "no" | "off" => Ok(Some(false)),
        _ => Err(CallwrapError::Config(format!(
            "Invalid boolean value for {}: {}",
            key, val
        ))),
    }
}

/// Build a prefixed environment variable name
///
/// ```rust
/// use callwrap::config::build_env_key;
///
/// assert_eq!(build_env_key("CALLWRAP_", "deadline_secs"), "CALLWRAP_DEADLINE_SECS");
/// ```
pub fn build_env_key(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name.to_uppercase())
}
