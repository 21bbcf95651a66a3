//! Configuration builder trait
//!
//! Common shape for configuration structures: defaults, validation,
//! environment loading and merging of several sources.

use crate::Result;

/// Trait for configuration structures that support building, validation, and merging
///
/// # Example
///
/// ```rust,ignore
/// use callwrap::config::ConfigBuilder;
///
/// #[derive(Clone, Default)]
/// struct CacheConfig {
///     pub name: Option<String>,
/// }
///
/// impl ConfigBuilder for CacheConfig {
///     fn from_env(prefix: &str) -> callwrap::Result<Self> {
///         Ok(Self {
///             name: callwrap::config::get_env(&format!("{}NAME", prefix))?,
///         })
///     }
///
///     fn merge(&mut self, other: Self) -> &mut Self {
///         if other.name.is_some() {
///             self.name = other.name;
///         }
///         self
///     }
/// }
/// ```
pub trait ConfigBuilder: Default + Clone {
    /// Validate the configuration
    ///
    /// Returns an error if a value is out of range or a required field is
    /// missing. The default implementation accepts everything.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `{PREFIX}{FIELD_NAME}` with the field
    /// name uppercased, e.g. `CALLWRAP_DEADLINE_SECS`. Fields whose variable
    /// is unset keep their default.
    fn from_env(prefix: &str) -> Result<Self>;

    /// Merge another configuration into this one
    ///
    /// Values set in `other` take precedence. Returns self for chaining.
    fn merge(&mut self, other: Self) -> &mut Self;

    /// Create and validate the default configuration
    fn build() -> Result<Self> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Start from defaults, overlay the environment, and validate
    fn from_env_with_defaults(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::from_env(prefix)?);
        config.validate()?;
        Ok(config)
    }
}
