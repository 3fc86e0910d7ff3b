//! Configuration errors.

/// Failure to read or validate a [`Config`](crate::Config).
///
/// # Examples
///
/// ```
/// use canopy_core::ConfigError;
///
/// let error = ConfigError::invalid_option("git.command", "must not be empty");
/// assert_eq!(
///     error.to_string(),
///     "invalid configuration option 'git.command': must not be empty"
/// );
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field holds a value that passes deserialization but is unusable.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// Dotted path of the field, e.g. `git.command`.
        option: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`Config`](crate::Config).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
