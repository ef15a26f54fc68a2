//! Configuration error types for retrier-core
//!
//! These errors are raised while building a retry policy, before any attempt
//! of a command is made. Failures of the command itself are reported through
//! [`crate::retry::RetryError`].

use thiserror::Error;

/// Result type alias using retrier-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration error types
#[derive(Error, Debug)]
pub enum Error {
    /// Attempt limit is neither a number nor a known alias
    #[error("Invalid attempt limit: {value:?}. Expected a number or one of: once, twice, thrice, forever")]
    InvalidAttempts { value: String },

    /// Wait time is not a whole number of seconds
    #[error("Invalid wait time: {value:?}. Expected a whole number of seconds")]
    InvalidWait { value: String },

    /// Policy file not found
    #[error("Policy file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid attempts error
    pub fn invalid_attempts(value: impl Into<String>) -> Self {
        Self::InvalidAttempts {
            value: value.into(),
        }
    }

    /// Create an invalid wait error
    pub fn invalid_wait(value: impl Into<String>) -> Self {
        Self::InvalidWait {
            value: value.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
