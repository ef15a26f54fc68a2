//! Retry policy loader with precedence
//!
//! Loads a retry policy from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults (one attempt, no wait)
//! 2. Policy file (YAML)
//! 3. Environment variables (RETRIER_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::{parse_wait_secs, RetryPolicy};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use std::env;
use std::fs;

/// Environment variable overriding the attempt limit
pub const ATTEMPTS_ENV: &str = "RETRIER_ATTEMPTS";

/// Environment variable overriding the wait between retries
pub const WAIT_SECS_ENV: &str = "RETRIER_WAIT_SECS";

/// Retry policy loader
#[derive(Debug, Clone, Default)]
pub struct PolicyLoader {
    /// Optional policy file
    path: Option<Utf8PathBuf>,
}

impl PolicyLoader {
    /// Create a loader that only applies defaults and environment overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that reads the given policy file
    pub fn with_file(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Get the policy file path, if any
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Load the retry policy with hierarchical precedence
    pub fn load(&self) -> Result<RetryPolicy> {
        let mut policy = RetryPolicy::default();

        if let Some(path) = &self.path {
            if !path.exists() {
                return Err(Error::config_not_found(path.as_str()));
            }
            policy = Self::load_yaml_file(path)?;
            tracing::debug!(path = %path, "loaded retry policy file");
        }

        Self::apply_env_overrides(policy)
    }

    /// Load and parse a YAML file
    fn load_yaml_file<T: DeserializeOwned>(path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let config: T = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut policy: RetryPolicy) -> Result<RetryPolicy> {
        if let Ok(val) = env::var(ATTEMPTS_ENV) {
            policy.max_attempts = val.parse()?;
        }

        if let Ok(val) = env::var(WAIT_SECS_ENV) {
            policy.wait_secs = parse_wait_secs(&val)?;
        }

        Ok(policy)
    }
}
