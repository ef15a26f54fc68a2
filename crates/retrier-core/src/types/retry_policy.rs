//! Retry policy types
//!
//! These types describe a retry policy as data so it can be loaded from a
//! policy file, environment variables or command-line flags and applied to a
//! [`crate::Retry`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Maximum number of attempts for a command
///
/// A limit of `0` means the command is attempted until it succeeds or an
/// `until` predicate stops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAttemptLimit", into = "u32")]
pub struct AttemptLimit(u32);

impl AttemptLimit {
    /// A single attempt, no retry
    pub const ONCE: Self = Self(1);
    /// Two attempts
    pub const TWICE: Self = Self(2);
    /// Three attempts
    pub const THRICE: Self = Self(3);
    /// No attempt limit
    pub const FOREVER: Self = Self(0);

    /// Create a limit of `attempts`, where `0` means unlimited
    pub const fn new(attempts: u32) -> Self {
        Self(attempts)
    }

    /// Get the raw attempt count
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Check if the limit is unlimited
    pub const fn is_unlimited(self) -> bool {
        self.0 == 0
    }
}

impl Default for AttemptLimit {
    fn default() -> Self {
        Self::ONCE
    }
}

impl From<u32> for AttemptLimit {
    fn from(attempts: u32) -> Self {
        Self(attempts)
    }
}

impl From<AttemptLimit> for u32 {
    fn from(limit: AttemptLimit) -> Self {
        limit.0
    }
}

impl FromStr for AttemptLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        match value.to_ascii_lowercase().as_str() {
            "once" => Ok(Self::ONCE),
            "twice" => Ok(Self::TWICE),
            "thrice" => Ok(Self::THRICE),
            "forever" | "unlimited" => Ok(Self::FOREVER),
            other => other
                .parse::<u32>()
                .map(Self)
                .map_err(|_| Error::invalid_attempts(s)),
        }
    }
}

impl fmt::Display for AttemptLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unlimited() {
            write!(f, "forever")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Serialized form of an attempt limit: a count or an alias
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttemptLimit {
    Count(u32),
    Alias(String),
}

impl TryFrom<RawAttemptLimit> for AttemptLimit {
    type Error = Error;

    fn try_from(raw: RawAttemptLimit) -> Result<Self> {
        match raw {
            RawAttemptLimit::Count(n) => Ok(Self(n)),
            RawAttemptLimit::Alias(alias) => alias.parse(),
        }
    }
}

/// Parse a wait time given in whole seconds
pub fn parse_wait_secs(value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_wait(value))
}

/// Retry policy for a command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Maximum number of attempts (`forever` or `0` for unlimited)
    #[serde(default)]
    pub max_attempts: AttemptLimit,

    /// Seconds to wait before each retry
    #[serde(default)]
    pub wait_secs: u64,
}

impl RetryPolicy {
    /// Delay before each retry, if any
    pub fn wait(&self) -> Option<Duration> {
        (self.wait_secs > 0).then(|| Duration::from_secs(self.wait_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_limit_aliases() {
        assert_eq!("once".parse::<AttemptLimit>().unwrap(), AttemptLimit::new(1));
        assert_eq!("twice".parse::<AttemptLimit>().unwrap(), AttemptLimit::new(2));
        assert_eq!("Thrice".parse::<AttemptLimit>().unwrap(), AttemptLimit::new(3));
        assert_eq!("forever".parse::<AttemptLimit>().unwrap(), AttemptLimit::new(0));
        assert_eq!(" 27 ".parse::<AttemptLimit>().unwrap(), AttemptLimit::new(27));
    }

    #[test]
    fn test_attempt_limit_rejects_non_numeric() {
        let err = "nan".parse::<AttemptLimit>().unwrap_err();
        assert!(matches!(err, Error::InvalidAttempts { ref value } if value == "nan"));

        assert!("-1".parse::<AttemptLimit>().is_err());
        assert!("2.5".parse::<AttemptLimit>().is_err());
    }

    #[test]
    fn test_attempt_limit_display() {
        assert_eq!(AttemptLimit::FOREVER.to_string(), "forever");
        assert_eq!(AttemptLimit::THRICE.to_string(), "3");
    }

    #[test]
    fn test_parse_wait_secs() {
        assert_eq!(parse_wait_secs("5").unwrap(), 5);
        assert!(matches!(
            parse_wait_secs("soon"),
            Err(Error::InvalidWait { .. })
        ));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, AttemptLimit::ONCE);
        assert_eq!(policy.wait(), None);
    }

    #[test]
    fn test_policy_from_yaml() {
        let policy: RetryPolicy = serde_yaml_ng::from_str("max-attempts: thrice\nwait-secs: 2\n").unwrap();
        assert_eq!(policy.max_attempts, AttemptLimit::THRICE);
        assert_eq!(policy.wait(), Some(Duration::from_secs(2)));

        let policy: RetryPolicy = serde_yaml_ng::from_str("max-attempts: 7\n").unwrap();
        assert_eq!(policy.max_attempts.get(), 7);
        assert_eq!(policy.wait_secs, 0);
    }

    #[test]
    fn test_policy_from_yaml_rejects_bad_alias() {
        let result: std::result::Result<RetryPolicy, _> = serde_yaml_ng::from_str("max-attempts: often\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_policy_serializes_limit_as_number() {
        let policy = RetryPolicy {
            max_attempts: AttemptLimit::FOREVER,
            wait_secs: 1,
        };
        let yaml = serde_yaml_ng::to_string(&policy).unwrap();
        assert!(yaml.contains("max-attempts: 0"));
        assert!(yaml.contains("wait-secs: 1"));
    }
}
