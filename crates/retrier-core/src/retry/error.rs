//! Error types for the retry loop
//!
//! This module defines the terminal failures of a retry run: the policy was
//! exhausted while the command was still failing, or the error hook aborted
//! the run.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that can end a retry run
///
/// The error type is generic over `E`, the error type of the command being
/// retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The retry policy stopped while the last attempt was still failing
    ///
    /// Returned when the attempt limit is reached, or when an `until` or
    /// `only_if` predicate stops the loop on a failed attempt.
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// Configured attempt limit (`0` for unlimited)
        max_attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The error hook failed and aborted the run
    ///
    /// The hook's error is returned as is. It is never reported as an
    /// exhausted policy.
    Aborted {
        /// The attempt during which the hook failed
        attempt: u32,
        /// The error raised by the hook
        source: anyhow::Error,
    },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                max_attempts,
                source,
                ..
            } => {
                write!(
                    f,
                    "Maximum number of retries reached. ({}/{}): {}",
                    attempts, max_attempts, source
                )
            }
            RetryError::Aborted { attempt, source } => {
                write!(f, "retry aborted by error hook on attempt {}: {}", attempt, source)
            }
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { source, .. } => Some(&**source),
        }
    }
}

impl<E> RetryError<E> {
    /// Create a new exhausted error
    pub fn exhausted(attempts: u32, max_attempts: u32, source: E, total_duration: Duration) -> Self {
        RetryError::Exhausted {
            attempts,
            max_attempts,
            source,
            total_duration,
        }
    }

    /// Create a new aborted error
    pub fn aborted(attempt: u32, source: anyhow::Error) -> Self {
        RetryError::Aborted { attempt, source }
    }

    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Aborted { attempt, .. } => *attempt,
        }
    }

    /// Get the configured attempt limit, if the policy was exhausted
    pub fn max_attempts(&self) -> Option<u32> {
        match self {
            RetryError::Exhausted { max_attempts, .. } => Some(*max_attempts),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Check if this error indicates the policy was exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error was raised by the error hook
    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// Get the command's error, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Get a reference to the command's error
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { .. } => None,
        }
    }

    /// Get the hook's error, if the run was aborted
    pub fn hook_error(&self) -> Option<&anyhow::Error> {
        match self {
            RetryError::Aborted { source, .. } => Some(source),
            RetryError::Exhausted { .. } => None,
        }
    }

    /// Map the command's error type using a closure
    pub fn map_err<F, E2>(self, f: F) -> RetryError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            RetryError::Exhausted {
                attempts,
                max_attempts,
                source,
                total_duration,
            } => RetryError::Exhausted {
                attempts,
                max_attempts,
                source: f(source),
                total_duration,
            },
            RetryError::Aborted { attempt, source } => RetryError::Aborted { attempt, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exhausted_error() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            3,
            io::Error::new(io::ErrorKind::TimedOut, "timeout"),
            Duration::from_secs(5),
        );

        assert!(err.is_exhausted());
        assert!(!err.is_aborted());
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.max_attempts(), Some(3));
        assert!(err.hook_error().is_none());
    }

    #[test]
    fn test_aborted_error() {
        let err: RetryError<io::Error> = RetryError::aborted(2, anyhow::anyhow!("stop now"));

        assert!(err.is_aborted());
        assert_eq!(err.attempts(), 2);
        assert_eq!(err.max_attempts(), None);
        assert!(err.source_ref().is_none());
        assert_eq!(err.hook_error().unwrap().to_string(), "stop now");
    }

    #[test]
    fn test_error_source_chain() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            2,
            2,
            io::Error::new(io::ErrorKind::Other, "disk full"),
            Duration::ZERO,
        );

        let source = err.source().expect("exhausted error should carry its cause");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn test_into_source() {
        let err: RetryError<String> =
            RetryError::exhausted(3, 3, "original error".to_string(), Duration::from_secs(1));

        assert_eq!(err.into_source(), Some("original error".to_string()));
    }

    #[test]
    fn test_map_err() {
        let err: RetryError<i32> = RetryError::exhausted(3, 0, 42, Duration::from_secs(1));

        let mapped = err.map_err(|n| format!("error code: {}", n));
        assert!(
            matches!(mapped, RetryError::Exhausted { source, max_attempts: 0, .. } if source == "error code: 42")
        );
    }

    #[test]
    fn test_display() {
        let err: RetryError<io::Error> = RetryError::exhausted(
            3,
            5,
            io::Error::new(io::ErrorKind::TimedOut, "connection timeout"),
            Duration::from_secs(5),
        );

        let display = format!("{}", err);
        assert!(display.contains("Maximum number of retries reached. (3/5)"));
        assert!(display.contains("connection timeout"));
    }
}
