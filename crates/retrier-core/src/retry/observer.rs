//! Retry observation and logging
//!
//! This module provides the `RetryObserver` trait for monitoring retry attempts
//! and a `TracingObserver` implementation that logs using the `tracing` crate.

use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Receives events from a running [`crate::Retry`]
///
/// Every method gets the 1-indexed attempt number it reports on. Observers
/// only watch the run; use `on_error` on the `Retry` to influence it.
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::RetryObserver;
/// use std::fmt::Display;
/// use std::time::Duration;
///
/// struct Printer;
///
/// impl RetryObserver for Printer {
///     fn on_attempt_start(&self, attempt: u32, _max_attempts: u32) {
///         println!("attempt {}", attempt);
///     }
///
///     fn on_attempt_failed(&self, attempt: u32, error: Option<&dyn Display>, delay: Duration) {
///         if let Some(err) = error {
///             println!("attempt {} failed: {}, retrying in {:?}", attempt, err, delay);
///         }
///     }
///
///     fn on_success(&self, attempt: u32, _total_duration: Duration) {
///         println!("accepted attempt {}", attempt);
///     }
///
///     fn on_exhausted(&self, attempts: u32, _max_attempts: u32, final_error: &dyn Display) {
///         println!("gave up after {}: {}", attempts, final_error);
///     }
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1-indexed)
    /// * `max_attempts` - The configured attempt limit (`0` for unlimited)
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Called when an attempt will be retried
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that is being retried (1-indexed)
    /// * `error` - The command's error, or `None` if a successful value was
    ///   rejected by an `only_if` predicate
    /// * `delay` - The delay before the next attempt
    fn on_attempt_failed(&self, attempt: u32, error: Option<&dyn Display>, delay: Duration);

    /// Called when a value is accepted
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that succeeded (1-indexed)
    /// * `total_duration` - Total time spent across all attempts
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when the run ends on a failed attempt
    ///
    /// # Arguments
    ///
    /// * `attempts` - Total number of attempts made
    /// * `max_attempts` - The configured attempt limit (`0` for unlimited)
    /// * `final_error` - The error from the final attempt
    fn on_exhausted(&self, attempts: u32, max_attempts: u32, final_error: &dyn Display);

    /// Called when the error hook fails and aborts the run
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number when aborted (1-indexed)
    /// * `error` - The error raised by the hook
    fn on_aborted(&self, attempt: u32, error: &anyhow::Error) {
        // Default implementation does nothing
        let _ = (attempt, error);
    }
}

/// A no-op observer that does nothing
///
/// This is the default observer of a [`crate::Retry`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: Option<&dyn Display>, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _max_attempts: u32, _final_error: &dyn Display) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (if > 1 attempt) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
/// - `on_aborted`: WARN
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::TracingObserver;
///
/// // Create with command name for better log context
/// let observer = TracingObserver::new("fetch-index");
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the command being retried (for log context)
    command: String,
}

impl TracingObserver {
    /// Create a new tracing observer
    ///
    /// # Arguments
    ///
    /// * `command` - A descriptive name for the command being retried
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Get the command name
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            command = %self.command,
            attempt = attempt,
            max_attempts = max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: Option<&dyn Display>, delay: Duration) {
        match error {
            Some(err) => tracing::warn!(
                command = %self.command,
                attempt = attempt,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "attempt failed, will retry"
            ),
            None => tracing::warn!(
                command = %self.command,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "result rejected, will retry"
            ),
        }
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                command = %self.command,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                command = %self.command,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, max_attempts: u32, final_error: &dyn Display) {
        tracing::error!(
            command = %self.command,
            attempts = attempts,
            max_attempts = max_attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }

    fn on_aborted(&self, attempt: u32, error: &anyhow::Error) {
        tracing::warn!(
            command = %self.command,
            attempt = attempt,
            error = %error,
            "retry aborted by error hook"
        );
    }
}

/// An observer that collects statistics about retry attempts
///
/// Useful for testing and metrics collection.
#[derive(Debug, Default)]
pub struct StatsObserver {
    /// Attempt start events
    pub attempt_starts: AtomicU32,
    /// Retried attempt events
    pub failures: AtomicU32,
    /// Success events
    pub successes: AtomicU32,
    /// Exhaustion events
    pub exhaustions: AtomicU32,
    /// Hook abort events
    pub aborts: AtomicU32,
}

impl StatsObserver {
    /// Create a new stats observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of attempt starts
    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    /// Get the number of retried attempts
    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    /// Get the number of successes
    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Get the number of exhaustions
    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    /// Get the number of hook aborts
    pub fn aborts(&self) -> u32 {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: Option<&dyn Display>, _delay: Duration) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _max_attempts: u32, _final_error: &dyn Display) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_aborted(&self, _attempt: u32, _error: &anyhow::Error) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Implement RetryObserver for Arc<T> where T: RetryObserver
impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: Option<&dyn Display>, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, max_attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, max_attempts, final_error)
    }

    fn on_aborted(&self, attempt: u32, error: &anyhow::Error) {
        (**self).on_aborted(attempt, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Replays a run of three attempts where the last one is accepted
    fn replay_success(observer: &dyn RetryObserver) {
        let error = "connection refused";
        for attempt in 1..=2 {
            observer.on_attempt_start(attempt, 3);
            observer.on_attempt_failed(attempt, Some(&error), Duration::from_millis(10));
        }
        observer.on_attempt_start(3, 3);
        observer.on_success(3, Duration::from_millis(25));
    }

    #[test]
    fn test_noop_observer_ignores_events() {
        replay_success(&NoOpObserver);
        NoOpObserver.on_exhausted(1, 1, &"boom");
        NoOpObserver.on_aborted(1, &anyhow::anyhow!("hook"));
    }

    #[test]
    fn test_stats_observer_counts_success_run() {
        let stats = StatsObserver::new();
        replay_success(&stats);

        assert_eq!(
            (stats.attempt_starts(), stats.failures(), stats.successes()),
            (3, 2, 1)
        );
        assert_eq!(stats.exhaustions(), 0);
        assert_eq!(stats.aborts(), 0);
    }

    #[test]
    fn test_stats_observer_counts_rejected_success() {
        let stats = StatsObserver::new();

        stats.on_attempt_start(1, 0);
        stats.on_attempt_failed(1, None, Duration::ZERO);
        stats.on_attempt_start(2, 0);
        stats.on_exhausted(2, 0, &"still failing");

        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.exhaustions(), 1);
    }

    #[test]
    fn test_tracing_observer_name() {
        assert_eq!(TracingObserver::new("deploy").command(), "deploy");
        assert_eq!(TracingObserver::default().command(), "retry");

        // Logging without a subscriber installed must not panic
        replay_success(&TracingObserver::new("deploy"));
    }

    #[test]
    fn test_shared_observer() {
        let stats = Arc::new(StatsObserver::new());
        let shared: Arc<dyn RetryObserver> = stats.clone();

        replay_success(&shared);
        shared.on_aborted(3, &anyhow::anyhow!("hook"));

        assert_eq!(stats.attempt_starts(), 3);
        assert_eq!(stats.aborts(), 1);
    }
}
