//! Retry execution engine
//!
//! This module provides the `Retry` state machine that drives a command
//! according to its policy, and the `retry` convenience functions built on it.

use std::fmt::Display;
use std::thread;
use std::time::{Duration, Instant};

use crate::types::{AttemptLimit, RetryPolicy};

use super::command::{Command, Operation};
use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::outcome::Outcome;

/// Predicate over the attempt number and the outcome of that attempt
pub type Predicate<'a, T, E> = Box<dyn FnMut(u32, &Outcome<T, E>) -> bool + 'a>;

/// Hook run for every attempt that is not accepted
pub type ErrorHook<'a, T, E> = Box<dyn FnMut(u32, &Outcome<T, E>) -> anyhow::Result<()> + 'a>;

/// How long the convenience functions keep retrying
pub enum Limit<'a, T, E> {
    /// Stop after this many attempts (`0` for unlimited)
    Attempts(u32),
    /// Retry without an attempt limit until the predicate returns true
    Until(Predicate<'a, T, E>),
}

impl<'a, T, E> Limit<'a, T, E> {
    /// Limit the number of attempts
    pub fn attempts(attempts: u32) -> Self {
        Limit::Attempts(attempts)
    }

    /// Retry forever until the predicate returns true
    pub fn until<F>(predicate: F) -> Self
    where
        F: FnMut(u32, &Outcome<T, E>) -> bool + 'a,
    {
        Limit::Until(Box::new(predicate))
    }
}

impl<T, E> From<u32> for Limit<'_, T, E> {
    fn from(attempts: u32) -> Self {
        Limit::Attempts(attempts)
    }
}

impl<T, E> From<AttemptLimit> for Limit<'_, T, E> {
    fn from(limit: AttemptLimit) -> Self {
        Limit::Attempts(limit.get())
    }
}

/// Run a command until it succeeds or the limit is reached
///
/// A numeric limit sets the maximum number of attempts. `Limit::until`
/// retries without an attempt limit until the predicate returns true.
///
/// # Example
///
/// ```rust
/// use retrier_core::{retry, Limit};
///
/// let result = retry(Limit::attempts(3), |attempt: u32| {
///     if attempt < 3 {
///         Err(format!("attempt {} failed", attempt))
///     } else {
///         Ok(attempt)
///     }
/// });
///
/// assert_eq!(result.unwrap(), 3);
/// ```
pub fn retry<'a, C>(
    limit: impl Into<Limit<'a, C::Output, C::Error>>,
    command: C,
) -> Result<C::Output, RetryError<C::Error>>
where
    C: Operation,
    C::Error: Display,
{
    Retry::new(command).limit(limit).run()
}

/// Run a command like [`retry`], calling `hook` for every attempt that is not accepted
///
/// An error returned by the hook aborts the run immediately.
pub fn retry_with_hook<'a, C, H>(
    limit: impl Into<Limit<'a, C::Output, C::Error>>,
    command: C,
    hook: H,
) -> Result<C::Output, RetryError<C::Error>>
where
    C: Operation,
    C::Error: Display,
    H: FnMut(u32, &Outcome<C::Output, C::Error>) -> anyhow::Result<()> + 'a,
{
    Retry::new(command).limit(limit).on_error(hook).run()
}

/// A configurable retry loop around a single command
///
/// A `Retry` makes one attempt by default. The attempt counter is kept for
/// the lifetime of the value and is never reset, so calling [`Retry::run`]
/// again continues counting from the previous run.
///
/// # Example
///
/// ```rust
/// use retrier_core::Retry;
/// use std::time::Duration;
///
/// let mut retry = Retry::new(|attempt: u32| {
///     if attempt == 1 {
///         Err("warming up")
///     } else {
///         Ok("ready")
///     }
/// })
/// .twice()
/// .wait(Duration::from_millis(10));
///
/// assert_eq!(retry.run().unwrap(), "ready");
/// assert_eq!(retry.attempt(), 2);
/// ```
pub struct Retry<'a, C: Operation, O = NoOpObserver> {
    command: Command<C>,
    max_attempts: u32,
    attempt: u32,
    only_if: Option<Predicate<'a, C::Output, C::Error>>,
    until: Option<Predicate<'a, C::Output, C::Error>>,
    on_error: Option<ErrorHook<'a, C::Output, C::Error>>,
    wait: Option<Duration>,
    observer: O,
}

impl<'a, C: Operation> Retry<'a, C, NoOpObserver> {
    /// Create a retry for the given command with a single attempt
    pub fn new(command: C) -> Self {
        Self {
            command: Command::new(command),
            max_attempts: AttemptLimit::ONCE.get(),
            attempt: 0,
            only_if: None,
            until: None,
            on_error: None,
            wait: None,
            observer: NoOpObserver,
        }
    }
}

impl<'a, C: Operation, O> Retry<'a, C, O> {
    /// Set the maximum number of attempts (`0` for unlimited)
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Make a single attempt
    pub fn once(self) -> Self {
        self.attempts(AttemptLimit::ONCE.get())
    }

    /// Make up to two attempts
    pub fn twice(self) -> Self {
        self.attempts(AttemptLimit::TWICE.get())
    }

    /// Make up to three attempts
    pub fn thrice(self) -> Self {
        self.attempts(AttemptLimit::THRICE.get())
    }

    /// Remove the attempt limit
    pub fn forever(self) -> Self {
        self.attempts(AttemptLimit::FOREVER.get())
    }

    /// Apply a [`Limit`]
    pub fn limit(self, limit: impl Into<Limit<'a, C::Output, C::Error>>) -> Self {
        match limit.into() {
            Limit::Attempts(attempts) => self.attempts(attempts),
            Limit::Until(predicate) => {
                let mut retry = self.forever();
                retry.until = Some(predicate);
                retry
            }
        }
    }

    /// Decide whether an attempt should be retried
    ///
    /// The predicate receives the attempt number and its outcome. It replaces
    /// the default rule of retrying only failed attempts, so a successful
    /// value can be retried as well.
    pub fn only_if<F>(mut self, predicate: F) -> Self
    where
        F: FnMut(u32, &Outcome<C::Output, C::Error>) -> bool + 'a,
    {
        self.only_if = Some(Box::new(predicate));
        self
    }

    /// Stop retrying once the predicate returns true
    ///
    /// The predicate receives the attempt number and its outcome. If it stops
    /// the loop on a failed attempt, the run fails with
    /// [`RetryError::Exhausted`].
    pub fn until<F>(mut self, predicate: F) -> Self
    where
        F: FnMut(u32, &Outcome<C::Output, C::Error>) -> bool + 'a,
    {
        self.until = Some(Box::new(predicate));
        self
    }

    /// Run a hook for every attempt that is not accepted
    ///
    /// An error returned by the hook aborts the run with
    /// [`RetryError::Aborted`].
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u32, &Outcome<C::Output, C::Error>) -> anyhow::Result<()> + 'a,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Wait before each retry
    ///
    /// A zero duration disables waiting.
    pub fn wait(mut self, delay: Duration) -> Self {
        self.wait = (!delay.is_zero()).then_some(delay);
        self
    }

    /// Wait the given number of seconds before each retry
    pub fn wait_secs(self, seconds: u64) -> Self {
        self.wait(Duration::from_secs(seconds))
    }

    /// Apply the attempt limit and wait time of a policy
    pub fn with_policy(self, policy: &RetryPolicy) -> Self {
        let retry = self.attempts(policy.max_attempts.get());
        match policy.wait() {
            Some(delay) => retry.wait(delay),
            None => retry,
        }
    }

    /// Set the observer
    ///
    /// The observer receives callbacks during the run.
    pub fn with_observer<O2>(self, observer: O2) -> Retry<'a, C, O2> {
        Retry {
            command: self.command,
            max_attempts: self.max_attempts,
            attempt: self.attempt,
            only_if: self.only_if,
            until: self.until,
            on_error: self.on_error,
            wait: self.wait,
            observer,
        }
    }

    /// Get the number of attempts made so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Get the configured attempt limit (`0` for unlimited)
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the wait before each retry, if any
    pub fn wait_time(&self) -> Option<Duration> {
        self.wait
    }
}

impl<'a, C, O> Retry<'a, C, O>
where
    C: Operation,
    C::Error: Display,
    O: RetryObserver,
{
    /// Run the command until it is accepted or the policy is exhausted
    ///
    /// # Returns
    ///
    /// The accepted value, [`RetryError::Exhausted`] with the last failure if
    /// the policy stopped on a failed attempt, or [`RetryError::Aborted`] if
    /// the error hook failed.
    pub fn run(&mut self) -> Result<C::Output, RetryError<C::Error>> {
        let start = Instant::now();

        loop {
            self.attempt = self.attempt.saturating_add(1);
            let attempt = self.attempt;

            self.observer.on_attempt_start(attempt, self.max_attempts);

            let outcome = self.command.invoke(attempt);

            if self.should_retry(&outcome) {
                self.call_on_error(&outcome)?;

                let delay = self.wait.unwrap_or_default();
                self.observer.on_attempt_failed(
                    attempt,
                    outcome.failure().map(|err| err as &dyn Display),
                    delay,
                );

                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                continue;
            }

            if outcome.is_failure() {
                self.call_on_error(&outcome)?;
            }

            return match outcome {
                Outcome::Success(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    Ok(value)
                }
                Outcome::Failure(err) => {
                    self.observer.on_exhausted(attempt, self.max_attempts, &err);
                    Err(RetryError::exhausted(
                        attempt,
                        self.max_attempts,
                        err,
                        start.elapsed(),
                    ))
                }
            };
        }
    }

    /// Determine if the outcome should be retried
    fn should_retry(&mut self, outcome: &Outcome<C::Output, C::Error>) -> bool {
        self.retry_available() && self.passes_only_if(outcome) && !self.reached_until(outcome)
    }

    /// Determine if another attempt is allowed by the attempt limit
    fn retry_available(&self) -> bool {
        self.attempt < self.max_attempts || self.max_attempts == 0
    }

    /// Does the outcome pass the only-if predicate?
    fn passes_only_if(&mut self, outcome: &Outcome<C::Output, C::Error>) -> bool {
        match self.only_if.as_mut() {
            Some(only_if) => only_if(self.attempt, outcome),
            None => outcome.is_failure(),
        }
    }

    /// Has the until predicate been reached?
    fn reached_until(&mut self, outcome: &Outcome<C::Output, C::Error>) -> bool {
        match self.until.as_mut() {
            Some(until) => until(self.attempt, outcome),
            None => false,
        }
    }

    /// Call the error hook, turning its failure into an aborted run
    fn call_on_error(
        &mut self,
        outcome: &Outcome<C::Output, C::Error>,
    ) -> Result<(), RetryError<C::Error>> {
        let Some(on_error) = self.on_error.as_mut() else {
            return Ok(());
        };

        on_error(self.attempt, outcome).map_err(|err| {
            self.observer.on_aborted(self.attempt, &err);
            RetryError::aborted(self.attempt, err)
        })
    }
}
