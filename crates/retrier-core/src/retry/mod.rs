//! Command retry engine
//!
//! This module provides a synchronous retry loop around a single fallible
//! command.
//!
//! # Features
//!
//! - Attempt limits, including unlimited attempts
//! - `only_if` predicate to retry on unacceptable successful values
//! - `until` predicate to stop retrying early
//! - `on_error` hook that can abort the run
//! - Fixed wait between retries
//! - Observable attempts via the `RetryObserver` trait
//!
//! # Example
//!
//! ```rust
//! use retrier_core::retry::{Retry, RetryError};
//!
//! fn example() -> Result<&'static str, RetryError<String>> {
//!     Retry::new(|attempt: u32| {
//!         if attempt < 2 {
//!             Err(format!("attempt {} failed", attempt))
//!         } else {
//!             Ok("hello")
//!         }
//!     })
//!     .thrice()
//!     .on_error(|attempt, _outcome| {
//!         eprintln!("attempt {} failed", attempt);
//!         Ok(())
//!     })
//!     .run()
//! }
//!
//! assert_eq!(example().unwrap(), "hello");
//! ```

mod command;
mod error;
mod executor;
mod observer;
mod outcome;

pub use command::{Command, Operation};
pub use error::RetryError;
pub use executor::{retry, retry_with_hook, ErrorHook, Limit, Predicate, Retry};
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use outcome::Outcome;
