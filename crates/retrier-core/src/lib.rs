//! # retrier-core
//!
//! Core library for retrier providing:
//! - The `Retry` state machine that drives a fallible command per policy
//! - `Command`/`Operation` abstractions and the `Outcome` of an attempt
//! - Retry observers for tracing and statistics
//! - Retry policy configuration (YAML file and environment overrides)

pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use config::PolicyLoader;
pub use error::{Error, Result};
pub use retry::{retry, retry_with_hook, Command, Limit, Operation, Outcome, Retry, RetryError};
pub use types::{AttemptLimit, RetryPolicy};
