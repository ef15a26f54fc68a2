//! Retry policy loading

mod loader;

pub use loader::{PolicyLoader, ATTEMPTS_ENV, WAIT_SECS_ENV};
