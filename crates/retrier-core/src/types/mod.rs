//! Type definitions for retry policy configuration

mod retry_policy;

pub use retry_policy::*;
