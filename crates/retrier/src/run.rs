//! Run a program under a retry policy

use std::io;
use std::process::Command;

use anyhow::{Context, Result};
use retrier_core::retry::TracingObserver;
use retrier_core::{PolicyLoader, Retry, RetryPolicy};

use crate::cli::Cli;

/// Environment variable exposing the attempt number to the program
pub const ATTEMPT_ENV: &str = "RETRIER_ATTEMPT";

/// Failure of a single attempt of the program
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The program could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program exited with a non-zero code
    #[error("{program} exited with code {code}")]
    Exit { program: String, code: i32 },

    /// The program was terminated by a signal
    #[error("{program} was terminated by a signal")]
    Signal { program: String },
}

impl AttemptError {
    /// Exit code of the program, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AttemptError::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let policy = resolve_policy(&cli)?;

    let (program, args) = cli
        .command
        .split_first()
        .context("no program given to run")?;

    tracing::debug!(
        program = %program,
        max_attempts = %policy.max_attempts,
        wait_secs = policy.wait_secs,
        "running with retry policy"
    );

    let retry =
        Retry::new(|attempt: u32| run_attempt(program, args, attempt)).with_policy(&policy);
    let retry = match cli.stop_on_exit {
        Some(code) => retry.until(move |_attempt, outcome| {
            outcome.failure().and_then(AttemptError::exit_code) == Some(code)
        }),
        None => retry,
    };

    retry
        .with_observer(TracingObserver::new(program.as_str()))
        .run()?;

    Ok(())
}

/// Resolve the retry policy: policy file and environment, then CLI flags
fn resolve_policy(cli: &Cli) -> Result<RetryPolicy> {
    let loader = match &cli.config {
        Some(path) => PolicyLoader::with_file(path.clone()),
        None => PolicyLoader::new(),
    };

    let mut policy = loader.load().context("Failed to load retry policy")?;

    if let Some(attempts) = cli.attempts {
        policy.max_attempts = attempts;
    }
    if let Some(wait) = cli.wait {
        policy.wait_secs = wait;
    }

    Ok(policy)
}

/// Run the program once, inheriting stdio
fn run_attempt(program: &str, args: &[String], attempt: u32) -> Result<(), AttemptError> {
    let status = Command::new(program)
        .args(args)
        .env(ATTEMPT_ENV, attempt.to_string())
        .status()
        .map_err(|source| AttemptError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        return Ok(());
    }

    match status.code() {
        Some(code) => Err(AttemptError::Exit {
            program: program.to_string(),
            code,
        }),
        None => Err(AttemptError::Signal {
            program: program.to_string(),
        }),
    }
}
