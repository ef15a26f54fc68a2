//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;
use retrier_core::AttemptLimit;

/// Retrier - run a command again until it succeeds
#[derive(Parser, Debug)]
#[command(name = "retrier")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to a retry policy file (YAML)
    #[arg(short, long, env = "RETRIER_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Maximum number of attempts: a number, once, twice, thrice or forever
    #[arg(short, long)]
    pub attempts: Option<AttemptLimit>,

    /// Seconds to wait before each retry
    #[arg(short, long, value_name = "SECS")]
    pub wait: Option<u64>,

    /// Stop retrying once the program exits with this code
    #[arg(long, value_name = "CODE")]
    pub stop_on_exit: Option<i32>,

    /// Program to run, followed by its arguments
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "retrier",
            "-vv",
            "--attempts",
            "thrice",
            "--wait",
            "2",
            "--stop-on-exit",
            "4",
            "--",
            "curl",
            "-fsS",
            "https://example.com",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.attempts, Some(AttemptLimit::THRICE));
        assert_eq!(cli.wait, Some(2));
        assert_eq!(cli.stop_on_exit, Some(4));
        assert_eq!(cli.command, vec!["curl", "-fsS", "https://example.com"]);
    }

    #[test]
    fn test_parse_forever() {
        let cli = Cli::try_parse_from(["retrier", "-a", "forever", "make", "test"]).unwrap();
        assert_eq!(cli.attempts, Some(AttemptLimit::FOREVER));
        assert_eq!(cli.command, vec!["make", "test"]);
    }

    #[test]
    fn test_rejects_non_numeric_attempts() {
        let result = Cli::try_parse_from(["retrier", "--attempts", "nan", "true"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_command() {
        let result = Cli::try_parse_from(["retrier", "--attempts", "3"]);
        assert!(result.is_err());
    }
}
