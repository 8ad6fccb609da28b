//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use ohs_monitor::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Exit code 0: `init` wrote the template, `once` printed the readings,
    /// or the poller shut down on Ctrl+C / SIGTERM.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Exit code 1: no endpoint or user name, a non-http(s) endpoint, a zero
    /// poll interval or backoff unit, an unreadable config file, or `init`
    /// failing to write the template.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Exit code 2: `once` could not fetch, parse or render the status page,
    /// or the tokio runtime failed to start.
    ///
    /// A function because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::MissingRequired { field: f, .. } => {
            if *f == field::ENDPOINT || *f == field::USERNAME {
                eprintln!("\nRun 'ohs-monitor init' to generate a configuration template.");
            }
        }
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'ohs-monitor init' to generate a configuration template.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so `once` output on stdout stays valid JSON.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
