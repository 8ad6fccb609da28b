//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OHS Monitor: `OpenHomeSecurity` controller status poller
///
/// Polls the controller's status page and reports sensors as they
/// appear, disappear, and change between clear and alarming.
#[derive(Debug, Parser)]
#[command(name = "ohs-monitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Controller base URL, e.g. `http://192.168.1.50` (required unless set in config)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// User name for HTTP Basic authentication (required unless set in config)
    #[arg(long, short, global = true)]
    pub username: Option<String>,

    /// Password for HTTP Basic authentication
    #[arg(long, short, global = true)]
    pub password: Option<String>,

    /// Polling interval in seconds
    #[arg(long = "poll-interval", global = true)]
    pub poll_interval: Option<u64>,

    /// Number of retries after a failed request
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Backoff unit in milliseconds; the n-th retry waits n times this
    #[arg(long = "retry-delay", value_name = "MS", global = true)]
    pub retry_delay: Option<u64>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ohs-monitor
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Run a single poll cycle and print the sensor readings as JSON
    Once,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// Returns true if this is the once command.
    #[must_use]
    pub const fn is_once(&self) -> bool {
        matches!(self.command, Some(Command::Once))
    }
}
