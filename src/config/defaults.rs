//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use crate::controller::RetryPolicy;
use crate::scrape::OK_THRESHOLD_SECONDS;

/// Default polling interval in seconds.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Default OK threshold in seconds.
pub const OK_THRESHOLD_SECS: u64 = OK_THRESHOLD_SECONDS;

/// Default number of retries after the first failed attempt.
pub const RETRY_MAX_RETRIES: u32 = RetryPolicy::DEFAULT_MAX_RETRIES;

/// Default backoff unit in milliseconds.
#[allow(clippy::cast_possible_truncation)] // 2000ms fits comfortably
pub const RETRY_BACKOFF_UNIT_MS: u64 = RetryPolicy::DEFAULT_BACKOFF_UNIT.as_millis() as u64;

/// Default password when none is configured.
pub const PASSWORD: &str = "";

/// Default config file name written by `init`.
pub const CONFIG_FILE: &str = "ohs-monitor.toml";

/// Default polling interval as Duration.
#[must_use]
pub const fn poll_interval() -> Duration {
    Duration::from_secs(POLL_INTERVAL_SECS)
}

/// Default backoff unit as Duration.
#[must_use]
pub const fn retry_backoff_unit() -> Duration {
    Duration::from_millis(RETRY_BACKOFF_UNIT_MS)
}
