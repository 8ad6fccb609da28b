//! Error types for the monitor layer.

use crate::controller::FetchError;
use crate::scrape::ScrapeError;
use thiserror::Error;

/// Error type for a single poll cycle.
///
/// Either variant aborts the cycle before any event is published; the
/// scheduler logs it and tries again on the next tick.
#[derive(Debug, Error)]
pub enum PollError {
    /// The status page could not be retrieved.
    #[error("Failed to fetch status page: {0}")]
    Fetch(#[from] FetchError),

    /// The status page could not be interpreted.
    #[error("Failed to parse status page: {0}")]
    Scrape(#[from] ScrapeError),
}

impl PollError {
    /// Short label for log lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Scrape(_) => "parse",
        }
    }
}
