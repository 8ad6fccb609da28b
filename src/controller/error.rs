//! Error types for controller requests.

use thiserror::Error;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// These errors are typically retryable at the caller's discretion.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// resets while reading the body, and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error from a single fetch attempt.
///
/// Every variant is considered transient by [`super::HttpStatusFetcher`]
/// except [`HttpError::InvalidUrl`].
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The transport failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The controller answered with a non-2xx status.
    #[error("Controller returned HTTP {status}")]
    Status {
        /// Status code returned by the controller
        status: http::StatusCode,
    },
}

/// Error type for fetching the controller status page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt failed and the retry budget is spent.
    #[error("Ran out of retries querying {endpoint} after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        /// The URL that was queried
        endpoint: url::Url,
        /// Total attempts made (initial attempt plus retries)
        attempts: u32,
        /// The failure of the final attempt
        #[source]
        last_error: AttemptError,
    },

    /// A failure that retrying cannot fix (e.g. an unusable URL).
    #[error("Request to {endpoint} failed permanently: {source}")]
    Permanent {
        /// The URL that was queried
        endpoint: url::Url,
        /// The underlying failure
        #[source]
        source: AttemptError,
    },
}

impl FetchError {
    /// Returns the number of attempts made before giving up.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } => *attempts,
            Self::Permanent { .. } => 1,
        }
    }
}
