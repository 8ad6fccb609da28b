//! Error types for status page scraping.

use thiserror::Error;

/// Error raised when a duration cell cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The text did not have exactly four colon-separated components.
    #[error("Expected days:hours:minutes:seconds in '{text}', found {found} component(s)")]
    ComponentCount {
        /// The offending text
        text: String,
        /// Number of components found
        found: usize,
    },

    /// A component was empty or not a non-negative integer.
    #[error("Invalid component '{component}' in duration '{text}'")]
    InvalidComponent {
        /// The offending text
        text: String,
        /// The component that failed to parse
        component: String,
    },

    /// The total number of seconds does not fit in 64 bits.
    #[error("Duration '{text}' is out of range")]
    Overflow {
        /// The offending text
        text: String,
    },
}

/// Error type for turning a status page into sensor readings.
///
/// None of these are transient: they indicate that the controller served
/// something other than the expected status table (a login page, a
/// firmware with a different layout, a truncated response).
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No line of the document carries the status block marker.
    #[error("Status block marker '{marker}' not found; page format changed or unexpected response")]
    MarkerNotFound {
        /// The marker that was searched for
        marker: String,
    },

    /// A sensor row has fewer fields than the table layout requires.
    #[error("Sensor row has {found} field(s), expected at least {expected}: '{row}'")]
    MalformedRow {
        /// The cleaned row text
        row: String,
        /// Number of fields found
        found: usize,
        /// Minimum number of fields required
        expected: usize,
    },

    /// A duration cell of an occupied row is malformed.
    #[error("Bad duration for sensor '{sensor}': {source}")]
    Duration {
        /// Name of the sensor whose row failed
        sensor: String,
        /// Underlying parse failure
        #[source]
        source: DurationError,
    },
}
