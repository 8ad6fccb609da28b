//! Status page scraping.
//!
//! This module turns the controller's status page into an ordered Poll
//! Result through a chain of small, pure passes:
//! - Marker-line lookup and row splitting ([`RowExtractor`])
//! - Cell cleaning and field splitting ([`clean_row`], [`split_fields`])
//! - Duration parsing ([`parse_duration`])
//! - Reading derivation ([`ReadingBuilder`], [`SensorReading`])
//!
//! [`StatusPage`] wires them together.

mod duration;
mod error;
mod reading;
mod rows;

#[cfg(test)]
pub(crate) mod fixtures;

pub use duration::{NO_DATA, parse_duration};
pub use error::{DurationError, ScrapeError};
pub use reading::{
    ALARM_TOKEN, OK_THRESHOLD_SECONDS, ReadingBuilder, SensorReading, clean_row, collapse_icons,
    collapse_zone, field, split_fields, strip_tags, tidy_text,
};
pub use rows::{CELL_MARKER, MAX_SENSORS, RowExtractor, STATUS_MARKER, split_rows};

use std::collections::HashSet;

/// Parses a whole status page into sensor readings.
///
/// # Example
///
/// ```
/// use ohs_monitor::scrape::StatusPage;
///
/// let page = "<html>\n<body onload=go()><table>\
///     <tr><td>1.</td><td>Porch</td><td>PIR</td><td>On</td><td>Armed</td>\
///     <td>1 - a</td><td>0d, 0:1:00</td><td>-</td></tr></table>\n</html>";
///
/// let readings = StatusPage::default().parse(page).unwrap();
/// assert_eq!(readings.len(), 1);
/// assert_eq!(readings[0].name, "Porch");
/// assert!(!readings[0].alarming);
/// assert_eq!(readings[0].note, "For 60");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPage {
    extractor: RowExtractor,
    builder: ReadingBuilder,
}

impl StatusPage {
    /// Creates a parser from an extractor and a builder.
    #[must_use]
    pub const fn new(extractor: RowExtractor, builder: ReadingBuilder) -> Self {
        Self { extractor, builder }
    }

    /// Produces the Poll Result for one status page, in document order.
    ///
    /// Placeholder rows are skipped after the row cap has been applied. If
    /// a name appears twice only its first row is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the marker line is missing or any occupied
    /// row is malformed; a single bad row rejects the whole page.
    pub fn parse(&self, document: &str) -> Result<Vec<SensorReading>, ScrapeError> {
        let rows = self.extractor.extract(document)?;
        let mut names = HashSet::with_capacity(rows.len());
        let mut readings = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(reading) = self.builder.build(row)? else {
                continue;
            };

            if names.insert(reading.name.clone()) {
                readings.push(reading);
            } else {
                tracing::warn!("Ignoring duplicate row for sensor '{}'", reading.name);
            }
        }

        Ok(readings)
    }
}
