//! Turning table rows into typed sensor readings.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::duration::{NO_DATA, parse_duration};
use super::ScrapeError;

/// Default number of seconds a sensor must have reported OK to be trusted.
pub const OK_THRESHOLD_SECONDS: u64 = 20;

/// Token the row cleaner substitutes for the alarm bell icon.
pub const ALARM_TOKEN: &str = "ALARM";

/// Positional field indices in a cleaned sensor row.
pub mod field {
    /// Row ordinal.
    pub const ORDINAL: usize = 0;
    /// Sensor name (`-` for an unoccupied slot).
    pub const NAME: usize = 1;
    /// Zone digit.
    pub const ZONE: usize = 5;
    /// Time since the last OK heartbeat.
    pub const LAST_OK: usize = 6;
    /// Time since the last alarm.
    pub const LAST_ALARM: usize = 7;
    /// Optional [`super::ALARM_TOKEN`] when actively alarming.
    pub const ACTIVE_ALARM: usize = 8;

    /// Minimum number of fields in an occupied row.
    pub const REQUIRED: usize = LAST_ALARM + 1;
}

/// One sensor's derived state for a single poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    /// Unique sensor name.
    pub name: String,
    /// Whether the sensor should be treated as triggered.
    pub alarming: bool,
    /// Human-readable reason for `alarming`.
    pub note: String,
}

impl SensorReading {
    /// Creates a new reading.
    #[must_use]
    pub fn new(name: impl Into<String>, alarming: bool, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alarming,
            note: note.into(),
        }
    }
}

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("valid pattern: ", $re)));
    };
}

pattern!(ICON, r"<i class=fa (fa-[a-z]+?).>");
pattern!(BELL, r"\bfa-bell\b");
pattern!(OTHER_ICON, r"\bfa-[a-z]+");
pattern!(ZONE_CELL, r"(?i)<td>(\d) - [a-z\d]+</td>");
pattern!(TAG, r"<[^>]+>");
pattern!(DAY_PREFIX, r"(\d+)d, ");
pattern!(WHITESPACE, r"\s+");
pattern!(ORDINAL, r"^(\d+)\.");
pattern!(SECONDS_UNIT, r"(?i) second\(s\)");

/// Replaces icon markup: the bell becomes [`ALARM_TOKEN`], others vanish.
#[must_use]
pub fn collapse_icons(row: &str) -> String {
    let named = ICON.replace_all(row, "$1");
    let bell = BELL.replace_all(&named, ALARM_TOKEN);
    OTHER_ICON.replace_all(&bell, "").into_owned()
}

/// Collapses a `<td>D - code</td>` zone cell to its digit.
#[must_use]
pub fn collapse_zone(row: &str) -> String {
    ZONE_CELL.replace_all(row, "$1").into_owned()
}

/// Replaces every remaining tag with a single space.
#[must_use]
pub fn strip_tags(row: &str) -> String {
    TAG.replace_all(row, " ").into_owned()
}

/// Collapses whitespace, trims, and normalises day prefixes, the row
/// ordinal and the `second(s)` unit.
#[must_use]
pub fn tidy_text(row: &str) -> String {
    let days = DAY_PREFIX.replace_all(row, "$1:");
    let spaced = WHITESPACE.replace_all(&days, " ");
    let ordinal = ORDINAL.replace(spaced.trim(), "$1");
    SECONDS_UNIT.replace_all(&ordinal, "s").into_owned()
}

/// Runs every cleaning pass over a raw row fragment.
///
/// ```
/// use ohs_monitor::scrape::clean_row;
///
/// let row = "<td>2.</td><td>Hall</td><td>1 - z1</td><td><i class=fa fa-bell'></i></td>";
/// assert_eq!(clean_row(row), "2 Hall 1 ALARM");
/// ```
#[must_use]
pub fn clean_row(row: &str) -> String {
    let icons = collapse_icons(row);
    let zone = collapse_zone(&icons);
    let text = strip_tags(&zone);
    tidy_text(&text)
}

/// Splits a cleaned row into positional fields.
#[must_use]
pub fn split_fields(cleaned: &str) -> Vec<&str> {
    cleaned.split_whitespace().collect()
}

/// Derives [`SensorReading`]s from table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingBuilder {
    ok_threshold_secs: u64,
}

impl ReadingBuilder {
    /// Creates a builder with a custom OK threshold.
    ///
    /// A sensor whose last OK heartbeat is younger than the threshold (or
    /// unknown) is reported as alarming.
    #[must_use]
    pub const fn new(ok_threshold_secs: u64) -> Self {
        Self { ok_threshold_secs }
    }

    /// Returns the OK threshold in seconds.
    #[must_use]
    pub const fn ok_threshold_secs(&self) -> u64 {
        self.ok_threshold_secs
    }

    /// Builds a reading from a raw row fragment.
    ///
    /// Returns `Ok(None)` for placeholder rows of unoccupied slots.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MalformedRow`] if an occupied row is too short,
    /// or [`ScrapeError::Duration`] if its last-OK or last-alarm cell is malformed.
    pub fn build(&self, row: &str) -> Result<Option<SensorReading>, ScrapeError> {
        let cleaned = clean_row(row);
        self.build_from_fields(&split_fields(&cleaned))
    }

    /// Builds a reading from already split fields.
    ///
    /// # Errors
    ///
    /// See [`ReadingBuilder::build`].
    pub fn build_from_fields(
        &self,
        fields: &[&str],
    ) -> Result<Option<SensorReading>, ScrapeError> {
        let malformed = || ScrapeError::MalformedRow {
            row: fields.join(" "),
            found: fields.len(),
            expected: field::REQUIRED,
        };

        let name = *fields.get(field::NAME).ok_or_else(malformed)?;
        if name == NO_DATA {
            return Ok(None);
        }
        if fields.len() < field::REQUIRED {
            return Err(malformed());
        }

        let duration = |index: usize| {
            parse_duration(fields[index]).map_err(|source| ScrapeError::Duration {
                sensor: name.to_string(),
                source,
            })
        };
        let last_ok = duration(field::LAST_OK)?;
        // Only validated; the value plays no part in the derived state
        duration(field::LAST_ALARM)?;

        let actively_alarming = fields.get(field::ACTIVE_ALARM) == Some(&ALARM_TOKEN);

        Ok(Some(self.derive(name, actively_alarming, last_ok)))
    }

    fn derive(&self, name: &str, actively_alarming: bool, last_ok: Option<u64>) -> SensorReading {
        if actively_alarming {
            return SensorReading::new(name, true, "Actively alarming");
        }

        match last_ok {
            Some(secs) if secs >= self.ok_threshold_secs => {
                SensorReading::new(name, false, format!("For {secs}"))
            }
            Some(secs) => SensorReading::new(name, true, format!("OK for: {secs}")),
            None => SensorReading::new(name, true, format!("OK for: {NO_DATA}")),
        }
    }
}

impl Default for ReadingBuilder {
    fn default() -> Self {
        Self::new(OK_THRESHOLD_SECONDS)
    }
}
