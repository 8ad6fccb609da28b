//! Locating and splitting the sensor table.

use std::sync::LazyLock;

use regex::Regex;

use super::ScrapeError;

/// Substring identifying the line that carries the rendered status block.
pub const STATUS_MARKER: &str = "body onload=";

/// Substring a fragment must contain to count as a table row.
pub const CELL_MARKER: &str = "<td>";

/// Maximum number of rows the controller renders in its sensor table.
pub const MAX_SENSORS: usize = 8;

static ROW_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?tr>").expect("row boundary pattern is valid"));

/// Finds the sensor table in a status page and splits it into row fragments.
///
/// The controller renders the whole dynamic block on a single line, so the
/// extractor works line-wise rather than building a DOM.
///
/// # Example
///
/// ```
/// use ohs_monitor::scrape::RowExtractor;
///
/// let page = "<html>\n<body onload=init()><table><tr><th>Name</th></tr>\
///             <tr><td>1.</td><td>Door</td></tr></table>\n</html>";
/// let rows = RowExtractor::default().extract(page).unwrap();
/// assert_eq!(rows, vec!["<td>1.</td><td>Door</td>"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowExtractor {
    marker: String,
    max_rows: usize,
}

impl RowExtractor {
    /// Creates an extractor with a custom marker and row cap.
    #[must_use]
    pub fn new(marker: impl Into<String>, max_rows: usize) -> Self {
        Self {
            marker: marker.into(),
            max_rows,
        }
    }

    /// Returns the first line of `document` containing the marker.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MarkerNotFound`] if no line carries it.
    pub fn marker_line<'a>(&self, document: &'a str) -> Result<&'a str, ScrapeError> {
        document
            .lines()
            .find(|line| line.contains(self.marker.as_str()))
            .ok_or_else(|| ScrapeError::MarkerNotFound {
                marker: self.marker.clone(),
            })
    }

    /// Extracts up to `max_rows` table rows from `document`, in document order.
    ///
    /// Fragments without a [`CELL_MARKER`] (header rows, markup between rows)
    /// are dropped before the cap is applied. Placeholder rows for unoccupied
    /// slots are *not* filtered here; they count towards the cap.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::MarkerNotFound`] if the marker line is absent.
    pub fn extract<'a>(&self, document: &'a str) -> Result<Vec<&'a str>, ScrapeError> {
        let line = self.marker_line(document)?;

        Ok(split_rows(line)
            .filter(|fragment| fragment.contains(CELL_MARKER))
            .take(self.max_rows)
            .collect())
    }
}

impl Default for RowExtractor {
    fn default() -> Self {
        Self::new(STATUS_MARKER, MAX_SENSORS)
    }
}

/// Splits a line on `<tr>` / `</tr>` boundaries (case-insensitive).
pub fn split_rows(line: &str) -> impl Iterator<Item = &str> {
    ROW_BOUNDARY.split(line)
}
