//! Elapsed-time cell parsing.
//!
//! The controller renders elapsed times as `days:hours:minutes:seconds`
//! (after the row cleaner rewrites `Nd, ` prefixes) and uses `-` for
//! "no data".

use super::DurationError;

/// Cell value meaning "no data".
pub const NO_DATA: &str = "-";

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Parses a `days:hours:minutes:seconds` duration into total seconds.
///
/// Returns `Ok(None)` for the [`NO_DATA`] sentinel.
///
/// # Errors
///
/// Returns [`DurationError`] if the text does not have exactly four
/// components, a component is not a plain non-negative integer, or the
/// total overflows.
///
/// # Example
///
/// ```
/// use ohs_monitor::scrape::parse_duration;
///
/// assert_eq!(parse_duration("0:0:0:45"), Ok(Some(45)));
/// assert_eq!(parse_duration("1:2:3:4"), Ok(Some(93_784)));
/// assert_eq!(parse_duration("-"), Ok(None));
/// assert!(parse_duration("x:0:0:0").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<Option<u64>, DurationError> {
    if text == NO_DATA {
        return Ok(None);
    }

    let parts: Vec<&str> = text.split(':').collect();
    let [days, hours, minutes, seconds] = parts.as_slice() else {
        return Err(DurationError::ComponentCount {
            text: text.to_string(),
            found: parts.len(),
        });
    };

    let overflow = || DurationError::Overflow {
        text: text.to_string(),
    };

    [
        (days, SECONDS_PER_DAY),
        (hours, SECONDS_PER_HOUR),
        (minutes, SECONDS_PER_MINUTE),
        (seconds, 1),
    ]
    .into_iter()
    .try_fold(0u64, |total, (component, scale)| {
        let value = parse_component(text, component)?;
        value
            .checked_mul(scale)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(overflow)
    })
    .map(Some)
}

fn parse_component(text: &str, component: &str) -> Result<u64, DurationError> {
    let invalid = || DurationError::InvalidComponent {
        text: text.to_string(),
        component: component.to_string(),
    };

    // u64::from_str accepts a leading '+', the controller never emits one
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    component.parse::<u64>().map_err(|_| DurationError::Overflow {
        text: text.to_string(),
    })
}
