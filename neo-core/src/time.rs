//! Conversions between the dataset's textual timestamps and `chrono` values.
//!
//! Close approach times in `cad.json` use the calendar-date format
//! `YYYY-Mon-DD hh:mm` (for example `2020-Jan-01 00:00`). Times carry no
//! seconds and are interpreted as UTC. Output uses the ISO-like
//! `YYYY-MM-DD hh:mm` form so that results stay sortable as text.

use chrono::{NaiveDate, NaiveDateTime};

/// Format of calendar dates in the close approach dataset.
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Format used when rendering approach times.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format accepted for date filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `cad.json` calendar date such as `2020-Jan-01 00:00`.
///
/// # Errors
///
/// Returns the `chrono` parse error when `text` does not match
/// [`CALENDAR_DATE_FORMAT`].
///
/// # Examples
/// ```
/// use neo_core::time::{format_datetime, parse_calendar_date};
///
/// let time = parse_calendar_date("1900-Dec-27 01:30").expect("valid date");
/// assert_eq!(format_datetime(&time), "1900-12-27 01:30");
/// ```
pub fn parse_calendar_date(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text.trim(), CALENDAR_DATE_FORMAT)
}

/// Render a timestamp without a seconds component.
#[must_use]
pub fn format_datetime(time: &NaiveDateTime) -> String {
    time.format(DATETIME_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date used by the date filters.
///
/// # Errors
///
/// Returns the `chrono` parse error when `text` does not match
/// [`DATE_FORMAT`].
pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
}
