//! Timestamp and date formats shared by the store and its callers.
//!
//! Measurement timestamps are stored as text in SQLite's `CURRENT_TIMESTAMP`
//! layout, so lexical comparison in SQL matches chronological order.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// `YYYY-MM-DD HH:MM:SS`, the layout of `CURRENT_TIMESTAMP`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `YYYY-MM-DD`, the layout of experiment dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a caller-supplied timestamp.
///
/// `field` names the input in the validation message (e.g. "startTime").
pub fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|e| {
        Error::validation(format!(
            "invalid format of {field} '{value}' (expected YYYY-MM-DD HH:MM:SS): {e}"
        ))
    })
}

/// Render a timestamp in the stored layout.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Render a calendar date in the stored layout.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
