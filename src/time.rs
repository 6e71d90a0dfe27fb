//! Text encodings for dates and instants as stored in SQLite.
//!
//! Instants are fixed-width with millisecond precision, so both formats sort
//! lexically in chronological order. The guarded `deadline > ?now`
//! comparisons depend on this.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::ChoreError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ChoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ChoreError::validation(format!("Invalid timestamp '{s}' (expected RFC 3339)")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ChoreError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| ChoreError::validation(format!("Invalid date '{s}' (expected YYYY-MM-DD)")))
}
