use crate::error::{MetricsError, Result};
use crate::model::QuarterKey;
use chrono::{DateTime, Datelike, NaiveDate};

/// Calendar quarter of `date`: Jan-Mar is Q1, Oct-Dec is Q4, no fiscal offset.
pub fn quarter_key(date: &NaiveDate) -> QuarterKey {
    QuarterKey {
        year: date.year(),
        quarter: (date.month0() / 3 + 1) as u8,
    }
}

/// Parses an event date given as `YYYY-MM-DD` or as an RFC3339 timestamp.
/// Timestamps keep their UTC calendar date; the time of day is dropped.
pub fn parse_event_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc().date())
        .map_err(|_| MetricsError::InvalidDate(input.to_string()))
}
