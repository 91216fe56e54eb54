//! Parsing of caller-supplied instants and dates.

use chrono::{DateTime, NaiveDate, Utc};

use crate::core::error::{EngineError, EngineResult};

/// Parse an RFC 3339 instant (any offset) into UTC.
///
/// # Example
/// ```
/// use merchant_tz::time::parse_utc_instant;
/// let instant = parse_utc_instant("2024-08-19T23:30:00Z").unwrap();
/// assert_eq!(instant.to_rfc3339(), "2024-08-19T23:30:00+00:00");
/// ```
pub fn parse_utc_instant(input: &str) -> EngineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| EngineError::invalid_instant(input, e))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_local_date(input: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::invalid_date(input, e))
}
