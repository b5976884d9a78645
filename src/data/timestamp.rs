//! Timestamp parsing and display formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Accepted layouts for timestamps without an offset (read as UTC).
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp like "2025-03-01T12:00:00.000Z".
///
/// RFC 3339 with any offset is accepted, as are offset-less date-times and
/// bare dates, which are taken to be UTC. Returns `None` for anything else.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp the way readings carry it: UTC with milliseconds.
pub fn to_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time as a reading timestamp.
pub fn now_timestamp() -> String {
    to_timestamp(Utc::now())
}

/// Format a timestamp as a calendar date ("Jan 5, 2025").
///
/// Unparsable input is returned unchanged.
pub fn format_date(s: &str) -> String {
    format_with(s, "%b %-d, %Y")
}

/// Format a timestamp as a wall-clock time ("14:03:09").
///
/// Unparsable input is returned unchanged.
pub fn format_time(s: &str) -> String {
    format_with(s, "%H:%M:%S")
}

/// Format a timestamp with both date and time ("Jan 5, 2025 14:03:09").
pub fn format_date_time(s: &str) -> String {
    format_with(s, "%b %-d, %Y %H:%M:%S")
}

fn format_with(s: &str, format: &str) -> String {
    match parse_timestamp(s) {
        Some(dt) => dt.format(format).to_string(),
        None => s.to_string(),
    }
}
