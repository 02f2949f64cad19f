//! ISO-8601 date parsing for front matter.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts tried after RFC 3339, most specific first
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a front matter date into UTC.
///
/// Accepted forms:
/// - RFC 3339: `2024-01-15T10:30:00Z`, `2024-01-15T10:30:00+02:00`
/// - offset with spaces: `2024-01-15 10:30:00 +0200`
/// - naive date-time: `2024-01-15T10:30:00`, `2024-01-15 10:30`
/// - date only: `2024-01-15` (midnight UTC)
///
/// Naive values are taken as UTC. Impossible calendar dates (Feb 30, month 13)
/// are rejected.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
