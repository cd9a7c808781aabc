//! Time utilities: parsing HH:MM and RFC 3339 timestamps.

use chrono::{DateTime, Local, NaiveTime, SecondsFormat, Utc};

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2025-03-01T09:30:00.000Z`.
pub fn iso_now() -> String {
    iso(Utc::now())
}

pub fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a stored RFC 3339 timestamp in local time; unparsable input is
/// returned unchanged.
pub fn local_display(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%F %T").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
