use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a due date as returned by either warehouse backend, dropping any
/// time of day.
///
/// Accepted shapes:
/// - `YYYY-MM-DD`
/// - date-time text (`YYYY-MM-DD HH:MM:SS[.fff]`, ISO `T` form, RFC 3339)
/// - compact `YYYYMMDD`
/// - days since the Unix epoch (Snowflake's JSON encoding of `DATE`)
/// - seconds since the Unix epoch with a fractional part (`TIMESTAMP_NTZ`)
///
/// Anything else yields `None`: an unparsable date is an empty cell, not an error.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    if s.len() == 8
        && s.bytes().all(|b| b.is_ascii_digit())
        && let Ok(d) = NaiveDate::parse_from_str(s, "%Y%m%d")
    {
        return Some(d);
    }

    if let Ok(days) = s.parse::<i64>() {
        return epoch().checked_add_signed(chrono::Duration::try_days(days)?);
    }

    if let Some((secs, _frac)) = s.split_once('.')
        && let Ok(secs) = secs.parse::<i64>()
    {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive());
    }

    None
}

pub fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}
