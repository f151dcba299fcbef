//! Date, timestamp and duration formatting.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;

/// Text returned by [`duration`] when either end cannot be interpreted.
pub const DURATION_UNAVAILABLE: &str = "N/D";

/// Display pattern for [`format_datetime`].
const DATETIME_DISPLAY: &str = "%d/%m/%Y %H:%M";

/// Naive ISO-8601 layouts accepted besides RFC 3339.
const ISO_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const SECS_PER_DAY: i64 = 86_400;

/// A loosely typed point in time as it arrives from storage or a form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateInput<'a> {
    /// ISO-8601 text.
    Text(&'a str),
    /// Unix timestamp in (possibly fractional) seconds, interpreted as UTC.
    Unix(f64),
    /// An already parsed wall-clock time.
    DateTime(NaiveDateTime),
}

impl DateInput<'_> {
    /// Interprets the input as a wall-clock time.
    #[must_use]
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        match *self {
            Self::Text(text) => parse_iso(text),
            Self::Unix(secs) => unix_to_naive(secs),
            Self::DateTime(dt) => Some(dt),
        }
    }
}

impl fmt::Display for DateInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Unix(secs) if secs.is_nan() => f.write_str("nan"),
            Self::Unix(secs) => write!(f, "{secs}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}

impl From<i64> for DateInput<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn from(secs: i64) -> Self {
        Self::Unix(secs as f64)
    }
}

impl From<f64> for DateInput<'_> {
    fn from(secs: f64) -> Self {
        Self::Unix(secs)
    }
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        Self::DateTime(date.and_time(NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt.naive_utc())
    }
}

impl From<DateTime<FixedOffset>> for DateInput<'_> {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self::DateTime(dt.naive_local())
    }
}

/// Parses ISO-8601 text into a wall-clock time.
///
/// Accepts RFC 3339 (offset kept as local wall clock), `T`- or
/// space-separated naive timestamps with optional seconds and fraction, and
/// bare dates (midnight).
#[must_use]
pub fn parse_iso(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    ISO_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unix_to_naive(secs: f64) -> Option<NaiveDateTime> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

/// Returns the date part of an ISO timestamp: everything before the first `T`.
///
/// ```rust
/// use gonetwork::format::format_date;
///
/// assert_eq!(format_date("2025-03-14T09:30:00"), "2025-03-14");
/// assert_eq!(format_date("2025-03-14"), "2025-03-14");
/// ```
#[must_use]
pub fn format_date(iso: &str) -> String {
    iso.split('T').next().unwrap_or(iso).to_string()
}

/// Formats a point in time as `DD/MM/YYYY HH:MM`.
///
/// Unparseable input is returned in its textual form.
///
/// ```rust
/// use gonetwork::format::format_datetime;
///
/// assert_eq!(format_datetime("2025-03-14T09:30:00"), "14/03/2025 09:30");
/// assert_eq!(format_datetime(0_i64), "01/01/1970 00:00");
/// assert_eq!(format_datetime("amanhã"), "amanhã");
/// ```
#[must_use]
pub fn format_datetime<'a>(value: impl Into<DateInput<'a>>) -> String {
    let value = value.into();
    value.to_naive().map_or_else(
        || value.to_string(),
        |dt| dt.format(DATETIME_DISPLAY).to_string(),
    )
}

/// Formats the wall-clock span between two points in time.
///
/// Spans of a day or more render as `Nd HH:MM`, shorter ones as `HH:MM`.
/// Returns [`DURATION_UNAVAILABLE`] when either end cannot be parsed or the
/// end precedes the start.
///
/// ```rust
/// use gonetwork::format::duration;
///
/// assert_eq!(duration("2025-01-01T00:00:00", "2025-01-01T02:30:00"), "02:30");
/// assert_eq!(duration("2025-01-01T00:00:00", "2025-01-02T02:00:00"), "1d 02:00");
/// ```
#[must_use]
pub fn duration<'a, 'b>(start: impl Into<DateInput<'a>>, end: impl Into<DateInput<'b>>) -> String {
    let (Some(start), Some(end)) = (start.into().to_naive(), end.into().to_naive()) else {
        return DURATION_UNAVAILABLE.to_string();
    };
    let secs = (end - start).num_seconds();
    if secs < 0 {
        return DURATION_UNAVAILABLE.to_string();
    }
    let days = secs / SECS_PER_DAY;
    let hours = (secs % SECS_PER_DAY) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}")
    } else {
        format!("{hours:02}:{minutes:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_format_date_without_time() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_parse_iso_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(10, 15, 0))
            .unwrap();
        assert_eq!(parse_iso("2025-01-01T10:15:00"), Some(expected));
        assert_eq!(parse_iso("2025-01-01 10:15:00"), Some(expected));
        assert_eq!(parse_iso("2025-01-01T10:15"), Some(expected));
        assert_eq!(parse_iso("2025-01-01T10:15:00.250"), expected.with_nanosecond(250_000_000));
        assert_eq!(parse_iso("2025-01-01T10:15:00-03:00"), Some(expected));
        assert_eq!(
            parse_iso("2025-01-01"),
            NaiveDate::from_ymd_opt(2025, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
        );
        assert_eq!(parse_iso("   "), None);
        assert_eq!(parse_iso("01/01/2025"), None);
    }

    #[test]
    fn test_format_datetime_sources() {
        let native = NaiveDate::from_ymd_opt(2024, 12, 31)
            .and_then(|d| d.and_hms_opt(23, 59, 0))
            .unwrap();
        assert_eq!(format_datetime(native), "31/12/2024 23:59");
        assert_eq!(format_datetime(1_700_000_000_i64), "14/11/2023 22:13");
        assert_eq!(format_datetime(1_700_000_000.75_f64), "14/11/2023 22:13");
    }

    #[test]
    fn test_non_finite_timestamps_render_as_text() {
        assert_eq!(format_datetime(f64::NAN), "nan");
        assert_eq!(format_datetime(f64::INFINITY), "inf");
        assert_eq!(format_datetime(f64::NEG_INFINITY), "-inf");
        assert_eq!(duration(f64::NAN, 0_i64), DURATION_UNAVAILABLE);
    }

    #[test]
    fn test_duration_unavailable() {
        assert_eq!(duration("garbage", "2025-01-01T00:00:00"), DURATION_UNAVAILABLE);
        assert_eq!(
            duration("2025-01-02T00:00:00", "2025-01-01T00:00:00"),
            DURATION_UNAVAILABLE
        );
    }

    #[test]
    fn test_duration_mixed_inputs() {
        let start = parse_iso("2025-01-01T00:00:00").unwrap();
        assert_eq!(duration(start, "2025-01-01T00:45:00"), "00:45");
        assert_eq!(duration(0_i64, 3 * 86_400_i64 + 3600), "3d 01:00");
    }
}
