//! Property-based and table-driven tests for the display formatters.
//!
//! - `format_date` keeps everything before the first `T`
//! - `truncate` never grows short text and caps long text
//! - `format_status` is idempotent and passes unknown values through
//! - `duration` never panics and rejects negative spans

#![allow(clippy::expect_used, clippy::unwrap_used)]

use gonetwork::format::{
    DURATION_UNAVAILABLE, ELLIPSIS, duration, format_currency, format_date, format_datetime,
    format_status, truncate,
};
use proptest::prelude::*;
use test_case::test_case;

fn iso_datetime() -> impl Strategy<Value = String> {
    (1970i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| format!("{y:04}-{mo:02}-{d:02}T{h:02}:{mi:02}:{s:02}"),
    )
}

proptest! {
    /// Property: the date part is the prefix before `T`.
    #[test]
    fn prop_format_date_is_prefix(iso in iso_datetime()) {
        let date = format_date(&iso);
        prop_assert_eq!(date.len(), 10);
        prop_assert_eq!(Some(date.as_str()), iso.split('T').next());
    }

    /// Property: short text comes back untouched.
    #[test]
    fn prop_truncate_keeps_short_text(text in "\\PC{0,50}") {
        prop_assert_eq!(truncate(&text, 50), text);
    }

    /// Property: long text is cut to 50 chars plus the ellipsis.
    #[test]
    fn prop_truncate_caps_long_text(text in "\\PC{51,200}") {
        let out = truncate(&text, 50);
        prop_assert_eq!(out.chars().count(), 50 + ELLIPSIS.len());
        let prefix: String = text.chars().take(50).collect();
        prop_assert!(out.starts_with(&prefix));
        prop_assert!(out.ends_with(ELLIPSIS));
    }

    /// Property: decorating twice changes nothing.
    #[test]
    fn prop_format_status_idempotent(status in prop::sample::select(vec![
        "pending", "planning", "confirmed", "scheduled", "in_progress", "in review",
        "approved", "completed", "late", "cancelled", "active", "inactive",
        "Em Andamento", "CONCLUÍDO", "archived", "",
    ])) {
        let once = format_status(status);
        prop_assert_eq!(format_status(&once), once);
    }

    /// Property: unknown identifiers pass through unchanged.
    #[test]
    fn prop_format_status_unknown_passthrough(status in "x[a-z]{3,12}") {
        prop_assert_eq!(format_status(&status), status);
    }

    /// Property: `duration` is total and rejects reversed spans.
    #[test]
    fn prop_duration_never_panics(a in iso_datetime(), b in iso_datetime()) {
        let forward = duration(a.as_str(), b.as_str());
        if a > b {
            prop_assert_eq!(forward, DURATION_UNAVAILABLE);
        } else {
            prop_assert_ne!(forward, DURATION_UNAVAILABLE);
        }
    }

    /// Property: garbage never panics any formatter.
    #[test]
    fn prop_formatters_total(text in "\\PC{0,40}") {
        let _ = format_date(&text);
        let _ = format_datetime(text.as_str());
        let _ = format_status(&text);
        let _ = duration(text.as_str(), text.as_str());
        let _ = format_currency(text.as_str());
    }
}

#[test_case("2025-01-01T00:00:00", "2025-01-01T02:30:00", "02:30" ; "two and a half hours")]
#[test_case("2025-01-01T00:00:00", "2025-01-02T02:00:00", "1d 02:00" ; "twenty six hours")]
#[test_case("2025-01-01T00:00:00", "2025-01-01T00:00:00", "00:00" ; "empty span")]
#[test_case("2025-01-02T00:00:00", "2025-01-01T00:00:00", "N/D" ; "reversed span")]
#[test_case("ontem", "2025-01-01T00:00:00", "N/D" ; "unparseable start")]
fn test_duration_table(start: &str, end: &str, expected: &str) {
    assert_eq!(duration(start, end), expected);
}

#[test_case("concluído", "✅ Concluído" ; "portuguese completed")]
#[test_case("completed", "✅ Concluído" ; "english completed")]
#[test_case("in_progress", "🔄 Em Andamento" ; "in progress")]
#[test_case("Em Revisão", "👀 Em Revisão" ; "review with space")]
#[test_case("cancelled", "❌ Cancelado" ; "cancelled")]
#[test_case("mystery", "mystery" ; "unknown")]
fn test_format_status_table(input: &str, expected: &str) {
    assert_eq!(format_status(input), expected);
}
