//! Display formatters.
//!
//! Every function here is total: malformed input never panics and never
//! returns an error, it degrades to a best-effort string (usually the input
//! itself). Page handlers can call them on raw database values directly.
//!
//! | Function | Output |
//! |----------|--------|
//! | [`format_date`] | `YYYY-MM-DD` |
//! | [`format_datetime`] | `DD/MM/YYYY HH:MM` |
//! | [`duration`] | `Nd HH:MM` or `HH:MM` |
//! | [`format_status`] | icon-prefixed label |
//! | [`format_currency`] | `R$ 1.234,56` |
//! | [`truncate`] | at most `max_len` chars plus `...` |

mod currency;
mod datetime;
mod status;

pub use currency::{CurrencyInput, format_currency, parse_brl};
pub use datetime::{
    DURATION_UNAVAILABLE, DateInput, duration, format_date, format_datetime, parse_iso,
};
pub use status::format_status;
pub(crate) use status::normalize as normalize_keyword;

/// Default maximum length used by [`truncate`] callers.
pub const DEFAULT_TRUNCATE_LEN: usize = 50;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

/// Shortens `text` to `max_len` characters, appending [`ELLIPSIS`] when cut.
///
/// Lengths are counted in `char`s so multi-byte text is never split inside a
/// code point.
///
/// ```rust
/// use gonetwork::format::truncate;
///
/// assert_eq!(truncate("short", 50), "short");
/// assert_eq!(truncate("abcdef", 3), "abc...");
/// ```
#[must_use]
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        let text = "a".repeat(DEFAULT_TRUNCATE_LEN);
        assert_eq!(truncate(&text, DEFAULT_TRUNCATE_LEN), text);
    }

    #[test]
    fn test_truncate_long_text() {
        let text = "b".repeat(80);
        let out = truncate(&text, DEFAULT_TRUNCATE_LEN);
        assert_eq!(out.len(), 53);
        assert!(out.starts_with(&text[..50]));
        assert!(out.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ação", 2), "aç...");
        assert_eq!(truncate("", 0), "");
    }
}
