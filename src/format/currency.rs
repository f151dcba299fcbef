//! Brazilian real formatting.

use std::fmt;

/// A monetary amount as typed into a form or read from storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurrencyInput<'a> {
    /// Free text such as `"R$ 1.234,56"` or `"1500"`.
    Text(&'a str),
    /// A numeric amount.
    Amount(f64),
}

impl fmt::Display for CurrencyInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

impl<'a> From<&'a str> for CurrencyInput<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a String> for CurrencyInput<'a> {
    fn from(s: &'a String) -> Self {
        Self::Text(s.as_str())
    }
}

impl From<f64> for CurrencyInput<'_> {
    fn from(amount: f64) -> Self {
        Self::Amount(amount)
    }
}

impl From<i64> for CurrencyInput<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn from(amount: i64) -> Self {
        Self::Amount(amount as f64)
    }
}

/// Parses Brazilian-formatted money text.
///
/// `R$` and whitespace are removed, `.` thousands separators dropped and `,`
/// read as the decimal separator.
#[must_use]
pub fn parse_brl(text: &str) -> Option<f64> {
    let cleaned: String = text
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("R$ {sign}{},{frac_part}", group_thousands(int_part))
}

/// Formats an amount as `R$ 1.234,56`.
///
/// Text that does not parse as money is returned unchanged.
///
/// ```rust
/// use gonetwork::format::format_currency;
///
/// assert_eq!(format_currency(1234.5), "R$ 1.234,50");
/// assert_eq!(format_currency("R$ 1.234,56"), "R$ 1.234,56");
/// assert_eq!(format_currency("a combinar"), "a combinar");
/// ```
#[must_use]
pub fn format_currency<'a>(value: impl Into<CurrencyInput<'a>>) -> String {
    let value = value.into();
    let amount = match value {
        CurrencyInput::Text(text) => parse_brl(text),
        CurrencyInput::Amount(amount) => Some(amount).filter(|v| v.is_finite()),
    };
    amount.map_or_else(|| value.to_string(), format_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1.234");
        assert_eq!(group_thousands("1234567"), "1.234.567");
    }

    #[test]
    fn test_parse_brl() {
        assert_eq!(parse_brl("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_brl("1500"), Some(1500.0));
        assert_eq!(parse_brl("-2,5"), Some(-2.5));
        assert_eq!(parse_brl("R$"), None);
        assert_eq!(parse_brl("dez reais"), None);
    }

    #[test]
    fn test_format_negative_and_integer() {
        assert_eq!(format_currency(-1_500_000_i64), "R$ -1.500.000,00");
        assert_eq!(format_currency(0.004), "R$ 0,00");
        assert_eq!(format_currency(-0.001), "R$ 0,00");
        assert_eq!(format_currency(f64::INFINITY), "inf");
    }
}
