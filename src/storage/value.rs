//! Dynamically typed `SQLite` values.

use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::fmt;

/// A single `SQLite` value as read from or bound to a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// `NULL`.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns `true` for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, parsing text when possible.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Real(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short name of the storage class, used in mapping errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Feeds a type-tagged encoding of the value into a hasher.
    pub(crate) fn hash_into(&self, hasher: &mut sha2::Sha256) {
        match self {
            Self::Null => hasher.update([0u8]),
            Self::Integer(i) => {
                hasher.update([1u8]);
                hasher.update(i.to_le_bytes());
            },
            Self::Real(f) => {
                hasher.update([2u8]);
                hasher.update(f.to_bits().to_le_bytes());
            },
            Self::Text(s) => {
                hasher.update([3u8]);
                hasher.update((s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            },
            Self::Blob(b) => {
                hasher.update([4u8]);
                hasher.update((b.len() as u64).to_le_bytes());
                hasher.update(b);
            },
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(Value::Null),
            Self::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Self::Real(r) => ToSqlOutput::Owned(Value::Real(*r)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for SqlValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for SqlValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for SqlValue {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u8> for SqlValue {
    fn from(i: u8) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for SqlValue {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        Self::Integer(i64::from(b))
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Blob(b)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a fixed-size array of [`SqlValue`] parameters.
///
/// ```rust
/// use gonetwork::sql_params;
/// use gonetwork::storage::SqlValue;
///
/// let params = sql_params!["acme", 42_i64, None::<String>];
/// assert_eq!(params[2], SqlValue::Null);
/// ```
#[macro_export]
macro_rules! sql_params {
    () => {{
        let params: [$crate::storage::SqlValue; 0] = [];
        params
    }};
    ($($value:expr),+ $(,)?) => {
        [$($crate::storage::SqlValue::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_i64_parses_text() {
        assert_eq!(SqlValue::from("42").as_i64(), Some(42));
        assert_eq!(SqlValue::Real(3.0).as_i64(), Some(3));
        assert_eq!(SqlValue::Real(3.5).as_i64(), None);
        assert_eq!(SqlValue::Null.as_i64(), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<&str>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".to_string()));
        assert_eq!(SqlValue::from(true), SqlValue::Integer(1));
    }

    #[test]
    fn test_hash_distinguishes_types() {
        let digest = |v: &SqlValue| {
            let mut hasher = sha2::Sha256::new();
            v.hash_into(&mut hasher);
            hex::encode(hasher.finalize())
        };
        assert_ne!(digest(&SqlValue::from("1")), digest(&SqlValue::from(1_i64)));
        assert_ne!(digest(&SqlValue::Null), digest(&SqlValue::from("")));
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::Null.to_string(), "");
        assert_eq!(SqlValue::Blob(vec![1, 2]).to_string(), "<blob 2 bytes>");
    }
}
