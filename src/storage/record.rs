//! Row records and the typed mapping layer.
//!
//! [`Record`] keeps the column order of the statement that produced it.
//! Entity structs implement [`FromRecord`] to turn records into typed values
//! at the façade boundary.

use super::SqlValue;
use crate::{Error, Result};
use serde::Serialize;
use serde::ser::SerializeMap;
use std::sync::Arc;

/// One result row: column names (shared by all rows of a result) and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Record {
    /// Creates a record. Missing trailing values read as `NULL`.
    #[must_use]
    pub const fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Builds a record from `(column, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        let (columns, values): (Vec<String>, Vec<SqlValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    /// Column names in statement order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the record has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Looks a value up by column name.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.values.get(idx).unwrap_or(&SqlValue::Null))
    }

    /// Iterates `(column, value)` pairs in statement order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), self.values.get(i).unwrap_or(&SqlValue::Null)))
    }

    fn required(&self, column: &str) -> Result<&SqlValue> {
        self.get(column).ok_or_else(|| invalid(column, "column missing from result"))
    }

    /// Reads a non-null text column. Numbers are rendered as text since some
    /// legacy keys are numeric strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the column is missing, `NULL` or a blob.
    pub fn text(&self, column: &str) -> Result<String> {
        match self.required(column)? {
            SqlValue::Text(s) => Ok(s.clone()),
            SqlValue::Integer(i) => Ok(i.to_string()),
            SqlValue::Real(r) => Ok(r.to_string()),
            other => Err(invalid(column, &format!("expected text, found {}", other.type_name()))),
        }
    }

    /// Reads an optional text column. Missing columns, `NULL` and empty text
    /// read as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the value is a blob.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(SqlValue::Text(s)) if s.is_empty() => Ok(None),
            Some(_) => self.text(column).map(Some),
        }
    }

    /// Reads a non-null integer column, accepting numeric text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the value is missing or not numeric.
    pub fn integer(&self, column: &str) -> Result<i64> {
        let value = self.required(column)?;
        value.as_i64().ok_or_else(|| {
            invalid(column, &format!("expected integer, found {}", value.type_name()))
        })
    }

    /// Reads an optional integer column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if a present value is not numeric.
    pub fn opt_integer(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(_) => self.integer(column).map(Some),
        }
    }

    /// Reads a boolean stored as `0`/`1` (or `"true"`/`"false"` text).
    /// `NULL` and missing columns read as `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] for unrecognised values.
    pub fn boolean(&self, column: &str) -> Result<bool> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(false),
            Some(SqlValue::Integer(i)) => Ok(*i != 0),
            Some(SqlValue::Text(s)) => match s.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "sim" => Ok(true),
                "0" | "false" | "no" | "não" | "nao" | "" => Ok(false),
                other => Err(invalid(column, &format!("expected boolean, found '{other}'"))),
            },
            Some(other) => Err(invalid(
                column,
                &format!("expected boolean, found {}", other.type_name()),
            )),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

fn invalid(column: &str, cause: &str) -> Error {
    Error::InvalidRecord {
        column: column.to_string(),
        cause: cause.to_string(),
    }
}

/// Conversion from a result row into a typed entity.
pub trait FromRecord: Sized {
    /// Maps one record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] when a column is missing or mistyped.
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}
