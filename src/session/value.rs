//! Loosely typed session values and key names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value stored under a session key.
///
/// Known keys are kept as typed fields on [`super::Session`]; this type is the
/// exchange format for the string-keyed accessors and for extra keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionValue {
    /// No value.
    #[default]
    Null,
    /// Flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text.
    Text(String),
    /// List.
    List(Vec<SessionValue>),
    /// Nested map.
    Map(BTreeMap<String, SessionValue>),
}

impl SessionValue {
    /// Returns `true` for [`SessionValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the flag, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for SessionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for SessionValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for SessionValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Self>> From<Option<T>> for SessionValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Name of a session entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Whether a user is logged in.
    Authenticated,
    /// The logged-in identity.
    User,
    /// Page being shown.
    CurrentPage,
    /// Event picked in lists.
    SelectedEvent,
    /// Client picked in lists.
    SelectedClient,
    /// List filters.
    Filters,
    /// Color theme.
    Theme,
    /// Whether the sidebar is folded.
    SidebarCollapsed,
    /// Time of the last request.
    LastActivity,
    /// Any other key.
    Custom(String),
}

impl SessionKey {
    /// Keys that survive a logout.
    pub const PRESERVED: [Self; 2] = [Self::Theme, Self::SidebarCollapsed];

    /// Returns the key name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authenticated => "authenticated",
            Self::User => "user",
            Self::CurrentPage => "current_page",
            Self::SelectedEvent => "selected_event",
            Self::SelectedClient => "selected_client",
            Self::Filters => "filters",
            Self::Theme => "theme",
            Self::SidebarCollapsed => "sidebar_collapsed",
            Self::LastActivity => "last_activity",
            Self::Custom(name) => name,
        }
    }

    /// Maps a name onto a key. Unknown names become [`SessionKey::Custom`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "authenticated" => Self::Authenticated,
            "user" => Self::User,
            "current_page" => Self::CurrentPage,
            "selected_event" => Self::SelectedEvent,
            "selected_client" => Self::SelectedClient,
            "filters" => Self::Filters,
            "theme" => Self::Theme,
            "sidebar_collapsed" => Self::SidebarCollapsed,
            "last_activity" => Self::LastActivity,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns `true` if the key survives a logout.
    #[must_use]
    pub fn is_preserved(&self) -> bool {
        Self::PRESERVED.contains(self)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SessionKey {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}
