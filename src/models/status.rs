//! Workflow status, priority and access-level enums.
//!
//! Values are stored as their English identifiers. Parsing accepts those
//! identifiers and the Portuguese labels the forms submit, case-insensitively
//! and with spaces or hyphens in place of underscores.

use crate::format::normalize_keyword;
use crate::storage::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! impl_text_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                Self::parse(s)
                    .ok_or_else(|| crate::Error::InvalidInput(format!("unknown {}: {s}", $what)))
            }
        }

        impl From<$ty> for SqlValue {
            fn from(value: $ty) -> Self {
                Self::from(value.as_str())
            }
        }
    };
}

/// Lifecycle of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being planned.
    #[default]
    Planning,
    /// Confirmed with the client.
    Confirmed,
    /// Happening or in post-production.
    InProgress,
    /// Finished.
    Completed,
    /// Called off.
    Cancelled,
}

impl EventStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Planning,
        Self::Confirmed,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the stored identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses an identifier or Portuguese label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_keyword(s).as_str() {
            "planning" | "planejamento" | "planejado" => Some(Self::Planning),
            "confirmed" | "confirmado" => Some(Self::Confirmed),
            "in_progress" | "em_andamento" | "andamento" => Some(Self::InProgress),
            "completed" | "concluído" | "concluido" => Some(Self::Completed),
            "cancelled" | "canceled" | "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl_text_enum!(EventStatus, "event status");

/// Status of a timeline item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Not started yet.
    #[default]
    Scheduled,
    /// Under way.
    InProgress,
    /// Done.
    Completed,
    /// Past its end time and not done.
    Late,
    /// Dropped.
    Cancelled,
}

impl ItemStatus {
    /// Returns the stored identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Late => "late",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses an identifier or Portuguese label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_keyword(s).as_str() {
            "scheduled" | "agendado" | "pending" | "pendente" => Some(Self::Scheduled),
            "in_progress" | "em_andamento" | "andamento" => Some(Self::InProgress),
            "completed" | "concluído" | "concluido" => Some(Self::Completed),
            "late" | "atrasado" | "overdue" => Some(Self::Late),
            "cancelled" | "canceled" | "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns `true` for statuses that can no longer become late.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Gantt bar color used when the item has none of its own.
    #[must_use]
    pub const fn default_color(&self) -> &'static str {
        match self {
            Self::Scheduled => "#6c757d",
            Self::InProgress => "#0d6efd",
            Self::Completed => "#198754",
            Self::Late => "#dc3545",
            Self::Cancelled => "#adb5bd",
        }
    }
}

impl_text_enum!(ItemStatus, "timeline status");

/// Priority of a timeline item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Can slip.
    Low,
    /// Normal.
    #[default]
    Medium,
    /// Important.
    High,
    /// Blocks the event.
    Urgent,
}

impl Priority {
    /// Returns the stored identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    /// Parses an identifier or Portuguese label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_keyword(s).as_str() {
            "low" | "baixa" => Some(Self::Low),
            "medium" | "média" | "media" | "normal" => Some(Self::Medium),
            "high" | "alta" => Some(Self::High),
            "urgent" | "urgente" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl_text_enum!(Priority, "priority");

/// Status of a deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    /// Not started.
    #[default]
    Pending,
    /// Being produced.
    InProgress,
    /// Waiting on client review.
    InReview,
    /// Accepted by the client.
    Approved,
    /// Delivered.
    Completed,
    /// Dropped.
    Cancelled,
}

impl DeliverableStatus {
    /// Returns the stored identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses an identifier or Portuguese label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_keyword(s).as_str() {
            "pending" | "pendente" => Some(Self::Pending),
            "in_progress" | "em_andamento" | "em_progresso" => Some(Self::InProgress),
            "in_review" | "em_revisão" | "em_revisao" | "review" => Some(Self::InReview),
            "approved" | "aprovado" => Some(Self::Approved),
            "completed" | "concluído" | "concluido" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" | "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns `true` once the deliverable no longer counts as open work.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl_text_enum!(DeliverableStatus, "deliverable status");

/// Access level of a user or client login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Read-only access, including client portal logins.
    #[default]
    Viewer,
    /// Client portal with comment and approval rights.
    Client,
    /// Production staff.
    Editor,
    /// Project managers.
    Manager,
    /// Full control.
    Admin,
}

impl AccessLevel {
    /// Returns the stored identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Client => "client",
            Self::Editor => "editor",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parses an identifier or Portuguese label.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match normalize_keyword(s).as_str() {
            "viewer" | "visualizador" | "leitura" => Some(Self::Viewer),
            "client" | "cliente" => Some(Self::Client),
            "editor" => Some(Self::Editor),
            "manager" | "gerente" | "gestor" => Some(Self::Manager),
            "admin" | "administrador" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns `true` if this level may create and edit production data.
    #[must_use]
    pub const fn can_edit(&self) -> bool {
        matches!(self, Self::Editor | Self::Manager | Self::Admin)
    }
}

impl_text_enum!(AccessLevel, "access level");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_portuguese_labels() {
        assert_eq!(EventStatus::parse("Em Andamento"), Some(EventStatus::InProgress));
        assert_eq!(DeliverableStatus::parse("em-revisão"), Some(DeliverableStatus::InReview));
        assert_eq!(Priority::parse("URGENTE"), Some(Priority::Urgent));
        assert_eq!(ItemStatus::parse("atrasado"), Some(ItemStatus::Late));
        assert_eq!(AccessLevel::parse("Administrador"), Some(AccessLevel::Admin));
    }

    #[test]
    fn test_round_trip_identifiers() {
        for status in EventStatus::ALL {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_from_str_error() {
        let err = "archived".parse::<EventStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: unknown event status: archived");
    }

    #[test]
    fn test_closed_states() {
        assert!(DeliverableStatus::Completed.is_closed());
        assert!(!DeliverableStatus::Approved.is_closed());
        assert!(ItemStatus::Cancelled.is_closed());
        assert!(!ItemStatus::Late.is_closed());
    }

    #[test]
    fn test_serde_identifiers() {
        assert_eq!(serde_json::to_string(&DeliverableStatus::InReview).unwrap(), "\"in_review\"");
        assert_eq!(SqlValue::from(Priority::High), SqlValue::from("high"));
    }
}
