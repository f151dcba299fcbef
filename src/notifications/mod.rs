//! Session-scoped notifications.
//!
//! A [`NotificationStore`] lives inside one [`crate::Session`] and is never
//! persisted. Listing prunes expired entries permanently: once a notification
//! has expired it is gone for the rest of the session, even if the clock
//! were to move backwards.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default lifetime of a notification, in minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 60;

/// How a notification is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    #[default]
    Info,
    /// A completed action.
    Success,
    /// Something needs attention.
    Warning,
    /// An action failed.
    Error,
}

impl Severity {
    /// Returns the severity as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Parses a severity from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "success" => Some(Self::Success),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Icon shown next to the message.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Success => "✅",
            Self::Warning => "⚠️",
            Self::Error => "❌",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Session-local id.
    pub id: u64,
    /// Text.
    pub message: String,
    /// Style.
    pub severity: Severity,
    /// When it was queued.
    pub created_at: DateTime<Utc>,
    /// First instant at which it is no longer shown.
    pub expires_at: DateTime<Utc>,
    /// Whether the user dismissed it.
    pub read: bool,
    /// Only this user sees it; `None` means everyone.
    pub target_user: Option<String>,
}

impl Notification {
    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Returns `true` if `user` may see this notification. Without a user
    /// filter everything is visible.
    #[must_use]
    pub fn is_visible_to(&self, user: Option<&str>) -> bool {
        match (user, self.target_user.as_deref()) {
            (None, _) | (_, None) => true,
            (Some(user), Some(target)) => user == target,
        }
    }
}

/// Ephemeral queue of notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStore {
    items: Vec<Notification>,
    next_id: u64,
}

impl NotificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a message living `ttl_minutes`, returning its id.
    pub fn add(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        ttl_minutes: u32,
        target_user: Option<&str>,
    ) -> u64 {
        self.add_at(Utc::now(), message, severity, ttl_minutes, target_user)
    }

    /// Like [`NotificationStore::add`] with an explicit clock.
    pub fn add_at(
        &mut self,
        now: DateTime<Utc>,
        message: impl Into<String>,
        severity: Severity,
        ttl_minutes: u32,
        target_user: Option<&str>,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Notification {
            id,
            message: message.into(),
            severity,
            created_at: now,
            expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
            read: false,
            target_user: target_user.map(String::from),
        });
        tracing::trace!(id, severity = %severity, "Notification queued");
        id
    }

    /// Prunes expired entries, then returns the ones visible to
    /// `target_user`, skipping read ones unless `include_read`.
    pub fn list(&mut self, include_read: bool, target_user: Option<&str>) -> Vec<Notification> {
        self.list_at(Utc::now(), include_read, target_user)
    }

    /// Like [`NotificationStore::list`] with an explicit clock.
    pub fn list_at(
        &mut self,
        now: DateTime<Utc>,
        include_read: bool,
        target_user: Option<&str>,
    ) -> Vec<Notification> {
        self.prune_at(now);
        self.items
            .iter()
            .filter(|n| include_read || !n.read)
            .filter(|n| n.is_visible_to(target_user))
            .cloned()
            .collect()
    }

    /// Drops expired entries, returning how many went.
    pub fn prune_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.items.len();
        self.items.retain(|n| !n.is_expired_at(now));
        before - self.items.len()
    }

    /// Marks one notification read. Returns `false` for unknown ids.
    pub fn mark_read(&mut self, id: u64) -> bool {
        self.items
            .iter_mut()
            .find(|n| n.id == id)
            .map(|n| n.read = true)
            .is_some()
    }

    /// Marks everything read, returning how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    /// Counts unread, unexpired notifications visible to `target_user`.
    pub fn unread_count(&mut self, target_user: Option<&str>) -> usize {
        self.unread_count_at(Utc::now(), target_user)
    }

    /// Like [`NotificationStore::unread_count`] with an explicit clock.
    pub fn unread_count_at(&mut self, now: DateTime<Utc>, target_user: Option<&str>) -> usize {
        self.list_at(now, false, target_user).len()
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let mut store = NotificationStore::new();
        store.add_at(t0(), "saved", Severity::Success, 0, None);
        let later = t0() + Duration::seconds(1);
        assert!(store.list_at(later, true, None).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_pruning_is_permanent() {
        let mut store = NotificationStore::new();
        store.add_at(t0(), "short", Severity::Info, 1, None);
        store.list_at(t0() + Duration::minutes(2), true, None);
        assert!(store.list_at(t0(), true, None).is_empty());
    }

    #[test]
    fn test_read_filter_and_targets() {
        let mut store = NotificationStore::new();
        let all = store.add_at(t0(), "for all", Severity::Info, 10, None);
        store.add_at(t0(), "for ana", Severity::Warning, 10, Some("ana"));
        store.add_at(t0(), "for bia", Severity::Error, 10, Some("bia"));

        assert_eq!(store.list_at(t0(), false, Some("ana")).len(), 2);
        assert_eq!(store.list_at(t0(), false, None).len(), 3);

        assert!(store.mark_read(all));
        assert!(!store.mark_read(999));
        assert_eq!(store.unread_count_at(t0(), Some("ana")), 1);
        assert_eq!(store.list_at(t0(), true, Some("ana")).len(), 2);

        assert_eq!(store.mark_all_read(), 2);
        assert_eq!(store.mark_all_read(), 0);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut store = NotificationStore::new();
        let a = store.add_at(t0(), "a", Severity::Info, 5, None);
        let b = store.add_at(t0(), "b", Severity::Info, 5, None);
        assert_eq!(b, a + 1);
        assert_eq!(Severity::parse("WARN"), Some(Severity::Warning));
    }
}
