//! Per-session state.
//!
//! A [`Session`] is an explicit context object owned by whichever front end
//! serves the user and passed to every handler. It tracks authentication,
//! navigation and UI preferences, enforces an inactivity timeout, and holds
//! the session's [`NotificationStore`].
//!
//! # State machine
//!
//! ```text
//! Anonymous --login--> Authenticated --logout / timeout--> Anonymous
//! ```
//!
//! Logging out clears everything except the theme and the sidebar state, then
//! re-applies the defaults.

mod value;

pub use value::{SessionKey, SessionValue};

use crate::models::AccessLevel;
use crate::notifications::NotificationStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default inactivity timeout (2 hours).
pub const DEFAULT_TIMEOUT_SECS: u64 = 7200;

/// Which table an identity was authenticated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// A `users` row.
    Staff,
    /// A client portal login.
    Client,
}

/// The logged-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// Row id.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Access level.
    pub access_level: AccessLevel,
    /// Origin of the identity.
    pub kind: IdentityKind,
}

/// Navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Home.
    #[default]
    Dashboard,
    /// Event list.
    Events,
    /// Client list.
    Clients,
    /// Crew.
    Team,
    /// Schedules.
    Timeline,
    /// Deliverables.
    Deliverables,
    /// Briefings.
    Briefings,
    /// Video review.
    Videos,
    /// Reports.
    Reports,
    /// Preferences.
    Settings,
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

/// Whether someone is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is logged in.
    Anonymous,
    /// A user is logged in.
    Authenticated,
}

/// One user's session context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    authenticated: Option<bool>,
    user: Option<UserIdentity>,
    current_page: Option<Page>,
    selected_event: Option<String>,
    selected_client: Option<String>,
    filters: Option<BTreeMap<String, String>>,
    theme: Option<Theme>,
    sidebar_collapsed: Option<bool>,
    last_activity: Option<DateTime<Utc>>,
    extras: BTreeMap<String, SessionValue>,
    #[serde(skip)]
    notifications: NotificationStore,
    #[serde(skip, default = "default_timeout")]
    timeout: Duration,
}

const fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an initialized anonymous session with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(default_timeout())
    }

    /// Creates an initialized anonymous session with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let mut session = Self::blank(timeout);
        session.initialize();
        session
    }

    fn blank(timeout: Duration) -> Self {
        Self {
            authenticated: None,
            user: None,
            current_page: None,
            selected_event: None,
            selected_client: None,
            filters: None,
            theme: None,
            sidebar_collapsed: None,
            last_activity: None,
            extras: BTreeMap::new(),
            notifications: NotificationStore::new(),
            timeout,
        }
    }

    /// Fills every unset key with its default. Keys that already hold a value
    /// are left alone, so calling this on every request is safe.
    pub fn initialize(&mut self) {
        self.initialize_at(Utc::now());
    }

    /// Like [`Session::initialize`] with an explicit clock.
    pub fn initialize_at(&mut self, now: DateTime<Utc>) {
        self.authenticated.get_or_insert(false);
        self.current_page.get_or_insert_default();
        self.filters.get_or_insert_default();
        self.theme.get_or_insert_default();
        self.sidebar_collapsed.get_or_insert(false);
        self.last_activity.get_or_insert(now);
    }

    /// Inactivity timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Records activity now.
    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    /// Records activity at `now`.
    pub const fn touch_at(&mut self, now: DateTime<Utc>) {
        self.last_activity = Some(now);
    }

    /// Logs out a session flagged authenticated that has been idle for
    /// longer than the timeout. Returns `true` if it did.
    ///
    /// Only the `authenticated` flag is consulted, so a flag set through
    /// [`Session::set`] without an identity still expires.
    pub fn check_timeout(&mut self) -> bool {
        self.check_timeout_at(Utc::now())
    }

    /// Like [`Session::check_timeout`] with an explicit clock.
    pub fn check_timeout_at(&mut self, now: DateTime<Utc>) -> bool {
        if !self.authenticated.unwrap_or(false) {
            return false;
        }
        let Some(last) = self.last_activity else {
            return false;
        };
        let idle = (now - last).to_std().unwrap_or(Duration::ZERO);
        if idle <= self.timeout {
            return false;
        }
        tracing::info!(
            idle_secs = idle.as_secs(),
            timeout_secs = self.timeout.as_secs(),
            "Session timed out"
        );
        self.logout_at(now);
        true
    }

    /// Marks the session authenticated as `identity`.
    pub fn login(&mut self, identity: UserIdentity) {
        self.login_at(identity, Utc::now());
    }

    /// Like [`Session::login`] with an explicit clock.
    pub fn login_at(&mut self, identity: UserIdentity, now: DateTime<Utc>) {
        tracing::debug!(user_id = %identity.id, "Session authenticated");
        self.authenticated = Some(true);
        self.user = Some(identity);
        self.touch_at(now);
    }

    /// Clears the session except the preserved keys and re-initializes it.
    pub fn logout(&mut self) {
        self.logout_at(Utc::now());
    }

    /// Like [`Session::logout`] with an explicit clock.
    pub fn logout_at(&mut self, now: DateTime<Utc>) {
        let mut fresh = Self::blank(self.timeout);
        fresh.theme = self.theme;
        fresh.sidebar_collapsed = self.sidebar_collapsed;
        *self = fresh;
        self.initialize_at(now);
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Returns `true` if someone is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.unwrap_or(false) && self.user.is_some()
    }

    /// The logged-in identity.
    #[must_use]
    pub const fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// Page being shown.
    #[must_use]
    pub fn current_page(&self) -> Page {
        self.current_page.unwrap_or_default()
    }

    /// Navigates to `page`.
    pub const fn set_current_page(&mut self, page: Page) {
        self.current_page = Some(page);
    }

    /// Selected event id.
    #[must_use]
    pub fn selected_event(&self) -> Option<&str> {
        self.selected_event.as_deref()
    }

    /// Selected client id.
    #[must_use]
    pub fn selected_client(&self) -> Option<&str> {
        self.selected_client.as_deref()
    }

    /// List filters.
    #[must_use]
    pub fn filters(&self) -> Option<&BTreeMap<String, String>> {
        self.filters.as_ref()
    }

    /// Color theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.unwrap_or_default()
    }

    /// Whether the sidebar is folded.
    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed.unwrap_or(false)
    }

    /// Time of the last recorded activity.
    #[must_use]
    pub const fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Notifications of this session.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Mutable notifications of this session.
    pub const fn notifications_mut(&mut self) -> &mut NotificationStore {
        &mut self.notifications
    }

    /// Reads a value by key name, returning `default` when unset.
    #[must_use]
    pub fn get(&self, key: impl Into<SessionKey>, default: SessionValue) -> SessionValue {
        let value = match key.into() {
            SessionKey::Authenticated => to_value(self.authenticated.as_ref()),
            SessionKey::User => to_value(self.user.as_ref()),
            SessionKey::CurrentPage => to_value(self.current_page.as_ref()),
            SessionKey::SelectedEvent => to_value(self.selected_event.as_ref()),
            SessionKey::SelectedClient => to_value(self.selected_client.as_ref()),
            SessionKey::Filters => to_value(self.filters.as_ref()),
            SessionKey::Theme => to_value(self.theme.as_ref()),
            SessionKey::SidebarCollapsed => to_value(self.sidebar_collapsed.as_ref()),
            SessionKey::LastActivity => to_value(self.last_activity.as_ref()),
            SessionKey::Custom(name) => self.extras.get(&name).cloned(),
        };
        value.unwrap_or(default)
    }

    /// Stores a value by key name. Returns `false`, leaving the session
    /// untouched, when the value does not fit the key's type.
    /// [`SessionValue::Null`] unsets the key.
    pub fn set(&mut self, key: impl Into<SessionKey>, value: SessionValue) -> bool {
        let key = key.into();
        let stored = match &key {
            SessionKey::Authenticated => assign(&mut self.authenticated, &value),
            SessionKey::User => assign(&mut self.user, &value),
            SessionKey::CurrentPage => assign(&mut self.current_page, &value),
            SessionKey::SelectedEvent => assign(&mut self.selected_event, &value),
            SessionKey::SelectedClient => assign(&mut self.selected_client, &value),
            SessionKey::Filters => assign(&mut self.filters, &value),
            SessionKey::Theme => assign(&mut self.theme, &value),
            SessionKey::SidebarCollapsed => assign(&mut self.sidebar_collapsed, &value),
            SessionKey::LastActivity => assign(&mut self.last_activity, &value),
            SessionKey::Custom(name) => {
                if value.is_null() {
                    self.extras.remove(name);
                } else {
                    self.extras.insert(name.clone(), value);
                }
                true
            },
        };
        if !stored {
            tracing::debug!(key = %key, "Rejected session value of the wrong type");
        }
        stored
    }
}

fn to_value<T: Serialize>(field: Option<&T>) -> Option<SessionValue> {
    let field = field?;
    serde_json::to_value(field)
        .and_then(serde_json::from_value)
        .ok()
}

fn assign<T: DeserializeOwned>(slot: &mut Option<T>, value: &SessionValue) -> bool {
    if value.is_null() {
        *slot = None;
        return true;
    }
    match serde_json::to_value(value).and_then(serde_json::from_value::<T>) {
        Ok(parsed) => {
            *slot = Some(parsed);
            true
        },
        Err(_) => false,
    }
}
