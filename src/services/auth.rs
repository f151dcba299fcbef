//! Credential verification.
//!
//! Staff accounts live in `users`; client portal logins are the optional
//! credentials on `clients`. Both store a SHA-256 hex digest of the password.

use super::fetch_fresh;
use crate::models::{AccessLevel, Client, NewUser, User, new_id, now_iso};
use crate::session::{IdentityKind, UserIdentity};
use crate::sql_params;
use crate::storage::{Database, FromRecord};
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::instrument;

const SELECT_USER: &str =
    "SELECT id, username, password_hash, name, email, access_level, active FROM users";

/// Message for every failed login; never reveals which part was wrong.
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Returns the SHA-256 hex digest of `password`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compares `password` against a stored digest.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password);
    let stored = stored_hash.trim().to_ascii_lowercase();
    computed.len() == stored.len()
        && computed
            .bytes()
            .zip(stored.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Service for logins.
pub struct AuthService {
    db: Arc<Database>,
}

impl AuthService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates a staff account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blanks, [`Error::ConstraintViolated`]
    /// when the username is taken, or a storage error.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn create_user(&self, request: NewUser) -> Result<User> {
        request.validate()?;
        let id = new_id();
        self.db.write(
            "INSERT INTO users (id, username, password_hash, name, email, access_level, active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
            &sql_params![
                id.as_str(),
                request.username.trim(),
                hash_password(&request.password),
                request.name.trim(),
                request.email,
                request.access_level,
                now_iso()
            ],
        )?;
        fetch_fresh(&self.db, &format!("{SELECT_USER} WHERE id = ?1"), "user", &id)
    }

    /// Verifies credentials, trying active staff accounts first and then
    /// client portal logins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] for unknown users, wrong passwords and
    /// inactive accounts, or a storage error.
    #[instrument(skip(self, password))]
    pub fn authenticate(&self, username: &str, password: &str) -> Result<UserIdentity> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let user = self
            .db
            .read_uncached(&format!("{SELECT_USER} WHERE username = ?1"), &sql_params![username])?
            .first()
            .map(User::from_record)
            .transpose()?;
        if let Some(user) = user.filter(|u| u.active) {
            if verify_password(password, &user.password_hash) {
                tracing::info!(user_id = %user.id, "Staff login");
                return Ok(UserIdentity {
                    id: user.id,
                    username: user.username,
                    name: user.name,
                    access_level: user.access_level,
                    kind: IdentityKind::Staff,
                });
            }
        }

        let client = self
            .db
            .read_uncached(
                "SELECT id, company, contact_name, email, phone, username, password_hash, \
                 access_level, created_at FROM clients WHERE username = ?1",
                &sql_params![username],
            )?
            .first()
            .map(Client::from_record)
            .transpose()?;
        if let Some(client) = client {
            if client
                .password_hash
                .as_deref()
                .is_some_and(|hash| verify_password(password, hash))
            {
                tracing::info!(client_id = %client.id, "Client portal login");
                return Ok(UserIdentity {
                    id: client.id,
                    username: username.to_string(),
                    name: client.contact_name.unwrap_or(client.company),
                    access_level: client.access_level.unwrap_or(AccessLevel::Client),
                    kind: IdentityKind::Client,
                });
            }
        }

        tracing::warn!(username, "Login rejected");
        metrics::counter!("gonetwork_login_failures_total").increment(1);
        Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()))
    }

    /// Disables or re-enables a staff account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    pub fn set_active(&self, user_id: &str, active: bool) -> Result<()> {
        if self.db.write(
            "UPDATE users SET active = ?2 WHERE id = ?1",
            &sql_params![user_id, active],
        )? {
            Ok(())
        } else {
            Err(super::not_found("user", user_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ClientService, NewClient};

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
        assert!(verify_password("admin", &hash_password("admin").to_uppercase()));
        assert!(!verify_password("admin", "8c69"));
    }

    #[test]
    fn test_staff_login() {
        let (_dir, db) = crate::services::test_support::open_db();
        let auth = AuthService::new(db);
        let user = auth
            .create_user(NewUser::new("ana", "pw", AccessLevel::Manager))
            .unwrap();
        assert_ne!(user.password_hash, "pw");

        let identity = auth.authenticate("ana", "pw").unwrap();
        assert_eq!(identity.kind, IdentityKind::Staff);
        assert_eq!(identity.access_level, AccessLevel::Manager);

        assert!(matches!(auth.authenticate("ana", "nope"), Err(Error::Unauthorized(_))));
        assert!(matches!(auth.authenticate("ghost", "pw"), Err(Error::Unauthorized(_))));

        auth.set_active(&user.id, false).unwrap();
        assert!(matches!(auth.authenticate("ana", "pw"), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_client_portal_login() {
        let (_dir, db) = crate::services::test_support::open_db();
        let clients = ClientService::new(Arc::clone(&db));
        let auth = AuthService::new(db);
        let acme = clients.create(NewClient::new("Acme")).unwrap();
        clients
            .set_credentials(&acme.id, "acme", "portal", AccessLevel::Client)
            .unwrap();

        let identity = auth.authenticate("acme", "portal").unwrap();
        assert_eq!(identity.kind, IdentityKind::Client);
        assert_eq!(identity.id, acme.id);
        assert_eq!(identity.name, "Acme");
    }

    #[test]
    fn test_duplicate_username() {
        let (_dir, db) = crate::services::test_support::open_db();
        let auth = AuthService::new(db);
        auth.create_user(NewUser::new("ana", "pw", AccessLevel::Editor)).unwrap();
        let err = auth
            .create_user(NewUser::new("ana", "other", AccessLevel::Editor))
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolated { .. }));
    }
}
