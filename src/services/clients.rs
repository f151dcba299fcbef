//! Client management.

use super::{ensure_exists, fetch_fresh, hash_password, not_found};
use crate::models::{AccessLevel, Client, NewClient, new_id, now_iso, require_text};
use crate::sql_params;
use crate::storage::Database;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::instrument;

const SELECT_CLIENT: &str = "SELECT id, company, contact_name, email, phone, username, \
     password_hash, access_level, created_at FROM clients";

/// Service for client companies.
pub struct ClientService {
    db: Arc<Database>,
}

impl ClientService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank company, or a storage error.
    #[instrument(skip(self, request), fields(company = %request.company))]
    pub fn create(&self, request: NewClient) -> Result<Client> {
        request.validate()?;
        let id = new_id();
        self.db.write(
            "INSERT INTO clients (id, company, contact_name, email, phone, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            &sql_params![
                id.as_str(),
                request.company.trim(),
                request.contact_name,
                request.email,
                request.phone,
                now_iso()
            ],
        )?;
        tracing::info!(client_id = %id, "Client created");
        self.fetch(&id)
    }

    /// Looks a client up, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn find(&self, id: &str) -> Result<Option<Client>> {
        self.db
            .read_one_as(&format!("{SELECT_CLIENT} WHERE id = ?1"), &sql_params![id])
    }

    /// Looks a client up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    pub fn get(&self, id: &str) -> Result<Client> {
        self.find(id)?.ok_or_else(|| not_found("client", id))
    }

    /// Lists clients by company name.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list(&self) -> Result<Vec<Client>> {
        self.db
            .read_as(&format!("{SELECT_CLIENT} ORDER BY company COLLATE NOCASE"), &[])
    }

    /// Replaces the contact fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self, contact_name, email, phone))]
    pub fn update_contact(
        &self,
        id: &str,
        contact_name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Client> {
        let updated = self.db.write(
            "UPDATE clients SET contact_name = ?2, email = ?3, phone = ?4 WHERE id = ?1",
            &sql_params![id, contact_name, email, phone],
        )?;
        if !updated {
            return Err(not_found("client", id));
        }
        self.fetch(id)
    }

    /// Grants or replaces portal credentials. The password is stored hashed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent, [`Error::ConstraintViolated`]
    /// when the username is taken, or [`Error::InvalidInput`] for blanks.
    #[instrument(skip(self, password))]
    pub fn set_credentials(
        &self,
        id: &str,
        username: &str,
        password: &str,
        access_level: AccessLevel,
    ) -> Result<()> {
        require_text("username", username)?;
        require_text("password", password)?;
        ensure_exists(&self.db, "clients", "client", id)?;
        self.db.write(
            "UPDATE clients SET username = ?2, password_hash = ?3, access_level = ?4 WHERE id = ?1",
            &sql_params![id, username.trim(), hash_password(password), access_level],
        )?;
        tracing::info!(client_id = %id, "Client credentials updated");
        Ok(())
    }

    /// Deletes a client that no event references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstraintViolated`] while events reference the
    /// client, [`Error::NotFound`] when absent, or a storage error.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<()> {
        ensure_exists(&self.db, "clients", "client", id)?;
        let events = self
            .db
            .count("SELECT COUNT(*) FROM events WHERE client_id = ?1", &sql_params![id])?;
        if events > 0 {
            tracing::warn!(client_id = %id, events, "Refusing to delete client with events");
            return Err(Error::ConstraintViolated {
                operation: "delete_client".to_string(),
                cause: format!("{events} event(s) still reference client '{id}'"),
            });
        }
        self.db
            .write("DELETE FROM clients WHERE id = ?1", &sql_params![id])?;
        tracing::info!(client_id = %id, "Client deleted");
        Ok(())
    }

    fn fetch(&self, id: &str) -> Result<Client> {
        fetch_fresh(&self.db, &format!("{SELECT_CLIENT} WHERE id = ?1"), "client", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::open_db;

    #[test]
    fn test_create_and_list() {
        let (_dir, db) = open_db();
        let service = ClientService::new(db);
        let acme = service
            .create(NewClient::new("Acme").with_contact("Ana").with_email("ana@acme.test"))
            .unwrap();
        service.create(NewClient::new("beta films")).unwrap();

        assert_eq!(service.get(&acme.id).unwrap().contact_name.as_deref(), Some("Ana"));
        let names: Vec<String> = service.list().unwrap().into_iter().map(|c| c.company).collect();
        assert_eq!(names, ["Acme", "beta films"]);
    }

    #[test]
    fn test_update_contact_and_missing() {
        let (_dir, db) = open_db();
        let service = ClientService::new(db);
        let acme = service.create(NewClient::new("Acme")).unwrap();

        let updated = service
            .update_contact(&acme.id, Some("Bruno"), None, Some("+55 11 9999"))
            .unwrap();
        assert_eq!(updated.contact_name.as_deref(), Some("Bruno"));
        assert_eq!(updated.phone.as_deref(), Some("+55 11 9999"));

        let err = service.update_contact("nope", None, None, None).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "client", .. }));
    }

    #[test]
    fn test_credentials_are_hashed_and_unique() {
        let (_dir, db) = open_db();
        let service = ClientService::new(db);
        let a = service.create(NewClient::new("A")).unwrap();
        let b = service.create(NewClient::new("B")).unwrap();

        service.set_credentials(&a.id, "portal", "s3cret", AccessLevel::Client).unwrap();
        let stored = service.get(&a.id).unwrap();
        assert!(stored.has_system_access());
        assert_ne!(stored.password_hash.as_deref(), Some("s3cret"));

        let err = service
            .set_credentials(&b.id, "portal", "other", AccessLevel::Client)
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolated { .. }));
    }

    #[test]
    fn test_delete_unreferenced_client() {
        let (_dir, db) = open_db();
        let service = ClientService::new(db);
        let acme = service.create(NewClient::new("Acme")).unwrap();
        service.delete(&acme.id).unwrap();
        assert!(service.find(&acme.id).unwrap().is_none());
        assert!(matches!(service.delete(&acme.id), Err(Error::NotFound { .. })));
    }
}
