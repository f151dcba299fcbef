//! Comments.

use super::{fetch_fresh, not_found};
use crate::Result;
use crate::models::{Comment, NewComment, new_id, now_iso};
use crate::sql_params;
use crate::storage::{Database, Statement};
use std::sync::Arc;

const SELECT_COMMENT: &str =
    "SELECT id, item_id, item_type, author, text, created_at FROM comments";

/// Service for comments on any item.
pub struct CommentService {
    db: Arc<Database>,
}

impl CommentService {
    /// Creates a service over `db`.
    #[must_use]
    pub const fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Adds a comment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] for blank fields, or a storage error.
    pub fn add(&self, request: NewComment) -> Result<Comment> {
        request.validate()?;
        let id = new_id();
        self.db.write(
            "INSERT INTO comments (id, item_id, item_type, author, text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            &sql_params![
                id.as_str(),
                request.item_id.as_str(),
                request.item_type.as_str(),
                request.author.trim(),
                request.text,
                now_iso()
            ],
        )?;
        fetch_fresh(&self.db, &format!("{SELECT_COMMENT} WHERE id = ?1"), "comment", &id)
    }

    /// Lists the comments of an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list_for_item(&self, item_type: &str, item_id: &str) -> Result<Vec<Comment>> {
        self.db.read_as(
            &format!(
                "{SELECT_COMMENT} WHERE item_type = ?1 AND item_id = ?2 ORDER BY created_at, rowid"
            ),
            &sql_params![item_type, item_id],
        )
    }

    /// Deletes one comment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent, or a storage error.
    pub fn delete(&self, id: &str) -> Result<()> {
        if self
            .db
            .write("DELETE FROM comments WHERE id = ?1", &sql_params![id])?
        {
            Ok(())
        } else {
            Err(not_found("comment", id))
        }
    }

    /// Deletes every comment of an item, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn delete_for_item(&self, item_type: &str, item_id: &str) -> Result<usize> {
        let removed = self.db.write_batch(&[Statement::new(
            "DELETE FROM comments WHERE item_type = ?1 AND item_id = ?2",
            sql_params![item_type, item_id],
        )])?;
        tracing::debug!(item_type, item_id, removed, "Comments removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{EventService, NewEvent};

    #[test]
    fn test_comments_survive_parent_until_purged() {
        let (_dir, db) = crate::services::test_support::open_db();
        let events = EventService::new(Arc::clone(&db));
        let comments = CommentService::new(db);
        let gala = events.create(NewEvent::new("Gala", "2025-06-01")).unwrap();

        comments.add(NewComment::new("event", &gala.id, "Ana", "first")).unwrap();
        let second = comments.add(NewComment::new("event", &gala.id, "Bia", "second")).unwrap();
        comments.add(NewComment::new("deliverable", &gala.id, "Ana", "elsewhere")).unwrap();

        let texts: Vec<String> = comments
            .list_for_item("event", &gala.id)
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, ["first", "second"]);

        events.delete(&gala.id).unwrap();
        comments.delete(&second.id).unwrap();
        assert_eq!(comments.list_for_item("event", &gala.id).unwrap().len(), 1);

        assert_eq!(comments.delete_for_item("event", &gala.id).unwrap(), 1);
        assert!(comments.list_for_item("event", &gala.id).unwrap().is_empty());
        assert_eq!(comments.list_for_item("deliverable", &gala.id).unwrap().len(), 1);
    }
}
