//! Document storage operations on SQLite

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::instrument;

use super::traits::DocumentKey;
use crate::error::Result;

/// Key/value document table access
pub struct DocumentStore<'a> {
    conn: &'a Connection,
}

impl<'a> DocumentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load a document's JSON text
    #[instrument(skip(self), fields(key = key.as_str()))]
    pub fn get(&self, key: DocumentKey) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM documents WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a document's JSON text
    #[instrument(skip(self, value), fields(key = key.as_str(), bytes = value.len()))]
    pub fn put(&self, key: DocumentKey, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO documents (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key.as_str(), value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_put_get() {
        let db = Database::open_in_memory().unwrap();
        let store = db.documents();

        assert!(store.get(DocumentKey::Seats).unwrap().is_none());
        store.put(DocumentKey::Seats, "{}").unwrap();
        assert_eq!(store.get(DocumentKey::Seats).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_put_replaces_whole_document() {
        let db = Database::open_in_memory().unwrap();
        let store = db.documents();

        store.put(DocumentKey::Bookings, "[1]").unwrap();
        store.put(DocumentKey::Bookings, "[2,3]").unwrap();
        assert_eq!(
            store.get(DocumentKey::Bookings).unwrap().as_deref(),
            Some("[2,3]")
        );
        assert!(store.get(DocumentKey::Seats).unwrap().is_none());
    }
}
