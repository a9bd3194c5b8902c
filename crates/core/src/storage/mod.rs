//! Storage layer for the banquet seating data
//!
//! Two JSON documents (seats and bookings) kept as whole snapshots in an
//! embedded SQLite file, plus in-process and detached stand-ins.

mod documents;
mod memory;
mod migrations;
mod traits;

use std::path::Path;

use rusqlite::Connection;
use tracing::instrument;

use crate::error::Result;

pub use documents::DocumentStore;
pub use memory::{DetachedStorage, MemoryStorage};
pub use traits::{DocumentKey, DocumentStorage};

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Readers in other processes keep working while one writes
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.busy_timeout(std::time::Duration::from_secs(2))?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get document store
    pub fn documents(&self) -> DocumentStore<'_> {
        DocumentStore::new(&self.conn)
    }
}

impl DocumentStorage for Database {
    fn read(&self, key: DocumentKey) -> Result<Option<String>> {
        self.documents().get(key)
    }

    fn write(&self, key: DocumentKey, value: &str) -> Result<()> {
        self.documents().put(key, value)
    }

    fn data_version(&self) -> Result<u64> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_schema_version() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version(), migrations::latest_version());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banquet.db");

        {
            let db = Database::open(&path).unwrap();
            db.write(DocumentKey::Bookings, "[]").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.read(DocumentKey::Bookings).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_data_version_tracks_other_connections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banquet.db");

        let watcher = Database::open(&path).unwrap();
        let writer = Database::open(&path).unwrap();

        let before = watcher.data_version().unwrap();
        watcher.write(DocumentKey::Seats, "{}").unwrap();
        assert_eq!(watcher.data_version().unwrap(), before);

        writer.write(DocumentKey::Seats, "{\"a\":1}").unwrap();
        assert_ne!(watcher.data_version().unwrap(), before);
    }
}
