//! Non-SQLite storage backends

use std::collections::HashMap;
use std::sync::Mutex;

use super::traits::{DocumentKey, DocumentStorage};
use crate::error::{Error, Result};

/// In-process document storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<DocumentKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStorage for MemoryStorage {
    fn read(&self, key: DocumentKey) -> Result<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| Error::InvalidOperation("memory storage poisoned".to_string()))?;
        Ok(documents.get(&key).cloned())
    }

    fn write(&self, key: DocumentKey, value: &str) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| Error::InvalidOperation("memory storage poisoned".to_string()))?;
        documents.insert(key, value.to_string());
        Ok(())
    }
}

/// No storage medium at all
///
/// Reads find nothing, so every load yields seed data; writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStorage;

impl DocumentStorage for DetachedStorage {
    fn read(&self, _key: DocumentKey) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&self, _key: DocumentKey, _value: &str) -> Result<()> {
        Ok(())
    }

    fn is_attached(&self) -> bool {
        false
    }
}
