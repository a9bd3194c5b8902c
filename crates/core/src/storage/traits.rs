//! Storage traits
//!
//! The persistence layer only ever reads and writes two whole documents.
//! Anything that can do that (SQLite, an in-process map, nothing at all)
//! can back the data service.

use crate::error::Result;

/// The two persisted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    /// Table id -> table record mapping
    Seats,
    /// Sequence of booking records
    Bookings,
}

impl DocumentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::Seats => "xuan-long-seats",
            DocumentKey::Bookings => "xuan-long-bookings",
        }
    }
}

/// Full-snapshot document storage
pub trait DocumentStorage: Send {
    /// Read a whole document, `None` if it was never written
    fn read(&self, key: DocumentKey) -> Result<Option<String>>;

    /// Replace a whole document
    fn write(&self, key: DocumentKey, value: &str) -> Result<()>;

    /// Counter that changes when another writer commits to the same medium
    ///
    /// Media that cannot be shared report a constant.
    fn data_version(&self) -> Result<u64> {
        Ok(0)
    }

    /// Whether writes actually persist anywhere
    fn is_attached(&self) -> bool {
        true
    }
}

impl<T: DocumentStorage + ?Sized> DocumentStorage for Box<T> {
    fn read(&self, key: DocumentKey) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: DocumentKey, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn data_version(&self) -> Result<u64> {
        (**self).data_version()
    }

    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }
}
