//! Application state management

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use banquet_core::{
    AdminGate, AppConfig, DataService, Database, DetachedStorage, DocumentStorage, Result,
};

/// Data service over whichever storage medium could be opened
pub type Service = DataService<Box<dyn DocumentStorage>>;

/// Service handle shared by every view and background task
#[derive(Clone)]
pub struct SharedService(Arc<Mutex<Service>>);

impl SharedService {
    pub fn new(service: Service) -> Self {
        Self(Arc::new(Mutex::new(service)))
    }

    pub fn from_storage(storage: impl DocumentStorage + 'static) -> Self {
        let storage: Box<dyn DocumentStorage> = Box::new(storage);
        Self::new(DataService::new(storage))
    }

    /// Lock the service; a panicked holder leaves the documents intact
    pub fn lock(&self) -> MutexGuard<'_, Service> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Main application state
pub struct AppState {
    pub service: SharedService,
    pub gate: AdminGate,
    pub config: AppConfig,
}

impl AppState {
    /// Open the configured database, or run detached on seed data if it cannot be opened
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage: Box<dyn DocumentStorage> = match Self::open_database(&config) {
            Ok(db) => Box::new(db),
            Err(e) => {
                tracing::error!(error = %e, "Storage unavailable, changes will not be kept");
                Box::new(DetachedStorage)
            }
        };
        Self::with_storage(storage, config)
    }

    pub fn with_storage(storage: Box<dyn DocumentStorage>, config: AppConfig) -> Result<Self> {
        let gate = config.admin_gate()?;
        Ok(Self {
            service: SharedService::new(DataService::new(storage)),
            gate,
            config,
        })
    }

    fn open_database(config: &AppConfig) -> Result<Database> {
        let db_path = config.database_path()?;

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %db_path.display(), "Opening database");
        Database::open(&db_path)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.config.export_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_core::MemoryStorage;

    #[test]
    fn test_opens_configured_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(dir.path().join("nested"));

        let state = AppState::new(config).unwrap();
        assert!(state.service.lock().storage().is_attached());
        assert_eq!(state.service.lock().load_bookings().len(), 3);
        assert!(dir.path().join("nested").join("banquet.db").exists());
    }

    #[test]
    fn test_unopenable_database_runs_detached() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let mut config = AppConfig::default();
        config.storage.data_dir = Some(blocker);

        let state = AppState::new(config).unwrap();
        assert!(!state.service.lock().storage().is_attached());
        assert_eq!(state.service.lock().load_seats().len(), 59);
    }

    #[test]
    fn test_with_storage_uses_admin_config() {
        let config = AppConfig::from_toml("[admin]\nusername = \"host\"\npassword = \"gala\"\n").unwrap();
        let state = AppState::with_storage(Box::new(MemoryStorage::new()), config).unwrap();
        assert!(state.gate.verify("host", "gala"));
    }
}
