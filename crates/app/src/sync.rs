//! Watches the storage medium for commits made by other processes
//!
//! SQLite bumps `PRAGMA data_version` only for commits from other
//! connections, so our own writes never trigger a second signal.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::SharedService;

/// Poll the data version and fire the change signal when it moves
pub fn spawn_change_watcher(service: SharedService, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last_seen: Option<u64> = None;

        loop {
            ticker.tick().await;

            let guard = service.lock();
            if !guard.storage().is_attached() {
                debug!("Storage detached, change watcher stopping");
                return;
            }

            match guard.storage().data_version() {
                Ok(version) => {
                    if last_seen.is_some_and(|seen| seen != version) {
                        debug!(version, "External change detected");
                        guard.notifier().notify();
                    }
                    last_seen = Some(version);
                }
                Err(e) => warn!(error = %e, "Failed to read data version"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_core::{Database, DetachedStorage, DocumentKey, DocumentStorage};

    #[tokio::test]
    async fn test_external_write_fires_signal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banquet.db");

        let ours = SharedService::from_storage(Database::open(&path).unwrap());
        let other = Database::open(&path).unwrap();
        let mut rx = ours.lock().subscribe();

        let watcher = spawn_change_watcher(ours.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        other.write(DocumentKey::Bookings, "[]").unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(matches!(signal, Ok(Ok(_))));
        assert!(ours.lock().load_bookings().is_empty());
        watcher.abort();
    }

    #[tokio::test]
    async fn test_own_writes_not_echoed() {
        let service = SharedService::from_storage(Database::open_in_memory().unwrap());
        let watcher = spawn_change_watcher(service.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;

        let mut rx = service.lock().subscribe();
        service.lock().save_bookings(&[]);
        assert!(rx.try_recv().is_ok());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        watcher.abort();
    }

    #[tokio::test]
    async fn test_detached_storage_stops_watcher() {
        let service = SharedService::from_storage(DetachedStorage);
        let watcher = spawn_change_watcher(service, Duration::from_millis(10));
        let finished = tokio::time::timeout(Duration::from_secs(1), watcher).await;
        assert!(finished.is_ok());
    }
}
