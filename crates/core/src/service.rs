//! Data service
//!
//! Loads and saves the seat and booking documents as whole snapshots,
//! fires the change signal after every successful write, and runs the
//! availability reconciliation after every booking mutation.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

use crate::bookings::{apply_edit, create_booking, remove_booking, BookingDraft, BookingEdit};
use crate::catalog::{merge_stored, seed_bookings, seed_tables};
use crate::error::{Error, Result};
use crate::invariants;
use crate::models::{Booking, SeatMap, Table};
use crate::notify::{ChangeNotifier, DataChanged};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::storage::{DocumentKey, DocumentStorage};

/// Both documents as read at one moment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub seats: SeatMap,
    pub bookings: Vec<Booking>,
}

/// Single owner of the persisted seat and booking documents
pub struct DataService<S> {
    storage: S,
    notifier: ChangeNotifier,
}

impl<S: DocumentStorage> DataService<S> {
    pub fn new(storage: S) -> Self {
        Self::with_notifier(storage, ChangeNotifier::new())
    }

    /// Share an existing change signal, e.g. with a watcher of other processes
    pub fn with_notifier(storage: S, notifier: ChangeNotifier) -> Self {
        Self { storage, notifier }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataChanged> {
        self.notifier.subscribe()
    }

    /// Write a seed document on first use; not a user change, so no signal
    fn write_seed<T: Serialize>(&self, key: DocumentKey, value: T) -> T {
        let written = serde_json::to_string(&value)
            .map_err(Error::from)
            .and_then(|json| self.storage.write(key, &json));
        match written {
            Ok(()) => info!(key = key.as_str(), "Seeded document"),
            Err(e) => error!(key = key.as_str(), error = %e, "Failed to write seed document"),
        }
        value
    }

    /// Load the table catalog, healing it against the seed
    #[instrument(skip(self))]
    pub fn load_seats(&self) -> SeatMap {
        let stored = match self.storage.read(DocumentKey::Seats) {
            Ok(Some(text)) => text,
            Ok(None) => return self.write_seed(DocumentKey::Seats, seed_tables()),
            Err(e) => {
                error!(error = %e, "Failed to read seats, using seed");
                return seed_tables();
            }
        };

        match serde_json::from_str::<Value>(&stored) {
            Ok(Value::Object(map)) => {
                let merge = merge_stored(&map);
                if !merge.is_clean() {
                    warn!(
                        restored = ?merge.restored,
                        dropped = ?merge.dropped,
                        backfilled = merge.backfilled,
                        "Stored catalog healed"
                    );
                }
                merge.seats
            }
            Ok(_) => {
                warn!("Stored seats are not a mapping, reseeding");
                self.write_seed(DocumentKey::Seats, seed_tables())
            }
            Err(e) => {
                warn!(error = %e, "Stored seats unreadable, reseeding");
                self.write_seed(DocumentKey::Seats, seed_tables())
            }
        }
    }

    /// Load the booking list, upgrading legacy single-name records
    #[instrument(skip(self))]
    pub fn load_bookings(&self) -> Vec<Booking> {
        let stored = match self.storage.read(DocumentKey::Bookings) {
            Ok(Some(text)) => text,
            Ok(None) => return self.write_seed(DocumentKey::Bookings, seed_bookings()),
            Err(e) => {
                error!(error = %e, "Failed to read bookings, using seed");
                return seed_bookings();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&stored) {
            Ok(records) => records.into_iter().filter_map(read_booking).collect(),
            Err(e) => {
                warn!(error = %e, "Stored bookings unreadable, reseeding");
                self.write_seed(DocumentKey::Bookings, seed_bookings())
            }
        }
    }

    pub fn load(&self) -> Snapshot {
        Snapshot {
            seats: self.load_seats(),
            bookings: self.load_bookings(),
        }
    }

    /// Persist the catalog and signal; errors are returned
    pub fn try_save_seats(&self, seats: &SeatMap) -> Result<()> {
        let json = serde_json::to_string(seats)?;
        self.storage.write(DocumentKey::Seats, &json)?;
        self.notifier.notify();
        Ok(())
    }

    /// Persist the booking list and signal; errors are returned
    pub fn try_save_bookings(&self, bookings: &[Booking]) -> Result<()> {
        let json = serde_json::to_string(bookings)?;
        self.storage.write(DocumentKey::Bookings, &json)?;
        self.notifier.notify();
        Ok(())
    }

    /// Persist the catalog; a failure is logged and swallowed
    pub fn save_seats(&self, seats: &SeatMap) {
        if let Err(e) = self.try_save_seats(seats) {
            error!(error = %e, "Failed to save seats");
        }
    }

    /// Persist the booking list; a failure is logged and swallowed
    pub fn save_bookings(&self, bookings: &[Booking]) {
        if let Err(e) = self.try_save_bookings(bookings) {
            error!(error = %e, "Failed to save bookings");
        }
    }

    /// Recompute availability from the stored bookings and save the catalog
    #[instrument(skip(self))]
    pub fn reconcile(&self) -> ReconcileReport {
        let mut seats = self.load_seats();
        let bookings = self.load_bookings();

        let report = reconcile(&mut seats, &bookings);
        invariants::assert_availability_invariants(&seats, &bookings);
        if report.dangling > 0 {
            debug!(dangling = report.dangling, "Bookings reference unknown tables");
        }
        debug!(?report, "Availability reconciled");

        self.save_seats(&seats);
        report
    }

    /// What a view does when it mounts: subscribe, repair, then read
    pub fn mount(&self) -> (Snapshot, broadcast::Receiver<DataChanged>) {
        let rx = self.subscribe();
        self.reconcile();
        (self.load(), rx)
    }

    /// Validate and store a new booking, then reconcile
    #[instrument(skip(self, draft), fields(table_id = %draft.table_id))]
    pub fn add_booking(&self, draft: BookingDraft) -> Result<Booking> {
        let mut bookings = self.load_bookings();
        let seats = self.load_seats();
        let now = Utc::now();

        let booking = create_booking(
            &bookings,
            &seats,
            draft,
            now.date_naive(),
            now.timestamp_millis(),
        )?;
        bookings.push(booking.clone());
        invariants::assert_booking_invariants(&bookings);

        self.save_bookings(&bookings);
        self.reconcile();
        info!(booking_id = %booking.id, table_id = %booking.table_id, "Booking added");
        Ok(booking)
    }

    /// Replace one booking's mutable fields, then reconcile
    #[instrument(skip(self, edit))]
    pub fn edit_booking(&self, booking_id: &str, edit: BookingEdit) -> Result<Booking> {
        let mut bookings = self.load_bookings();
        let seats = self.load_seats();

        let booking = apply_edit(&mut bookings, &seats, booking_id, edit)?;

        self.save_bookings(&bookings);
        self.reconcile();
        info!(booking_id, status = booking.status.as_str(), "Booking updated");
        Ok(booking)
    }

    /// Remove one booking, then reconcile
    ///
    /// Callers are expected to have confirmed with the user first.
    #[instrument(skip(self))]
    pub fn delete_booking(&self, booking_id: &str) -> Result<Booking> {
        let mut bookings = self.load_bookings();
        let removed = remove_booking(&mut bookings, booking_id)?;

        self.save_bookings(&bookings);
        self.reconcile();
        info!(booking_id, table_id = %removed.table_id, "Booking deleted");
        Ok(removed)
    }

    /// Overwrite one table's editable fields
    ///
    /// The tier cannot change and availability stays derived.
    #[instrument(skip(self, replacement))]
    pub fn edit_table(&self, table_id: &str, replacement: Table) -> Result<Table> {
        let mut seats = self.load_seats();
        let existing = seats
            .get(table_id)
            .ok_or_else(|| Error::NotFound(format!("table {}", table_id)))?;

        if replacement.kind() != existing.kind() {
            return Err(Error::InvalidOperation(format!(
                "table {} is {}, its type cannot change",
                table_id,
                existing.kind().as_str()
            )));
        }
        if !replacement.price.is_finite() || replacement.price < 0.0 {
            return Err(Error::Validation(format!(
                "price must be a non-negative number, got {}",
                replacement.price
            )));
        }
        if replacement.capacity == 0 {
            return Err(Error::Validation("capacity must be at least 1".to_string()));
        }

        let updated = Table {
            id: existing.id.clone(),
            available: existing.available,
            ..replacement
        };
        seats.insert(updated.clone());
        invariants::assert_catalog_invariants(&seats);

        self.save_seats(&seats);
        info!(table_id, price = updated.price, capacity = updated.capacity, "Table updated");
        Ok(updated)
    }

    /// Discard everything and write both seeds back
    ///
    /// Irreversible; callers confirm with the user first.
    #[instrument(skip(self))]
    pub fn reset_to_initial_data(&self) -> Result<()> {
        let bookings = seed_bookings();
        let mut seats = seed_tables();
        reconcile(&mut seats, &bookings);

        let seats_json = serde_json::to_string(&seats)?;
        let bookings_json = serde_json::to_string(&bookings)?;
        self.storage.write(DocumentKey::Seats, &seats_json)?;
        self.storage.write(DocumentKey::Bookings, &bookings_json)?;
        self.notifier.notify();

        info!("Data reset to initial state");
        Ok(())
    }
}

/// One stored booking; an unreadable record is skipped, not the whole list
fn read_booking(record: Value) -> Option<Booking> {
    let id = record.get("id").and_then(Value::as_str).map(str::to_string);
    match serde_json::from_value(record) {
        Ok(booking) => Some(booking),
        Err(e) => {
            warn!(id = id.as_deref().unwrap_or("?"), error = %e, "Skipping unreadable booking");
            None
        }
    }
}
