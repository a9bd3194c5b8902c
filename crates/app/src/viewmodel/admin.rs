//! Admin panel view model

use std::path::PathBuf;

use banquet_core::auth::LOGIN_FAILED_MESSAGE;
use banquet_core::export::{bookings_to_csv, export_file_name};
use banquet_core::reconcile::reconcile;
use banquet_core::search::filter_bookings;
use banquet_core::stats::seat_overview;
use banquet_core::{
    AdminGate, AuthState, Booking, BookingDraft, BookingEdit, DashboardStats, DataChanged, Error,
    ReconcileReport, Result, SeatOverviewEntry, Snapshot, Table,
};
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::info;

use crate::state::SharedService;

use super::drain_changes;

pub const LOGIN_REQUIRED_MESSAGE: &str = "请先登录";
pub const RESET_PROMPT: &str = "确定要重置所有数据到初始状态吗？这将清除所有更改。";
pub const SAVED_MESSAGE: &str = "数据已保存并同步！";
pub const RESET_DONE_MESSAGE: &str = "数据已重置到初始状态！";

/// A destructive action waiting for the user to confirm it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    DeleteBooking { booking_id: String, prompt: String },
    Reset,
}

impl PendingAction {
    pub fn prompt(&self) -> &str {
        match self {
            PendingAction::DeleteBooking { prompt, .. } => prompt,
            PendingAction::Reset => RESET_PROMPT,
        }
    }
}

pub struct AdminPanel {
    service: SharedService,
    gate: AdminGate,
    auth: AuthState,
    login_error: Option<String>,
    snapshot: Snapshot,
    changes: broadcast::Receiver<DataChanged>,
    filter: String,
    pending: Option<PendingAction>,
    export_dir: PathBuf,
}

impl AdminPanel {
    /// Subscribe, reconcile and load; starts logged out
    pub fn mount(service: SharedService, gate: AdminGate, export_dir: PathBuf) -> Self {
        let (snapshot, changes) = service.lock().mount();
        Self {
            service,
            gate,
            auth: AuthState::default(),
            login_error: None,
            snapshot,
            changes,
            filter: String::new(),
            pending: None,
            export_dir,
        }
    }

    pub fn poll_changes(&mut self) -> bool {
        let changed = drain_changes(&mut self.changes);
        if changed {
            self.reload();
        }
        changed
    }

    pub fn reload(&mut self) {
        self.snapshot = self.service.lock().load();
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        match self.gate.login(&mut self.auth, username, password) {
            Ok(()) => {
                self.login_error = None;
                true
            }
            Err(_) => {
                self.login_error = Some(LOGIN_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.gate.logout(&mut self.auth);
        self.pending = None;
        info!("Admin logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    fn require_login(&self) -> Result<()> {
        if self.auth.is_authenticated {
            Ok(())
        } else {
            Err(Error::Authentication(LOGIN_REQUIRED_MESSAGE.to_string()))
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.filter = query.into();
    }

    /// Bookings matching the current filter, no debounce
    pub fn bookings(&self) -> Vec<&Booking> {
        filter_bookings(&self.snapshot.bookings, &self.filter)
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.snapshot.seats, &self.snapshot.bookings)
    }

    pub fn seat_overview(&self) -> Vec<SeatOverviewEntry<'_>> {
        seat_overview(&self.snapshot.seats, &self.snapshot.bookings)
    }

    /// Keep the local copy's flags in line after an optimistic update
    fn refresh_availability(&mut self) {
        reconcile(&mut self.snapshot.seats, &self.snapshot.bookings);
    }

    pub fn add_booking(&mut self, draft: BookingDraft) -> Result<Booking> {
        self.require_login()?;
        let booking = self.service.lock().add_booking(draft)?;

        self.snapshot.bookings.push(booking.clone());
        self.refresh_availability();
        Ok(booking)
    }

    pub fn edit_booking(&mut self, booking_id: &str, edit: BookingEdit) -> Result<Booking> {
        self.require_login()?;
        let booking = self.service.lock().edit_booking(booking_id, edit)?;

        match self.snapshot.bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(local) => *local = booking.clone(),
            None => self.snapshot.bookings.push(booking.clone()),
        }
        self.refresh_availability();
        Ok(booking)
    }

    /// First step of a delete; returns the prompt to show
    pub fn request_delete(&mut self, booking_id: &str) -> Result<String> {
        self.require_login()?;
        let booking = self
            .snapshot
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| Error::NotFound(format!("booking {}", booking_id)))?;

        let prompt = format!("确定要删除 {} 的预订吗？", booking.attendees.join(", "));
        self.pending = Some(PendingAction::DeleteBooking {
            booking_id: booking_id.to_string(),
            prompt: prompt.clone(),
        });
        Ok(prompt)
    }

    /// First step of a full reset; returns the prompt to show
    pub fn request_reset(&mut self) -> Result<String> {
        self.require_login()?;
        self.pending = Some(PendingAction::Reset);
        Ok(RESET_PROMPT.to_string())
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Apply the pending destructive action
    pub fn confirm_pending(&mut self) -> Result<PendingAction> {
        self.require_login()?;
        let action = self
            .pending
            .take()
            .ok_or_else(|| Error::InvalidOperation("nothing to confirm".to_string()))?;

        match &action {
            PendingAction::DeleteBooking { booking_id, .. } => {
                self.service.lock().delete_booking(booking_id)?;
                self.snapshot.bookings.retain(|b| &b.id != booking_id);
                self.refresh_availability();
            }
            PendingAction::Reset => {
                self.service.lock().reset_to_initial_data()?;
                let (snapshot, changes) = self.service.lock().mount();
                self.snapshot = snapshot;
                self.changes = changes;
            }
        }
        Ok(action)
    }

    /// Change a table's price, capacity, location or sponsor
    pub fn edit_seat(&mut self, table_id: &str, replacement: Table) -> Result<Table> {
        self.require_login()?;
        let table = self.service.lock().edit_table(table_id, replacement)?;
        self.snapshot.seats.insert(table.clone());
        Ok(table)
    }

    /// Force a reconciliation pass and reload
    pub fn save_all(&mut self) -> Result<ReconcileReport> {
        self.require_login()?;
        let report = self.service.lock().reconcile();
        self.reload();
        Ok(report)
    }

    /// Write every booking to a dated CSV file in the export directory
    pub fn export_csv(&self) -> Result<PathBuf> {
        self.require_login()?;
        std::fs::create_dir_all(&self.export_dir)?;

        let path = self
            .export_dir
            .join(export_file_name(Utc::now().date_naive()));
        std::fs::write(&path, bookings_to_csv(&self.snapshot.bookings))?;

        info!(path = %path.display(), rows = self.snapshot.bookings.len(), "Bookings exported");
        Ok(path)
    }
}
