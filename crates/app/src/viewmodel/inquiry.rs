//! Public seat-inquiry view model
//!
//! A guest types part of a name, gets debounced suggestions, picks one and
//! is shown the table to head for.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use banquet_core::search::{locate_attendee, suggest_attendees};
use banquet_core::{DataChanged, SeatLocation, Snapshot, TableId};
use tokio::sync::{broadcast, mpsc};

use crate::debounce::Debouncer;
use crate::state::SharedService;

use super::drain_changes;

pub const NO_MATCH_MESSAGE: &str = "未找到匹配的预订人姓名，请检查拼写或联系工作人员";

#[derive(Debug, Default)]
struct InquiryState {
    snapshot: Snapshot,
    /// What is in the search box right now
    search_term: String,
    /// The term suggestions were last computed for
    settled_term: String,
    suggestions: Vec<String>,
    found: Option<SeatLocation>,
}

impl InquiryState {
    fn refresh_suggestions(&mut self) {
        if self.settled_term.trim().is_empty() {
            self.suggestions.clear();
            self.found = None;
        } else {
            self.suggestions = suggest_attendees(&self.snapshot.bookings, &self.settled_term);
        }
    }
}

fn lock(state: &Mutex<InquiryState>) -> MutexGuard<'_, InquiryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SeatInquiryView {
    service: SharedService,
    state: Arc<Mutex<InquiryState>>,
    changes: broadcast::Receiver<DataChanged>,
    debouncer: Debouncer,
    suggestion_tx: Option<mpsc::UnboundedSender<Vec<String>>>,
}

impl SeatInquiryView {
    /// Subscribe, reconcile and load
    pub fn mount(service: SharedService, debounce: Duration) -> Self {
        let (snapshot, changes) = service.lock().mount();
        Self {
            service,
            state: Arc::new(Mutex::new(InquiryState {
                snapshot,
                ..Default::default()
            })),
            changes,
            debouncer: Debouncer::new(debounce),
            suggestion_tx: None,
        }
    }

    /// Also push each settled suggestion list to `tx`
    pub fn with_suggestion_sink(mut self, tx: mpsc::UnboundedSender<Vec<String>>) -> Self {
        self.suggestion_tx = Some(tx);
        self
    }

    /// Reload if any change signal arrived since the last call
    pub fn poll_changes(&mut self) -> bool {
        let changed = drain_changes(&mut self.changes);
        if changed {
            self.reload();
        }
        changed
    }

    /// Reload both documents; no reconciliation here
    pub fn reload(&mut self) {
        let snapshot = self.service.lock().load();
        let mut state = lock(&self.state);
        state.snapshot = snapshot;
        state.refresh_suggestions();
    }

    /// Update the search box; suggestions follow after the quiet period
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        lock(&self.state).search_term = term.clone();

        let state = self.state.clone();
        let tx = self.suggestion_tx.clone();
        self.debouncer.schedule(async move {
            let suggestions = {
                let mut state = lock(&state);
                state.settled_term = term;
                state.refresh_suggestions();
                state.suggestions.clone()
            };
            if let Some(tx) = tx {
                let _ = tx.send(suggestions);
            }
        });
    }

    pub fn search_term(&self) -> String {
        lock(&self.state).search_term.clone()
    }

    pub fn suggestions(&self) -> Vec<String> {
        lock(&self.state).suggestions.clone()
    }

    /// Pick a suggested name and look up its table
    ///
    /// `None` if the name no longer has an active booking.
    pub fn select_suggestion(&mut self, name: &str) -> Option<SeatLocation> {
        self.set_search_term(name);

        let mut state = lock(&self.state);
        let found = locate_attendee(&state.snapshot.bookings, name);
        if found.is_none() {
            tracing::debug!(name, "Selected name has no active booking");
        }
        state.found = found.clone();
        found
    }

    pub fn highlighted_table(&self) -> Option<TableId> {
        lock(&self.state).found.as_ref().map(|f| f.table_id.clone())
    }

    /// A term is entered but nothing matches it
    pub fn no_match(&self) -> bool {
        let state = lock(&self.state);
        !state.search_term.trim().is_empty() && state.found.is_none() && state.suggestions.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        lock(&self.state).snapshot.clone()
    }
}
