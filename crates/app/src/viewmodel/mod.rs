//! View models for the seat inquiry and admin screens
//!
//! Each view keeps its own copy of both documents, reconciles once when it
//! mounts and reloads whenever the change signal fires.

mod admin;
mod inquiry;

pub use admin::{
    AdminPanel, PendingAction, LOGIN_REQUIRED_MESSAGE, RESET_DONE_MESSAGE, SAVED_MESSAGE,
};
pub use inquiry::{SeatInquiryView, NO_MATCH_MESSAGE};

use banquet_core::DataChanged;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Empty the receiver; true if at least one change arrived
pub(crate) fn drain_changes(rx: &mut broadcast::Receiver<DataChanged>) -> bool {
    let mut changed = false;
    loop {
        match rx.try_recv() {
            Ok(DataChanged) => changed = true,
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "View fell behind change signals");
                changed = true;
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return changed,
        }
    }
}
