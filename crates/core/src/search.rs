//! Name lookup for the public seat inquiry and the admin booking list

use std::collections::BTreeSet;
use std::time::Duration;

use crate::models::{Booking, TableId};

/// Quiet period after the last keystroke before suggestions are computed
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

/// Where a guest is seated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLocation {
    pub table_id: TableId,
    /// Location as recorded on the booking
    pub location: String,
    pub booking_id: String,
    /// Everyone on the same booking, in display order
    pub party: Vec<String>,
}

/// Attendee names containing the query, from active bookings only
///
/// Case-insensitive substring match; deduplicated and sorted. A blank
/// query yields nothing.
pub fn suggest_attendees(bookings: &[Booking], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    bookings
        .iter()
        .filter(|b| b.is_active())
        .flat_map(|b| b.attendees.iter())
        .filter(|name| name.to_lowercase().contains(&needle))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Table of the first active booking listing exactly this name
///
/// `None` when no active booking has the name, e.g. it was cancelled after
/// the suggestion was shown.
pub fn locate_attendee(bookings: &[Booking], name: &str) -> Option<SeatLocation> {
    bookings
        .iter()
        .find(|b| b.is_active() && b.has_attendee(name))
        .map(|b| SeatLocation {
            table_id: b.table_id.clone(),
            location: b.table_location.clone(),
            booking_id: b.id.clone(),
            party: b.attendees.clone(),
        })
}

/// Admin list filter over attendee names, table id and contact info
///
/// Case-insensitive substring match on the raw text; an empty query keeps
/// every booking.
pub fn filter_bookings<'a>(bookings: &'a [Booking], query: &str) -> Vec<&'a Booking> {
    let needle = query.to_lowercase();
    bookings
        .iter()
        .filter(|b| {
            b.attendees
                .iter()
                .any(|name| name.to_lowercase().contains(&needle))
                || b.table_id.as_str().to_lowercase().contains(&needle)
                || b.contact_info.to_lowercase().contains(&needle)
        })
        .collect()
}
