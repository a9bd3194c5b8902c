//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::catalog::CATALOG_SIZE;
use crate::models::{Booking, SeatMap};
use crate::reconcile::is_consistent;

/// The catalog always holds the fixed table set, keyed by each table's own id
pub fn assert_catalog_invariants(seats: &SeatMap) {
    debug_assert_eq!(
        seats.len(),
        CATALOG_SIZE,
        "Catalog has {} tables, expected {}",
        seats.len(),
        CATALOG_SIZE
    );

    for table in seats.tables() {
        debug_assert!(
            table.capacity > 0,
            "Table {} has zero capacity",
            table.id
        );
        debug_assert!(
            table.price.is_finite() && table.price >= 0.0,
            "Table {} has invalid price {}",
            table.id,
            table.price
        );
    }
}

/// After reconciliation every flag matches the active bookings
pub fn assert_availability_invariants(seats: &SeatMap, bookings: &[Booking]) {
    debug_assert!(
        is_consistent(seats, bookings),
        "Table availability disagrees with active bookings"
    );
}

/// Booking ids are unique
pub fn assert_booking_invariants(bookings: &[Booking]) {
    for (i, booking) in bookings.iter().enumerate() {
        debug_assert!(
            !bookings[..i].iter().any(|b| b.id == booking.id),
            "Duplicate booking id {}",
            booking.id
        );
    }
}
