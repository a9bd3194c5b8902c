//! Availability reconciliation
//!
//! A table is available iff no confirmed or pending booking names it.
//! Availability is always recomputed from scratch over the full booking set.

use std::collections::HashSet;

use crate::models::{Booking, SeatMap, TableId};

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub tables: usize,
    /// Tables left unavailable
    pub occupied: usize,
    /// Tables whose flag flipped in this pass
    pub changed: usize,
    /// Active bookings naming a table that is not in the catalog
    pub dangling: usize,
}

/// Ids of tables named by at least one active booking
pub fn occupied_table_ids(bookings: &[Booking]) -> HashSet<&TableId> {
    bookings
        .iter()
        .filter(|b| b.is_active())
        .map(|b| &b.table_id)
        .collect()
}

/// Recompute every table's `available` flag from the bookings
///
/// Bookings that reference unknown tables are ignored.
pub fn reconcile(seats: &mut SeatMap, bookings: &[Booking]) -> ReconcileReport {
    let occupied = occupied_table_ids(bookings);
    let mut report = ReconcileReport {
        tables: seats.len(),
        ..Default::default()
    };

    for table in seats.tables_mut() {
        let available = !occupied.contains(&table.id);
        if table.available != available {
            report.changed += 1;
        }
        table.available = available;
        if !available {
            report.occupied += 1;
        }
    }

    report.dangling = occupied
        .iter()
        .filter(|id| !seats.contains(id.as_str()))
        .count();

    report
}

/// First active booking on a table, if any
pub fn occupant<'a>(bookings: &'a [Booking], table_id: &str) -> Option<&'a Booking> {
    bookings
        .iter()
        .find(|b| b.is_active() && b.table_id.as_str() == table_id)
}

/// Whether every table's flag agrees with the bookings
pub fn is_consistent(seats: &SeatMap, bookings: &[Booking]) -> bool {
    let occupied = occupied_table_ids(bookings);
    seats
        .tables()
        .all(|t| t.available == !occupied.contains(&t.id))
}
