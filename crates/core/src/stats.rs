//! Admin dashboard figures and the seat overview

use crate::models::{Booking, BookingStatus, SeatMap, Table, TableType};
use crate::reconcile::occupant;

/// Headline numbers for the admin panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub confirmed: usize,
    pub pending: usize,
    pub total_tables: usize,
    pub available_tables: usize,
    pub booked_tables: usize,
    /// Current table price summed over confirmed bookings
    pub revenue: f64,
}

impl DashboardStats {
    pub fn compute(seats: &SeatMap, bookings: &[Booking]) -> Self {
        let count = |status| bookings.iter().filter(|b| b.status == status).count();
        let available_tables = seats.available().count();

        let revenue = bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .filter_map(|b| seats.get(b.table_id.as_str()))
            .map(|t| t.price)
            .sum();

        Self {
            confirmed: count(BookingStatus::Confirmed),
            pending: count(BookingStatus::Pending),
            total_tables: seats.len(),
            available_tables,
            booked_tables: seats.len() - available_tables,
            revenue,
        }
    }
}

/// One table in the overview with whoever holds it
#[derive(Debug, Clone)]
pub struct SeatOverviewEntry<'a> {
    pub table: &'a Table,
    pub occupant: Option<&'a Booking>,
}

/// Overview grouped by area: VVIP first, then the rest, each in floor order
pub fn seat_overview<'a>(seats: &'a SeatMap, bookings: &'a [Booking]) -> Vec<SeatOverviewEntry<'a>> {
    let entry = |table: &'a Table| SeatOverviewEntry {
        table,
        occupant: occupant(bookings, table.id.as_str()),
    };

    let vvip = seats.tables().filter(|t| t.kind() == TableType::Vvip);
    let rest = seats.tables().filter(|t| t.kind() != TableType::Vvip);
    vvip.chain(rest).map(entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{seed_bookings, seed_tables};
    use crate::reconcile::reconcile;

    #[test]
    fn test_dashboard_for_seed() {
        let mut seats = seed_tables();
        let bookings = seed_bookings();
        reconcile(&mut seats, &bookings);

        let stats = DashboardStats::compute(&seats, &bookings);
        assert_eq!(stats.confirmed, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_tables, 59);
        assert_eq!(stats.available_tables, 56);
        assert_eq!(stats.booked_tables, 3);
        assert_eq!(stats.revenue, 12000.0 + 2500.0);
    }

    #[test]
    fn test_revenue_uses_current_price() {
        let mut seats = seed_tables();
        let bookings = seed_bookings();
        seats.get_mut("T5").unwrap().price = 3000.0;

        let stats = DashboardStats::compute(&seats, &bookings);
        assert_eq!(stats.revenue, 12000.0 + 3000.0);
    }

    #[test]
    fn test_overview_vvip_first_with_occupants() {
        let seats = seed_tables();
        let bookings = seed_bookings();

        let overview = seat_overview(&seats, &bookings);
        assert_eq!(overview.len(), 59);
        assert_eq!(overview[0].table.id.as_str(), "VVIP");
        assert_eq!(overview[0].occupant.map(|b| b.id.as_str()), Some("b1"));

        let t5 = overview.iter().find(|e| e.table.id.as_str() == "T5").unwrap();
        assert_eq!(t5.occupant.map(|b| b.id.as_str()), Some("b2"));
        assert!(overview[1].occupant.is_none());
    }
}
