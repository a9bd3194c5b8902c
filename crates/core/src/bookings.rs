//! Booking store operations
//!
//! Validation and mutation of the booking sequence. These functions work on
//! in-memory snapshots; persisting and reconciling is the data service's job.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{Booking, BookingStatus, SeatMap, TableId};
use crate::reconcile::occupant;

/// Input for a new booking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub attendees: Vec<String>,
    pub contact_info: String,
    pub table_id: String,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

impl BookingDraft {
    pub fn new(attendees: Vec<String>, contact_info: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            attendees,
            contact_info: contact_info.into(),
            table_id: table_id.into(),
            status: BookingStatus::Confirmed,
            notes: None,
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Replacement values for an existing booking (everything but the id)
#[derive(Debug, Clone, PartialEq)]
pub struct BookingEdit {
    pub table_id: String,
    pub attendees: Vec<String>,
    pub contact_info: String,
    pub booking_date: NaiveDate,
    pub status: BookingStatus,
    pub notes: Option<String>,
}

impl From<&Booking> for BookingEdit {
    fn from(b: &Booking) -> Self {
        Self {
            table_id: b.table_id.to_string(),
            attendees: b.attendees.clone(),
            contact_info: b.contact_info.clone(),
            booking_date: b.booking_date,
            status: b.status,
            notes: b.notes.clone(),
        }
    }
}

/// Split free-text attendee input into names
///
/// Accepts ASCII and full-width commas; blank entries are dropped.
pub fn parse_attendees(input: &str) -> Vec<String> {
    input
        .split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_attendees(attendees: &[String]) -> Vec<String> {
    attendees
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

fn require_fields(attendees: &[String], contact_info: &str, table_id: &str) -> Result<()> {
    if attendees.is_empty() {
        return Err(Error::Validation("请填写预订人姓名".to_string()));
    }
    if contact_info.trim().is_empty() {
        return Err(Error::Validation("请填写联系方式".to_string()));
    }
    if table_id.trim().is_empty() {
        return Err(Error::Validation("请选择桌号".to_string()));
    }
    Ok(())
}

/// Time-based booking id, bumped past any id already in use
pub fn next_booking_id(bookings: &[Booking], now_millis: i64) -> String {
    let mut millis = now_millis;
    loop {
        let id = format!("b{}", millis);
        if !bookings.iter().any(|b| b.id == id) {
            return id;
        }
        millis += 1;
    }
}

/// Validate a draft and build the new booking
///
/// The table must exist and have no active booking. Type and location are
/// copied from the table as it is right now.
pub fn create_booking(
    bookings: &[Booking],
    seats: &SeatMap,
    draft: BookingDraft,
    today: NaiveDate,
    now_millis: i64,
) -> Result<Booking> {
    let attendees = clean_attendees(&draft.attendees);
    let table_id = draft.table_id.trim();
    require_fields(&attendees, &draft.contact_info, table_id)?;

    let table = seats
        .get(table_id)
        .ok_or_else(|| Error::NotFound(format!("请选择一个有效的桌号: {}", table_id)))?;

    if let Some(existing) = occupant(bookings, table_id) {
        return Err(Error::TableUnavailable(format!(
            "{} 已被预订 ({})",
            table_id, existing.id
        )));
    }

    Ok(Booking {
        id: next_booking_id(bookings, now_millis),
        table_id: table.id.clone(),
        attendees,
        contact_info: draft.contact_info.trim().to_string(),
        table_type: table.kind(),
        table_location: table.location.clone(),
        booking_date: today,
        notes: clean_notes(draft.notes.as_deref()),
        status: draft.status,
    })
}

/// Replace the mutable fields of one booking
///
/// Moving a booking to another table re-snapshots type and location from
/// that table; otherwise the original snapshot is kept. An active booking
/// cannot be moved onto (or reactivated on) a table another active booking
/// already holds.
pub fn apply_edit(
    bookings: &mut [Booking],
    seats: &SeatMap,
    booking_id: &str,
    edit: BookingEdit,
) -> Result<Booking> {
    let index = bookings
        .iter()
        .position(|b| b.id == booking_id)
        .ok_or_else(|| Error::NotFound(format!("booking {}", booking_id)))?;

    let attendees = clean_attendees(&edit.attendees);
    let table_id = edit.table_id.trim();
    require_fields(&attendees, &edit.contact_info, table_id)?;

    let table = seats
        .get(table_id)
        .ok_or_else(|| Error::NotFound(format!("请选择一个有效的桌号: {}", table_id)))?;

    if edit.status.is_active() {
        let clash = bookings
            .iter()
            .find(|b| b.id != booking_id && b.is_active() && b.table_id.as_str() == table_id);
        if let Some(other) = clash {
            return Err(Error::TableUnavailable(format!(
                "{} 已被预订 ({})",
                table_id, other.id
            )));
        }
    }

    let booking = &mut bookings[index];
    if booking.table_id.as_str() != table_id {
        booking.table_id = TableId::from(table_id);
        booking.table_type = table.kind();
        booking.table_location = table.location.clone();
    }
    booking.attendees = attendees;
    booking.contact_info = edit.contact_info.trim().to_string();
    booking.booking_date = edit.booking_date;
    booking.status = edit.status;
    booking.notes = clean_notes(edit.notes.as_deref());

    Ok(booking.clone())
}

/// Remove one booking by id
pub fn remove_booking(bookings: &mut Vec<Booking>, booking_id: &str) -> Result<Booking> {
    let index = bookings
        .iter()
        .position(|b| b.id == booking_id)
        .ok_or_else(|| Error::NotFound(format!("booking {}", booking_id)))?;
    Ok(bookings.remove(index))
}
