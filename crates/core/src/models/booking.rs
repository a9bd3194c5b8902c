//! Booking model - a reservation of one table by one or more attendees

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::{TableId, TableType};

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    /// Confirmed and pending bookings occupy their table
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Localized label used in listings and exports
    pub fn label(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "已确认",
            BookingStatus::Pending => "待确认",
            BookingStatus::Cancelled => "已取消",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "pending" => Some(Self::Pending),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// A reservation of one table
///
/// `table_type` and `table_location` are snapshots taken when the booking
/// was made; later edits to the table do not flow back into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BookingRecord")]
pub struct Booking {
    pub id: String,
    pub table_id: TableId,
    /// Display order only; duplicates allowed
    pub attendees: Vec<String>,
    pub contact_info: String,
    pub table_type: TableType,
    pub table_location: String,
    pub booking_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Exact attendee name match
    pub fn has_attendee(&self, name: &str) -> bool {
        self.attendees.iter().any(|a| a == name)
    }

    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }
}

/// Stored shape of a booking, tolerant of older documents
///
/// Early documents carried a single `name` instead of `attendees`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingRecord {
    id: String,
    table_id: TableId,
    #[serde(default)]
    attendees: Option<Vec<String>>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    contact_info: String,
    #[serde(default)]
    table_type: TableType,
    #[serde(default)]
    table_location: String,
    #[serde(deserialize_with = "booking_date")]
    booking_date: NaiveDate,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    status: BookingStatus,
}

/// Plain dates, or full timestamps written by other tools
fn booking_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let text = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|dt| dt.date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid booking date {}", text)))
}

impl From<BookingRecord> for Booking {
    fn from(r: BookingRecord) -> Self {
        let attendees = match (r.attendees, r.name) {
            (Some(attendees), _) => attendees,
            (None, Some(name)) if !name.is_empty() => vec![name],
            _ => Vec::new(),
        };

        Self {
            id: r.id,
            table_id: r.table_id,
            attendees,
            contact_info: r.contact_info,
            table_type: r.table_type,
            table_location: r.table_location,
            booking_date: r.booking_date,
            notes: r.notes,
            status: r.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_name_becomes_attendee() {
        let json = r#"{
            "id": "b9",
            "tableId": "T7",
            "name": "王小明",
            "contactInfo": "+60 11-111-1111",
            "tableType": "regular",
            "tableLocation": "右侧前排",
            "bookingDate": "2024-12-20",
            "status": "pending"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.attendees, vec!["王小明".to_string()]);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.notes, None);
    }

    #[test]
    fn test_missing_attendees_and_name_is_empty_list() {
        let json = r#"{"id": "b9", "tableId": "T7", "bookingDate": "2024-12-20"}"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert!(booking.attendees.is_empty());
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.table_type, TableType::Regular);
    }

    #[test]
    fn test_attendees_take_precedence_over_name() {
        let json = r#"{"id": "b9", "tableId": "T7", "bookingDate": "2024-12-20",
            "attendees": ["甲", "乙"], "name": "丙"}"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.attendees, vec!["甲".to_string(), "乙".to_string()]);
    }

    #[test]
    fn test_timestamp_date_keeps_calendar_day() {
        let json = r#"{"id": "b9", "tableId": "T7", "bookingDate": "2024-12-25T10:00:00.000Z"}"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.booking_date, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());

        let bad = r#"{"id": "b9", "tableId": "T7", "bookingDate": "Christmas"}"#;
        assert!(serde_json::from_str::<Booking>(bad).is_err());
    }

    #[test]
    fn test_stored_field_names() {
        let booking = Booking {
            id: "b1".to_string(),
            table_id: TableId::from("VVIP"),
            attendees: vec!["张伟".to_string()],
            contact_info: "+60 12-345-6789".to_string(),
            table_type: TableType::Vvip,
            table_location: "舞台前方中央".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            notes: None,
            status: BookingStatus::Confirmed,
        };
        let value = serde_json::to_value(&booking).unwrap();
        assert_eq!(value["tableId"], "VVIP");
        assert_eq!(value["bookingDate"], "2024-12-20");
        assert_eq!(value["status"], "confirmed");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_status_activity() {
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::Pending.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert_eq!(BookingStatus::from_str("Canceled"), Some(BookingStatus::Cancelled));
    }
}
