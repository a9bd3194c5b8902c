//! CSV export of the booking list

use chrono::NaiveDate;

use crate::models::Booking;

const HEADERS: [&str; 10] = [
    "预订ID",
    "预订人姓名",
    "联系方式",
    "桌号",
    "人数",
    "桌位类型",
    "位置",
    "预订日期",
    "状态",
    "备注",
];

/// Quote one cell, doubling embedded quotes
pub fn quote_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn booking_row(booking: &Booking) -> [String; 10] {
    [
        booking.id.clone(),
        booking.attendees.join("; "),
        booking.contact_info.clone(),
        booking.table_id.to_string(),
        booking.attendee_count().to_string(),
        booking.table_type.label().to_string(),
        booking.table_location.clone(),
        booking.booking_date.format("%Y-%m-%d").to_string(),
        booking.status.label().to_string(),
        booking.notes.clone().unwrap_or_default(),
    ]
}

/// Render bookings as CSV: a plain header line, then one quoted row each
pub fn bookings_to_csv(bookings: &[Booking]) -> String {
    std::iter::once(HEADERS.join(","))
        .chain(bookings.iter().map(|b| {
            booking_row(b)
                .iter()
                .map(|cell| quote_cell(cell))
                .collect::<Vec<_>>()
                .join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default download name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("预订数据_{}.csv", date.format("%Y-%m-%d"))
}
