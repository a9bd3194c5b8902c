//! Seat catalog
//!
//! The fixed 59-table seed (one VVIP table plus 58 regular tables, one of
//! them named "R") and the merge-on-read that heals stored catalogs against
//! missing tables, missing fields and retired table ids.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{Booking, BookingStatus, SeatMap, Table, TableId, TableTier, TableType};

pub const VVIP_ID: &str = "VVIP";
pub const VVIP_PRICE: f64 = 12000.0;
pub const VVIP_CAPACITY: u32 = 12;
pub const VVIP_SPONSOR: &str = "特邀贵宾席";
pub const VVIP_LOCATION: &str = "舞台前方中央";

pub const REGULAR_PRICE: f64 = 2500.0;
pub const REGULAR_CAPACITY: u32 = 10;

pub const SPECIAL_ID: &str = "R";
pub const SPECIAL_LOCATION: &str = "右侧特殊区域";

/// Number of tables in the catalog; it never grows or shrinks at runtime
pub const CATALOG_SIZE: usize = 59;

/// Location zones by inclusive table-number range
const LOCATION_ZONES: &[(u32, u32, &str)] = &[
    (1, 3, "左侧前排"),
    (5, 7, "右侧前排"),
    (8, 10, "左侧中前排"),
    (11, 13, "右侧中前排"),
    (14, 16, "左侧中排"),
    (17, 19, "右侧中排"),
    (20, 22, "左侧中后排"),
    (23, 25, "右侧中后排"),
    (26, 28, "左侧后排"),
    (29, 31, "右侧后排"),
    (32, 34, "左侧更后排"),
    (35, 37, "右侧更后排"),
    (38, 40, "左侧最后排"),
    (41, 43, "右侧最后排"),
    (44, 46, "左侧角落"),
    (47, 48, "右侧角落"),
    (49, 50, "左侧入口附近"),
    (51, 53, "右侧入口附近"),
    (54, 56, "左侧出口附近"),
    (57, 58, "右侧出口附近"),
];

const UNKNOWN_LOCATION: &str = "未知区域";

/// Numbered regular tables on the floor plan (there is no table 4)
pub fn regular_table_numbers() -> impl Iterator<Item = u32> {
    (1..=58).filter(|n| *n != 4)
}

/// Seed location label for a numbered table
pub fn location_for(number: u32) -> &'static str {
    LOCATION_ZONES
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&number))
        .map(|(_, _, label)| *label)
        .unwrap_or(UNKNOWN_LOCATION)
}

fn regular_table(id: TableId, location: &str) -> Table {
    Table {
        id,
        tier: TableTier::Regular,
        price: REGULAR_PRICE,
        capacity: REGULAR_CAPACITY,
        location: location.to_string(),
        available: true,
    }
}

/// The fixed initial catalog, all tables available
pub fn seed_tables() -> SeatMap {
    let vvip = Table {
        id: TableId::from(VVIP_ID),
        tier: TableTier::Vvip {
            sponsor: Some(VVIP_SPONSOR.to_string()),
        },
        price: VVIP_PRICE,
        capacity: VVIP_CAPACITY,
        location: VVIP_LOCATION.to_string(),
        available: true,
    };

    std::iter::once(vvip)
        .chain(
            regular_table_numbers()
                .map(|n| regular_table(TableId::new(format!("T{}", n)), location_for(n))),
        )
        .chain(std::iter::once(regular_table(
            TableId::from(SPECIAL_ID),
            SPECIAL_LOCATION,
        )))
        .collect()
}

fn seed_booking(
    id: &str,
    table_id: &str,
    attendees: &[&str],
    contact_info: &str,
    table_type: TableType,
    table_location: &str,
    date: (i32, u32, u32),
    status: BookingStatus,
    notes: Option<&str>,
) -> Booking {
    Booking {
        id: id.to_string(),
        table_id: TableId::from(table_id),
        attendees: attendees.iter().map(|a| a.to_string()).collect(),
        contact_info: contact_info.to_string(),
        table_type,
        table_location: table_location.to_string(),
        booking_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
        notes: notes.map(str::to_string),
        status,
    }
}

/// The three example bookings used on first run and after a reset
pub fn seed_bookings() -> Vec<Booking> {
    vec![
        seed_booking(
            "b1",
            VVIP_ID,
            &["张伟", "李丽", "王明", "赵芳"],
            "+60 12-345-6789",
            TableType::Vvip,
            VVIP_LOCATION,
            (2024, 12, 20),
            BookingStatus::Confirmed,
            Some("特邀贵宾"),
        ),
        seed_booking(
            "b2",
            "T5",
            &[
                "李娜", "陈刚", "刘红", "周杰", "吴迪", "郑凯", "孙悦", "马力", "高飞", "林静",
            ],
            "+60 16-555-7890",
            TableType::Regular,
            "右侧前排",
            (2024, 12, 21),
            BookingStatus::Confirmed,
            None,
        ),
        seed_booking(
            "b3",
            "T12",
            &["刘强", "杨敏"],
            "+60 17-222-3333",
            TableType::Regular,
            "右侧中前排",
            (2024, 12, 22),
            BookingStatus::Pending,
            None,
        ),
    ]
}

/// Result of merging a stored catalog over the seed
#[derive(Debug, Clone)]
pub struct CatalogMerge {
    pub seats: SeatMap,
    /// Seed tables that were missing (or unreadable) in storage
    pub restored: Vec<TableId>,
    /// Stored table ids that are no longer part of the catalog
    pub dropped: Vec<String>,
    /// Number of individual fields filled in from the seed
    pub backfilled: usize,
}

impl CatalogMerge {
    /// True when the stored catalog needed no healing
    pub fn is_clean(&self) -> bool {
        self.restored.is_empty() && self.dropped.is_empty() && self.backfilled == 0
    }
}

/// Merge a stored catalog document over the seed
///
/// Stored fields win over seed fields; seed tables missing from storage are
/// added back; stored tables not in the seed are dropped.
pub fn merge_stored(stored: &Map<String, Value>) -> CatalogMerge {
    let seed = seed_tables();
    let mut seats = SeatMap::new();
    let mut restored = Vec::new();
    let mut backfilled = 0;

    for table in seed.tables() {
        let id = table.id.as_str();
        let stored_fields = match stored.get(id) {
            Some(Value::Object(fields)) => fields,
            _ => {
                restored.push(table.id.clone());
                seats.insert(table.clone());
                continue;
            }
        };

        let mut merged = match serde_json::to_value(table) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        backfilled += merged
            .keys()
            .filter(|k| !stored_fields.contains_key(k.as_str()))
            .count();
        merged.extend(stored_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.insert("id".to_string(), Value::String(id.to_string()));

        match serde_json::from_value::<Table>(Value::Object(merged)) {
            Ok(merged_table) => {
                seats.insert(merged_table);
            }
            Err(e) => {
                warn!(table_id = id, error = %e, "Stored table unreadable, restoring seed entry");
                restored.push(table.id.clone());
                seats.insert(table.clone());
            }
        }
    }

    let dropped: Vec<String> = stored
        .keys()
        .filter(|k| !seed.contains(k))
        .cloned()
        .collect();

    CatalogMerge {
        seats,
        restored,
        dropped,
        backfilled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_catalog_shape() {
        let seats = seed_tables();
        assert_eq!(seats.len(), CATALOG_SIZE);
        assert!(!seats.contains("T4"));
        assert!(seats.contains("R"));

        let vvip = seats.get(VVIP_ID).unwrap();
        assert_eq!(vvip.price, 12000.0);
        assert_eq!(vvip.capacity, 12);
        assert_eq!(vvip.sponsor(), Some(VVIP_SPONSOR));

        let regular = seats.tables().filter(|t| t.kind() == TableType::Regular).count();
        assert_eq!(regular, 58);
        assert!(seats.tables().all(|t| t.available));
    }

    #[test]
    fn test_seed_catalog_order() {
        let seats = seed_tables();
        let ids: Vec<&str> = seats.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids.first(), Some(&"VVIP"));
        assert_eq!(ids[1], "T1");
        assert_eq!(ids[3], "T3");
        assert_eq!(ids[4], "T5");
        assert_eq!(ids.last(), Some(&"R"));
    }

    #[test]
    fn test_seed_locations() {
        let seats = seed_tables();
        assert_eq!(seats.get("T5").unwrap().location, "右侧前排");
        assert_eq!(seats.get("T12").unwrap().location, "右侧中前排");
        assert_eq!(seats.get("T58").unwrap().location, "右侧出口附近");
        assert_eq!(seats.get("R").unwrap().location, SPECIAL_LOCATION);
        assert_eq!(location_for(4), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_seed_bookings() {
        let bookings = seed_bookings();
        assert_eq!(bookings.len(), 3);
        assert_eq!(bookings[1].table_id.as_str(), "T5");
        assert_eq!(bookings[1].attendees.len(), 10);
        assert_eq!(bookings[2].status, BookingStatus::Pending);
    }

    #[test]
    fn test_merge_restores_missing_table() {
        let mut stored = match serde_json::to_value(seed_tables()).unwrap() {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        stored.remove("T7");

        let merge = merge_stored(&stored);
        assert_eq!(merge.seats.len(), CATALOG_SIZE);
        assert_eq!(merge.restored, vec![TableId::from("T7")]);
        assert_eq!(merge.seats.get("T7").unwrap().price, REGULAR_PRICE);
    }

    #[test]
    fn test_merge_backfills_fields_and_keeps_edits() {
        let stored = json!({
            "T9": { "id": "T9", "type": "regular", "price": 3000, "available": false, "location": "窗边" }
        });
        let merge = merge_stored(stored.as_object().unwrap());

        let t9 = merge.seats.get("T9").unwrap();
        assert_eq!(t9.price, 3000.0);
        assert_eq!(t9.location, "窗边");
        assert_eq!(t9.capacity, REGULAR_CAPACITY);
        assert!(!t9.available);
        assert_eq!(merge.backfilled, 1);
        assert!(!merge.is_clean());
    }

    #[test]
    fn test_merge_drops_retired_tables() {
        let stored = json!({
            "VIP1": { "id": "VIP1", "type": "vip", "price": 8000, "available": true, "location": "x", "capacity": 10 }
        });
        let merge = merge_stored(stored.as_object().unwrap());
        assert!(!merge.seats.contains("VIP1"));
        assert_eq!(merge.dropped, vec!["VIP1".to_string()]);
        assert_eq!(merge.seats.len(), CATALOG_SIZE);
    }

    #[test]
    fn test_merge_unreadable_table_falls_back_to_seed() {
        let stored = json!({ "T3": { "price": "free" } });
        let merge = merge_stored(stored.as_object().unwrap());
        assert_eq!(merge.seats.get("T3").unwrap().price, REGULAR_PRICE);
        assert!(merge.restored.contains(&TableId::from("T3")));
    }

    #[test]
    fn test_merge_of_seed_is_clean() {
        let stored = match serde_json::to_value(seed_tables()).unwrap() {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let merge = merge_stored(&stored);
        assert!(merge.is_clean());
        assert_eq!(merge.seats, seed_tables());
    }
}
