//! Table model - the fixed-identity seat unit at the banquet

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Table identifier, e.g. "VVIP", "T5" or "R"
///
/// Ordering follows the floor plan: VVIP first, numbered tables by number,
/// then "R", then anything else lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table number for "T<n>" identifiers
    pub fn number(&self) -> Option<u32> {
        self.0.strip_prefix('T').and_then(|n| n.parse().ok())
    }

    fn rank(&self) -> (u8, u32) {
        if self.0 == "VVIP" {
            (0, 0)
        } else if let Some(n) = self.number() {
            (1, n)
        } else if self.0 == "R" {
            (2, 0)
        } else {
            (3, 0)
        }
    }
}

impl Ord for TableId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TableId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Table category as stored and as snapshotted into bookings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    Vvip,
    Vip,
    #[default]
    Regular,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Vvip => "vvip",
            TableType::Vip => "vip",
            TableType::Regular => "regular",
        }
    }

    /// Localized label used in listings and exports
    pub fn label(&self) -> &'static str {
        match self {
            TableType::Vvip => "VVIP",
            TableType::Vip => "VIP",
            TableType::Regular => "普通",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vvip" => Some(Self::Vvip),
            "vip" => Some(Self::Vip),
            "regular" => Some(Self::Regular),
            _ => None,
        }
    }
}

/// Table tier with the data only some tiers carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableTier {
    Vvip { sponsor: Option<String> },
    Vip { sponsor: Option<String> },
    Regular,
}

impl TableTier {
    /// Build a tier; a sponsor given for a regular table is discarded
    pub fn new(kind: TableType, sponsor: Option<String>) -> Self {
        match kind {
            TableType::Vvip => TableTier::Vvip { sponsor },
            TableType::Vip => TableTier::Vip { sponsor },
            TableType::Regular => TableTier::Regular,
        }
    }

    pub fn kind(&self) -> TableType {
        match self {
            TableTier::Vvip { .. } => TableType::Vvip,
            TableTier::Vip { .. } => TableType::Vip,
            TableTier::Regular => TableType::Regular,
        }
    }

    pub fn sponsor(&self) -> Option<&str> {
        match self {
            TableTier::Vvip { sponsor } | TableTier::Vip { sponsor } => sponsor.as_deref(),
            TableTier::Regular => None,
        }
    }
}

/// A seat record in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRecord", into = "TableRecord")]
pub struct Table {
    pub id: TableId,
    pub tier: TableTier,
    /// Price per table in currency units (RM)
    pub price: f64,
    /// Seats at this table
    pub capacity: u32,
    pub location: String,
    /// Derived from bookings; never authoritative on its own
    pub available: bool,
}

impl Table {
    pub fn kind(&self) -> TableType {
        self.tier.kind()
    }

    pub fn sponsor(&self) -> Option<&str> {
        self.tier.sponsor()
    }
}

/// Flat stored shape of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TableRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub price: f64,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    pub location: String,
    pub capacity: u32,
}

impl From<TableRecord> for Table {
    fn from(r: TableRecord) -> Self {
        Self {
            id: TableId(r.id),
            tier: TableTier::new(r.table_type, r.sponsor),
            price: r.price,
            capacity: r.capacity,
            location: r.location,
            available: r.available,
        }
    }
}

impl From<Table> for TableRecord {
    fn from(t: Table) -> Self {
        let table_type = t.tier.kind();
        let sponsor = match t.tier {
            TableTier::Vvip { sponsor } | TableTier::Vip { sponsor } => sponsor,
            TableTier::Regular => None,
        };
        Self {
            id: t.id.0,
            table_type,
            price: t.price,
            available: t.available,
            sponsor,
            location: t.location,
            capacity: t.capacity,
        }
    }
}

/// The full table catalog keyed by table id, in floor-plan order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatMap(BTreeMap<TableId, Table>);

impl SeatMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, id: &str) -> Option<&Table> {
        self.0.get(&TableId::from(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Table> {
        self.0.get_mut(&TableId::from(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(&TableId::from(id))
    }

    /// Insert a table under its own id
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.0.insert(table.id.clone(), table)
    }

    pub fn remove(&mut self, id: &str) -> Option<Table> {
        self.0.remove(&TableId::from(id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &TableId> {
        self.0.keys()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.0.values()
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.0.values_mut()
    }

    /// Tables that currently have no active booking
    pub fn available(&self) -> impl Iterator<Item = &Table> {
        self.0.values().filter(|t| t.available)
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.get(id).map_or(false, |t| t.available)
    }
}

impl FromIterator<Table> for SeatMap {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| (t.id.clone(), t)).collect())
    }
}
