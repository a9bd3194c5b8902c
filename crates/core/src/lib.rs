//! Banquet Core Library
//!
//! Seat catalog, booking store, availability reconciliation, persistence and
//! change propagation for the Xuan Long banquet seating system.

pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod invariants;
pub mod models;
pub mod notify;
pub mod reconcile;
pub mod search;
pub mod service;
pub mod stats;
pub mod storage;

pub use auth::{AdminGate, AuthState};
pub use bookings::{parse_attendees, BookingDraft, BookingEdit};
pub use config::{AppConfig, ConfigError};
pub use error::{Error, Result};
pub use models::*;
pub use notify::{ChangeNotifier, DataChanged};
pub use reconcile::ReconcileReport;
pub use search::{SeatLocation, SUGGESTION_DEBOUNCE};
pub use service::{DataService, Snapshot};
pub use stats::{DashboardStats, SeatOverviewEntry};
pub use storage::{Database, DetachedStorage, DocumentKey, DocumentStorage, MemoryStorage};
