//! Data models for the banquet seating system

mod booking;
mod table;

pub use booking::*;
pub use table::*;
