//! Store price and discount comparison over CSV snapshots.
//!
//! Price snapshots are loaded into a [`snapshot::PriceSnapshot`] (catalog
//! index + discount table) that every query borrows read-only. Price history
//! is rebuilt separately from each dated file pair.

pub mod alerts;
pub mod catalog;
pub mod config;
pub mod discounts;
pub mod error;
pub mod history;
pub mod loader;
pub mod models;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod utils;
pub mod value;
