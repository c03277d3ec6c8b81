//! Price history rebuilt from every dated snapshot pair.
//!
//! Each (store, date) is re-read on its own: the live catalog keeps only one
//! record per key, so it cannot answer questions across dates.

use crate::discounts::first_applicable;
use crate::error::Diagnostic;
use crate::loader::cleaner::normalise_key;
use crate::loader::{discount_file_name, discover_snapshots, load_discounts, load_prices};
use crate::models::{apply_discount, to_major, Discount, PricePoint, ProductPrice};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnapshotKey {
    pub store: String,
    pub date: NaiveDate,
    /// Price file the key was discovered from.
    pub file: PathBuf,
}

/// Prices and discounts as published by one store on one date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySnapshot {
    pub prices: Vec<ProductPrice>,
    pub discounts: Vec<Discount>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Where historical snapshots come from.
pub trait SnapshotSource {
    /// Every known (store, date) price snapshot, in discovery order.
    fn snapshots(&self) -> Vec<SnapshotKey>;

    /// Freshly parse the price and discount data for one key.
    fn load_day(&self, key: &SnapshotKey) -> DaySnapshot;
}

// ── Filesystem source ─────────────────────────────────────────────────────────

pub struct FsSnapshotSource {
    prices_dir: PathBuf,
    discounts_dir: PathBuf,
}

impl FsSnapshotSource {
    pub fn new(prices_dir: impl Into<PathBuf>, discounts_dir: impl Into<PathBuf>) -> Self {
        Self { prices_dir: prices_dir.into(), discounts_dir: discounts_dir.into() }
    }
}

impl SnapshotSource for FsSnapshotSource {
    fn snapshots(&self) -> Vec<SnapshotKey> {
        discover_snapshots(&self.prices_dir)
            .into_iter()
            .filter_map(|file| match file.date {
                Some(date) => Some(SnapshotKey { store: file.store, date, file: file.path }),
                None => {
                    warn!("Skipping {:?}: no date in file name", file.path);
                    None
                }
            })
            .collect()
    }

    /// Prices come from the discovered file; the discount file is paired by
    /// `<store>_discounts_<date>.csv`.
    fn load_day(&self, key: &SnapshotKey) -> DaySnapshot {
        let prices = load_prices(&key.file);
        let discounts =
            load_discounts(&self.discounts_dir.join(discount_file_name(&key.store, key.date)));

        let mut diagnostics = prices.diagnostics;
        diagnostics.extend(discounts.diagnostics);
        DaySnapshot { prices: prices.records, discounts: discounts.records, diagnostics }
    }
}

// ── Reconstruction ────────────────────────────────────────────────────────────

/// True when the lowercased term occurs in the store, category, brand or name.
pub fn matches_term(store: &str, product: &ProductPrice, term: &str) -> bool {
    store.to_lowercase().contains(term)
        || product.category.to_lowercase().contains(term)
        || product.brand.to_lowercase().contains(term)
        || product.product_name.to_lowercase().contains(term)
}

/// Price points for one (store, date): the discount must target the product
/// id and be active on the snapshot's own date.
pub fn day_points(key: &SnapshotKey, day: &DaySnapshot, term: &str) -> Vec<PricePoint> {
    day.prices
        .iter()
        .filter(|p| matches_term(&key.store, p, term))
        .map(|p| {
            let discount = first_applicable(&day.discounts, key.date, |d| {
                d.product_id.eq_ignore_ascii_case(&p.product_id)
            });
            let final_cents = discount
                .map(|d| apply_discount(p.price, d.percentage))
                .unwrap_or(p.price);

            PricePoint {
                date: key.date,
                product_name: p.product_name.clone(),
                store: key.store.clone(),
                brand: p.brand.clone(),
                category: p.category.clone(),
                regular_price: to_major(p.price),
                final_price: to_major(final_cents),
                discounted: discount.is_some(),
            }
        })
        .collect()
}

/// All matching price points across every snapshot, oldest date first.
/// Points from the same date keep their discovery order.
pub fn history(source: &impl SnapshotSource, search_term: &str) -> Vec<PricePoint> {
    let term = normalise_key(search_term);
    let mut points = Vec::new();
    let mut diagnostics = 0usize;

    for key in source.snapshots() {
        let day = source.load_day(&key);
        diagnostics += day.diagnostics.len();
        let found = day_points(&key, &day, &term);
        debug!("{} {}: {} matching", key.store, key.date, found.len());
        points.extend(found);
    }

    points.sort_by_key(|p| p.date);
    info!("History '{}': {} points ({} diagnostics)", search_term, points.len(), diagnostics);
    points
}
