//! The current-date view: catalog index + discount table, built once from the
//! data directories and then only read.

use crate::catalog::CatalogIndex;
use crate::discounts::DiscountTable;
use crate::error::Diagnostic;
use crate::loader::{discover_snapshots, load_discounts, load_prices};
use crate::models::{Discount, ProductPrice};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSnapshot {
    pub catalog: CatalogIndex,
    pub discounts: DiscountTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counts reported by the `stats` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotStats<'a> {
    pub stores: usize,
    pub products: usize,
    pub discounts: usize,
    pub diagnostics: &'a [Diagnostic],
}

impl PriceSnapshot {
    pub fn stats(&self) -> SnapshotStats<'_> {
        SnapshotStats {
            stores: self.catalog.store_count(),
            products: self.catalog.product_count(),
            discounts: self.discounts.discount_count(),
            diagnostics: &self.diagnostics,
        }
    }

    /// Build a snapshot from in-memory records, one entry per store.
    pub fn from_records(
        prices: Vec<(String, Vec<ProductPrice>)>,
        discounts: Vec<(String, Vec<Discount>)>,
    ) -> Self {
        let mut snap = Self::default();
        for (store, records) in prices {
            snap.catalog.load(&store, records);
        }
        for (store, records) in discounts {
            snap.discounts.load(&store, records);
        }
        snap
    }

    /// Load every price and discount file. Files are processed oldest date
    /// first, so for a key present in several files of one store the newest
    /// file wins; discount lists of one store are concatenated in that order.
    pub fn load(prices_dir: &Path, discounts_dir: &Path) -> Self {
        let mut diagnostics = Vec::new();

        let mut prices: BTreeMap<String, Vec<ProductPrice>> = BTreeMap::new();
        for file in discover_snapshots(prices_dir) {
            let loaded = load_prices(&file.path);
            prices.entry(file.store).or_default().extend(loaded.records);
            diagnostics.extend(loaded.diagnostics);
        }

        let mut discounts: BTreeMap<String, Vec<Discount>> = BTreeMap::new();
        for file in discover_snapshots(discounts_dir) {
            let loaded = load_discounts(&file.path);
            discounts.entry(file.store).or_default().extend(loaded.records);
            diagnostics.extend(loaded.diagnostics);
        }

        let mut snap =
            Self::from_records(prices.into_iter().collect(), discounts.into_iter().collect());
        snap.diagnostics = diagnostics;

        info!(
            "Snapshot: {} stores, {} products, {} discounts, {} diagnostics",
            snap.catalog.store_count(),
            snap.catalog.product_count(),
            snap.discounts.discount_count(),
            snap.diagnostics.len()
        );
        snap
    }
}

/// Shared records for query tests.
#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::models::Cents;
    use chrono::NaiveDate;

    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    pub fn price(id: &str, name: &str, brand: &str, qty: f64, unit: &str, cents: Cents) -> ProductPrice {
        ProductPrice {
            product_id: id.into(),
            product_name: name.into(),
            category: "lactate".into(),
            brand: brand.into(),
            package_quantity: qty,
            package_unit: unit.into(),
            price: cents,
            currency: "RON".into(),
        }
    }

    pub fn discount(id: &str, name: &str, from: NaiveDate, to: NaiveDate, pct: f64) -> Discount {
        Discount {
            product_id: id.into(),
            product_name: name.into(),
            brand: "Zuzu".into(),
            package_quantity: 1.0,
            package_unit: "l".into(),
            category: "lactate".into(),
            valid_from: from,
            valid_to: to,
            percentage: pct,
        }
    }

    /// Store A: "lapte zuzu" 5.50, no discount.
    /// Store B: "lapte zuzu" 6.00 with 20% off on 2025-05-01..=2025-05-07.
    pub fn zuzu_snapshot() -> PriceSnapshot {
        PriceSnapshot::from_records(
            vec![
                ("a".to_string(), vec![price("A1", "lapte zuzu", "Zuzu", 1.0, "l", 550)]),
                ("b".to_string(), vec![price("B1", "lapte zuzu", "Zuzu", 1.0, "l", 600)]),
            ],
            vec![("b".to_string(), vec![discount("B1", "lapte zuzu", day(1), day(7), 20.0)])],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_merges_store_files_newest_wins() {
        let root = tempfile::tempdir().unwrap();
        let prices = root.path().join("prices");
        let discounts = root.path().join("discounts");
        fs::create_dir_all(&prices).unwrap();
        fs::create_dir_all(&discounts).unwrap();

        let header = "product_id;product_name;product_category;brand;package_quantity;package_unit;price;currency\n";
        fs::write(
            prices.join("lidl_2025-05-08.csv"),
            format!("{header}P001;lapte zuzu;lactate;Zuzu;1;l;10.50;RON\n"),
        )
        .unwrap();
        fs::write(
            prices.join("lidl_2025-05-01.csv"),
            format!("{header}P001;lapte zuzu;lactate;Zuzu;1;l;9.90;RON\nP002;paine;panificatie;Pitar;0.5;kg;3.00;RON\nbroken;row\n"),
        )
        .unwrap();
        fs::write(
            discounts.join("lidl_discounts_2025-05-01.csv"),
            "product_id;product_name;brand;package_quantity;package_unit;product_category;from_date;to_date;percentage_of_discount\n\
             P002;paine;Pitar;0.5;kg;panificatie;2025-05-01;2025-05-07;10\n",
        )
        .unwrap();

        let snap = PriceSnapshot::load(&prices, &discounts);
        assert_eq!(snap.catalog.lookup("lidl", "p001").unwrap().price, 1050);
        assert_eq!(snap.catalog.lookup("lidl", "paine").unwrap().price, 300);
        assert_eq!(snap.discounts.for_store("lidl").len(), 1);
        assert_eq!(snap.diagnostics.len(), 1);

        let stats = snap.stats();
        assert_eq!((stats.stores, stats.products, stats.discounts), (1, 2, 1));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["products"], 2);
        assert_eq!(json["diagnostics"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_dirs_give_empty_snapshot() {
        let root = tempfile::tempdir().unwrap();
        let snap = PriceSnapshot::load(&root.path().join("p"), &root.path().join("d"));
        assert_eq!(snap.catalog.store_count(), 0);
        assert_eq!(snap.discounts.discount_count(), 0);
    }
}
