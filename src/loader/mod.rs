//! Snapshot loader: file naming convention + semicolon-delimited CSV parsing.
//!
//! Price files are `<store>_<yyyy-MM-dd>.csv`, discount files are
//! `<store>_discounts_<yyyy-MM-dd>.csv`. Rows that cannot be used are dropped
//! and reported as [`Diagnostic`]s; a file never fails as a whole.

pub mod cleaner;

use crate::error::{Diagnostic, RowError};
use crate::models::{Discount, ProductPrice, RawDiscountRow, RawPriceRow};
use chrono::NaiveDate;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use self::cleaner::{
    discount_row_to_record, price_row_to_record, DISCOUNT_COLUMNS, PRICE_COLUMNS,
};

/// Records parsed from one file plus everything that was dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self { records: Vec::new(), diagnostics: Vec::new() }
    }
}

// ── File naming ───────────────────────────────────────────────────────────────

/// A snapshot file identified by the store and date in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFile {
    pub store: String,
    pub date: Option<NaiveDate>,
    pub path: PathBuf,
}

/// Store = segment before the first underscore, date = last segment.
/// "kaufland_2025-05-08.csv" → ("kaufland", 2025-05-08)
pub fn parse_snapshot_name(path: &Path) -> Option<SnapshotFile> {
    let stem = path.file_stem()?.to_str()?;
    let store = stem.split('_').next()?.trim();
    if store.is_empty() {
        return None;
    }

    let date = stem
        .rsplit('_')
        .next()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    Some(SnapshotFile { store: store.to_string(), date, path: path.to_path_buf() })
}

pub fn discount_file_name(store: &str, date: NaiveDate) -> String {
    format!("{}_discounts_{}.csv", store, date.format("%Y-%m-%d"))
}

pub fn price_file_name(store: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", store, date.format("%Y-%m-%d"))
}

/// List `.csv` files in `dir`, sorted by name.
/// A directory that cannot be listed is reported and yields no files.
pub fn discover_csv_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("Cannot list {:?}: {}", dir, e);
            return vec![];
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().map(|e| e == "csv").unwrap_or(false))
        .collect();
    files.sort();
    debug!("{} CSV files in {:?}", files.len(), dir);
    files
}

/// Discover snapshot files, ordered oldest date first (undated last, then by name).
pub fn discover_snapshots(dir: &Path) -> Vec<SnapshotFile> {
    let mut snaps: Vec<SnapshotFile> = discover_csv_files(dir)
        .iter()
        .filter_map(|p| {
            let snap = parse_snapshot_name(p);
            if snap.is_none() {
                warn!("Skipping {:?}: no store in file name", p);
            }
            snap
        })
        .collect();
    snaps.sort_by(|a, b| {
        let key = |s: &SnapshotFile| (s.date.is_none(), s.date);
        key(a).cmp(&key(b)).then_with(|| a.path.cmp(&b.path))
    });
    snaps
}

// ── CSV parsing ───────────────────────────────────────────────────────────────

fn field(record: &StringRecord, i: usize) -> String {
    record.get(i).unwrap_or_default().to_string()
}

fn read_rows<T>(
    path: &Path,
    min_columns: usize,
    parse: impl Fn(&StringRecord) -> Result<T, RowError>,
) -> Loaded<T> {
    let mut out = Loaded::default();

    let mut reader = match csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(r) => r,
        Err(e) => {
            warn!("Cannot open {:?}: {}", path, e);
            out.diagnostics.push(Diagnostic::file(path, format!("cannot open: {}", e)));
            return out;
        }
    };

    for (i, result) in reader.records().enumerate() {
        let line = i + 1;
        let parsed = result
            .map_err(|e| RowError::Csv(e.to_string()))
            .and_then(|record| {
                if record.len() < min_columns {
                    return Err(RowError::TooFewColumns {
                        expected: min_columns,
                        found: record.len(),
                    });
                }
                parse(&record)
            });

        match parsed {
            Ok(rec) => out.records.push(rec),
            Err(e @ RowError::TooFewColumns { .. }) => {
                debug!("Row {} in {:?}: {}", line, path, e);
                out.diagnostics.push(Diagnostic::row(path, line, &e));
            }
            Err(e) => {
                warn!("Row {} in {:?}: {}", line, path, e);
                out.diagnostics.push(Diagnostic::row(path, line, &e));
            }
        }
    }

    out
}

/// Parse a price file: product_id; product_name; category; brand;
/// package_quantity; package_unit; price; currency
pub fn load_prices(path: &Path) -> Loaded<ProductPrice> {
    let loaded = read_rows(path, PRICE_COLUMNS, |r| {
        price_row_to_record(&RawPriceRow {
            product_id: field(r, 0),
            product_name: field(r, 1),
            category: field(r, 2),
            brand: field(r, 3),
            package_quantity: field(r, 4),
            package_unit: field(r, 5),
            price: field(r, 6),
            currency: field(r, 7),
        })
    });
    info!(
        "{:?}: {} prices loaded, {} rows dropped",
        path.file_name().unwrap_or_default(),
        loaded.records.len(),
        loaded.diagnostics.len()
    );
    loaded
}

/// Parse a discount file: product_id; product_name; brand; package_quantity;
/// package_unit; product_category; from_date; to_date; percentage
pub fn load_discounts(path: &Path) -> Loaded<Discount> {
    let loaded = read_rows(path, DISCOUNT_COLUMNS, |r| {
        discount_row_to_record(&RawDiscountRow {
            product_id: field(r, 0),
            product_name: field(r, 1),
            brand: field(r, 2),
            package_quantity: field(r, 3),
            package_unit: field(r, 4),
            category: field(r, 5),
            from_date: field(r, 6),
            to_date: field(r, 7),
            percentage: field(r, 8),
        })
    });
    info!(
        "{:?}: {} discounts loaded, {} rows dropped",
        path.file_name().unwrap_or_default(),
        loaded.records.len(),
        loaded.diagnostics.len()
    );
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PRICE_HEADER: &str =
        "product_id;product_name;product_category;brand;package_quantity;package_unit;price;currency";
    const DISCOUNT_HEADER: &str = "product_id;product_name;brand;package_quantity;package_unit;product_category;from_date;to_date;percentage_of_discount";

    #[test]
    fn test_parse_snapshot_name() {
        let s = parse_snapshot_name(Path::new("data/prices/kaufland_2025-05-08.csv")).unwrap();
        assert_eq!(s.store, "kaufland");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 5, 8));

        let s = parse_snapshot_name(Path::new("lidl_discounts_2025-05-01.csv")).unwrap();
        assert_eq!(s.store, "lidl");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 5, 1));

        let s = parse_snapshot_name(Path::new("profi.csv")).unwrap();
        assert_eq!(s.store, "profi");
        assert_eq!(s.date, None);

        assert!(parse_snapshot_name(Path::new("_2025-05-01.csv")).is_none());
    }

    #[test]
    fn test_file_names_follow_convention() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 8).unwrap();
        assert_eq!(price_file_name("lidl", d), "lidl_2025-05-08.csv");
        assert_eq!(discount_file_name("lidl", d), "lidl_discounts_2025-05-08.csv");
    }

    #[test]
    fn test_short_row_skipped_rest_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lidl_2025-05-01.csv");
        fs::write(
            &path,
            format!(
                "{PRICE_HEADER}\n\
                 P001;lapte zuzu;lactate;Zuzu;1;l;9.90;RON\n\
                 P002;paine;panificatie;Vel Pitar;0.5\n\
                 P003;oua;oua;Ferma;10;buc;13.129;RON\n"
            ),
        )
        .unwrap();

        let loaded = load_prices(&path);
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].price, 990);
        assert_eq!(loaded.records[1].price, 1312);
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, Some(2));
    }

    #[test]
    fn test_bad_numbers_dropped_with_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lidl_discounts_2025-05-01.csv");
        fs::write(
            &path,
            format!(
                "{DISCOUNT_HEADER}\n\
                 P001;lapte zuzu;Zuzu;1;l;lactate;2025-05-01;2025-05-07;20\n\
                 P002;paine;Vel Pitar;abc;kg;panificatie;2025-05-01;2025-05-07;10\n\
                 P003;oua;Ferma;10;buc;oua;2025-05-xx;2025-05-07;15\n"
            ),
        )
        .unwrap();

        let loaded = load_discounts(&path);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].product_id, "P001");
        assert_eq!(loaded.diagnostics.len(), 2);
    }

    #[test]
    fn test_missing_file_yields_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_prices(&dir.path().join("nope_2025-05-01.csv"));
        assert!(loaded.records.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].line, None);
    }

    #[test]
    fn test_discover_snapshots_sorted_by_date() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["lidl_2025-05-08.csv", "kaufland_2025-05-01.csv", "notes.txt"] {
            fs::write(dir.path().join(name), PRICE_HEADER).unwrap();
        }

        let snaps = discover_snapshots(dir.path());
        let stores: Vec<&str> = snaps.iter().map(|s| s.store.as_str()).collect();
        assert_eq!(stores, vec!["kaufland", "lidl"]);
    }

    #[test]
    fn test_unlistable_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_csv_files(&dir.path().join("missing")).is_empty());
    }
}
