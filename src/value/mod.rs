//! Value-per-unit analysis over the current snapshot.

use crate::history::matches_term;
use crate::loader::cleaner::normalise_key;
use crate::models::{apply_discount, to_major, SizeGroup, ValuePerUnit};
use crate::snapshot::PriceSnapshot;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Every matching product with a positive package quantity, in store order.
pub fn analyze(snapshot: &PriceSnapshot, search_term: &str, date: NaiveDate) -> Vec<ValuePerUnit> {
    let term = normalise_key(search_term);
    let mut out = Vec::new();

    for store in snapshot.catalog.stores() {
        for p in snapshot.catalog.products(store) {
            if !matches_term(store, p, &term) || p.package_quantity <= 0.0 {
                continue;
            }

            let discount = snapshot.discounts.applicable_discount(
                store,
                &p.product_id,
                &normalise_key(&p.product_name),
                date,
            );
            let regular_price = to_major(p.price);
            let final_price = to_major(
                discount
                    .map(|d| apply_discount(p.price, d.percentage))
                    .unwrap_or(p.price),
            );

            out.push(ValuePerUnit {
                product_name: p.product_name.clone(),
                brand: p.brand.clone(),
                store: store.to_string(),
                regular_price,
                final_price,
                package_quantity: p.package_quantity,
                package_unit: p.package_unit.clone(),
                discounted: discount.is_some(),
                discount_percentage: discount.map(|d| d.percentage),
                value_per_unit: regular_price / p.package_quantity,
                final_value_per_unit: final_price / p.package_quantity,
            });
        }
    }

    out
}

fn by_final_value(a: &ValuePerUnit, b: &ValuePerUnit) -> Ordering {
    a.final_value_per_unit.total_cmp(&b.final_value_per_unit)
}

/// Cheapest per unit first.
pub fn best_value(snapshot: &PriceSnapshot, search_term: &str, date: NaiveDate) -> Vec<ValuePerUnit> {
    let mut items = analyze(snapshot, search_term, date);
    items.sort_by(by_final_value);
    items
}

/// Lowercased name up to the first digit: "Lapte Zuzu 1.5L" → "lapte zuzu".
/// Names that start with a digit are kept whole.
pub fn size_group_key(product_name: &str) -> String {
    let name = normalise_key(product_name);
    let prefix = name
        .split(|c: char| c.is_ascii_digit())
        .next()
        .unwrap_or_default()
        .trim();
    if prefix.is_empty() { name } else { prefix.to_string() }
}

/// Bucket matches by name prefix, each bucket cheapest per unit first.
pub fn compare_package_sizes(
    snapshot: &PriceSnapshot,
    search_term: &str,
    date: NaiveDate,
) -> Vec<SizeGroup> {
    let mut groups: BTreeMap<String, Vec<ValuePerUnit>> = BTreeMap::new();
    for item in analyze(snapshot, search_term, date) {
        groups.entry(size_group_key(&item.product_name)).or_default().push(item);
    }

    groups
        .into_iter()
        .map(|(name, mut items)| {
            items.sort_by(by_final_value);
            SizeGroup { name, items }
        })
        .collect()
}
