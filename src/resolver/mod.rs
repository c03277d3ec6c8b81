//! Deal resolution over the current snapshot.
//!
//! Stores are visited in sorted order. A store's candidate is the exact key
//! match for the lowercased query, else the first key (lexicographically)
//! containing it. The cheapest effective price wins; ties keep the earlier
//! store.

use crate::loader::cleaner::normalise_key;
use crate::models::{
    apply_discount, BestDeal, DiscountOffer, ProductPrice, ShoppingItem, ShoppingPlan,
    ShoppingPlanItem,
};
use crate::snapshot::PriceSnapshot;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

/// Exact key first, substring containment second.
pub fn resolve_candidate<'a>(
    snapshot: &'a PriceSnapshot,
    store: &str,
    query: &str,
) -> Option<&'a ProductPrice> {
    snapshot
        .catalog
        .lookup(store, query)
        .or_else(|| snapshot.catalog.lookup_by_substring(store, query))
}

pub fn find_best_deal(
    snapshot: &PriceSnapshot,
    product_name: &str,
    date: NaiveDate,
) -> Option<BestDeal> {
    let query = normalise_key(product_name);
    let mut best: Option<BestDeal> = None;

    for store in snapshot.catalog.stores() {
        let Some(candidate) = resolve_candidate(snapshot, store, &query) else {
            continue;
        };

        let discount = snapshot
            .discounts
            .applicable_discount(store, &candidate.product_id, &query, date);
        let final_price = discount
            .map(|d| apply_discount(candidate.price, d.percentage))
            .unwrap_or(candidate.price);

        debug!(
            "{}: '{}' {} → {} ({:?}%)",
            store,
            candidate.product_name,
            candidate.price,
            final_price,
            discount.map(|d| d.percentage)
        );

        if best.as_ref().is_none_or(|b| final_price < b.final_price) {
            best = Some(BestDeal {
                store: store.to_string(),
                regular_price: candidate.price,
                final_price,
                discounted: discount.is_some(),
                discount_percentage: discount.map(|d| d.percentage),
                product_name: candidate.product_name.clone(),
            });
        }
    }

    best
}

/// Resolve every item to its cheapest store and group the result per store.
pub fn plan_shopping(
    snapshot: &PriceSnapshot,
    items: &[ShoppingItem],
    date: NaiveDate,
) -> ShoppingPlan {
    let mut plan = ShoppingPlan::default();
    for item in items {
        match find_best_deal(snapshot, &item.product_name, date) {
            Some(deal) => plan.add_item(
                &deal.store,
                ShoppingPlanItem {
                    product_name: deal.product_name,
                    quantity: item.quantity,
                    regular_price: deal.regular_price,
                    final_price: deal.final_price,
                    discounted: deal.discounted,
                },
            ),
            None => plan.unresolved.push(item.product_name.clone()),
        }
    }
    plan
}

/// Per store, distinct products whose name contains `product_name`, cheapest first.
pub fn compare_prices<'a>(
    snapshot: &'a PriceSnapshot,
    product_name: &str,
) -> Vec<(&'a str, Vec<&'a ProductPrice>)> {
    let needle = normalise_key(product_name);
    snapshot
        .catalog
        .stores()
        .filter_map(|store| {
            let mut matches: Vec<&ProductPrice> = snapshot
                .catalog
                .products(store)
                .into_iter()
                .filter(|p| p.product_name.to_lowercase().contains(&needle))
                .collect();
            if matches.is_empty() {
                return None;
            }
            matches.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.product_name.cmp(&b.product_name)));
            Some((store, matches))
        })
        .collect()
}

/// Discounts active on `date` across all stores, deepest first, at most `limit`.
/// Ties are ordered by store, then product id.
pub fn top_discounts(snapshot: &PriceSnapshot, date: NaiveDate, limit: usize) -> Vec<DiscountOffer> {
    let mut offers: Vec<DiscountOffer> = snapshot
        .discounts
        .active_on(date)
        .map(|(store, d)| {
            let regular = snapshot
                .catalog
                .lookup(store, &normalise_key(&d.product_id))
                .map(|p| p.price);
            DiscountOffer {
                store: store.to_string(),
                product_id: d.product_id.clone(),
                product_name: d.product_name.clone(),
                brand: d.brand.clone(),
                percentage: d.percentage,
                valid_from: d.valid_from,
                valid_to: d.valid_to,
                regular_price: regular,
                final_price: regular.map(|c| apply_discount(c, d.percentage)),
            }
        })
        .collect();

    offers.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.store.cmp(&b.store))
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    offers.truncate(limit);
    offers
}

pub fn all_categories(snapshot: &PriceSnapshot) -> BTreeSet<String> {
    snapshot
        .catalog
        .stores()
        .flat_map(|store| snapshot.catalog.products(store))
        .map(|p| p.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::fixtures::{day, discount, price, zuzu_snapshot};

    #[test]
    fn test_discounted_store_beats_cheaper_regular() {
        let deal = find_best_deal(&zuzu_snapshot(), "lapte", day(5)).unwrap();
        assert_eq!(deal.store, "b");
        assert_eq!(deal.regular_price, 600);
        assert_eq!(deal.final_price, 480);
        assert!(deal.discounted);
        assert_eq!(deal.discount_percentage, Some(20.0));
        assert_eq!(deal.product_name, "lapte zuzu");
    }

    #[test]
    fn test_outside_interval_regular_price_wins() {
        let deal = find_best_deal(&zuzu_snapshot(), "LAPTE", day(8)).unwrap();
        assert_eq!(deal.store, "a");
        assert_eq!(deal.final_price, 550);
        assert!(!deal.discounted);
    }

    #[test]
    fn test_interval_bounds_apply() {
        let snap = zuzu_snapshot();
        assert!(find_best_deal(&snap, "lapte", day(1)).unwrap().discounted);
        assert!(find_best_deal(&snap, "lapte", day(7)).unwrap().discounted);
    }

    #[test]
    fn test_not_found() {
        assert!(find_best_deal(&zuzu_snapshot(), "branza", day(5)).is_none());
        assert!(find_best_deal(&PriceSnapshot::default(), "lapte", day(5)).is_none());
    }

    #[test]
    fn test_exact_key_beats_earlier_substring_key() {
        let snap = PriceSnapshot::from_records(
            vec![(
                "a".into(),
                vec![
                    price("A1", "lapte zuzu", "Zuzu", 1.0, "l", 100),
                    price("A2", "zuzu", "Zuzu", 1.0, "l", 900),
                ],
            )],
            vec![],
        );
        let deal = find_best_deal(&snap, "zuzu", day(5)).unwrap();
        assert_eq!(deal.product_name, "zuzu");
        assert_eq!(deal.final_price, 900);
        assert!(!deal.discounted);
    }

    #[test]
    fn test_resolves_by_product_id() {
        let deal = find_best_deal(&zuzu_snapshot(), "a1", day(5)).unwrap();
        assert_eq!(deal.store, "a");
        assert_eq!(deal.product_name, "lapte zuzu");
    }

    #[test]
    fn test_idempotent() {
        let snap = zuzu_snapshot();
        assert_eq!(find_best_deal(&snap, "lapte", day(3)), find_best_deal(&snap, "lapte", day(3)));
    }

    #[test]
    fn test_tie_keeps_first_store_in_order() {
        let snap = PriceSnapshot::from_records(
            vec![
                ("profi".to_string(), vec![price("P1", "paine alba", "Pitar", 0.5, "kg", 300)]),
                ("auchan".to_string(), vec![price("X1", "paine alba", "Pitar", 0.5, "kg", 300)]),
            ],
            vec![],
        );
        assert_eq!(find_best_deal(&snap, "paine", day(1)).unwrap().store, "auchan");
    }

    #[test]
    fn test_never_below_any_store_effective_price() {
        let snap = PriceSnapshot::from_records(
            vec![
                ("a".to_string(), vec![price("A1", "lapte", "Z", 1.0, "l", 999)]),
                ("b".to_string(), vec![price("B1", "lapte", "Z", 1.0, "l", 1001)]),
                ("c".to_string(), vec![price("C1", "lapte", "Z", 1.0, "l", 1200)]),
            ],
            vec![
                ("b".to_string(), vec![discount("B1", "lapte", day(1), day(9), 1.0)]),
                ("c".to_string(), vec![discount("C1", "lapte", day(1), day(9), 50.0)]),
            ],
        );
        let deal = find_best_deal(&snap, "lapte", day(2)).unwrap();
        // 999 | 1001 * 0.99 → 990 | 1200 * 0.50 → 600
        assert_eq!(deal.store, "c");
        assert_eq!(deal.final_price, 600);
    }

    #[test]
    fn test_discount_matched_by_search_term_in_name() {
        let snap = PriceSnapshot::from_records(
            vec![("a".to_string(), vec![price("A1", "lapte zuzu", "Zuzu", 1.0, "l", 1000)])],
            vec![("a".to_string(), vec![discount("OTHER", "Lapte Zuzu 1.5%", day(1), day(9), 50.0)])],
        );
        let deal = find_best_deal(&snap, "lapte", day(2)).unwrap();
        assert_eq!(deal.final_price, 500);
    }

    #[test]
    fn test_plan_shopping_groups_by_store() {
        let snap = PriceSnapshot::from_records(
            vec![
                ("a".to_string(), vec![price("A1", "lapte zuzu", "Zuzu", 1.0, "l", 550)]),
                (
                    "b".to_string(),
                    vec![
                        price("B1", "lapte zuzu", "Zuzu", 1.0, "l", 600),
                        price("B2", "paine alba", "Pitar", 0.5, "kg", 300),
                    ],
                ),
            ],
            vec![("b".to_string(), vec![discount("B1", "lapte zuzu", day(1), day(7), 20.0)])],
        );
        let items = vec![
            ShoppingItem { product_name: "lapte".into(), quantity: 2 },
            ShoppingItem { product_name: "paine".into(), quantity: 1 },
            ShoppingItem { product_name: "vin".into(), quantity: 1 },
        ];

        let plan = plan_shopping(&snap, &items, day(3));
        assert_eq!(plan.stores.len(), 1);
        assert_eq!(plan.stores[0].0, "b");
        assert_eq!(plan.item_count(), 2);
        assert_eq!(plan.total_cost(), 480 * 2 + 300);
        assert_eq!(plan.total_savings(), 240);
        assert_eq!(plan.unresolved, vec!["vin".to_string()]);
    }

    #[test]
    fn test_compare_prices_and_categories() {
        let snap = PriceSnapshot::from_records(
            vec![
                (
                    "a".to_string(),
                    vec![price("A1", "Lapte Zuzu", "Zuzu", 1.0, "l", 550), price("A2", "lapte batut", "Zuzu", 1.0, "l", 450)],
                ),
                ("b".to_string(), vec![price("B2", "paine", "Pitar", 0.5, "kg", 300)]),
            ],
            vec![],
        );
        let cmp = compare_prices(&snap, "lapte");
        assert_eq!(cmp.len(), 1);
        assert_eq!(cmp[0].0, "a");
        let names: Vec<&str> = cmp[0].1.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, vec!["lapte batut", "Lapte Zuzu"]);

        let cats = all_categories(&snap);
        assert_eq!(cats.len(), 1);
        assert!(cats.contains("lactate"));
    }

    #[test]
    fn test_top_discounts_deepest_first() {
        let snap = PriceSnapshot::from_records(
            vec![("lidl".to_string(), vec![price("L1", "lapte", "Zuzu", 1.0, "l", 1000)])],
            vec![
                (
                    "lidl".to_string(),
                    vec![
                        discount("L1", "lapte", day(1), day(9), 25.0),
                        discount("L9", "iaurt", day(1), day(9), 40.0),
                        discount("L2", "unt", day(10), day(12), 60.0),
                    ],
                ),
                ("auchan".to_string(), vec![discount("A1", "oua", day(1), day(9), 25.0)]),
            ],
        );

        let top = top_discounts(&snap, day(5), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_id, "L9");
        assert_eq!(top[0].regular_price, None);
        assert_eq!(top[1].store, "auchan");

        let all = top_discounts(&snap, day(5), 10);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].product_id, "L1");
        assert_eq!(all[2].regular_price, Some(1000));
        assert_eq!(all[2].final_price, Some(750));
    }
}
