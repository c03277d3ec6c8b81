//! Per-store discount lists in file order.

use crate::models::Discount;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountTable {
    stores: BTreeMap<String, Vec<Discount>>,
}

impl DiscountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store's list.
    pub fn load(&mut self, store: &str, discounts: Vec<Discount>) {
        self.stores.insert(store.to_string(), discounts);
    }

    pub fn for_store(&self, store: &str) -> &[Discount] {
        self.stores.get(store).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first discount, in file order, that targets the product (by id, or
    /// by its name containing `name_normalised`) and is active on `date`.
    /// Earlier entries win even when a later one is deeper.
    pub fn applicable_discount(
        &self,
        store: &str,
        product_id: &str,
        name_normalised: &str,
        date: NaiveDate,
    ) -> Option<&Discount> {
        first_applicable(self.for_store(store), date, |d| {
            d.product_id.eq_ignore_ascii_case(product_id)
                || d.product_name.to_lowercase().contains(name_normalised)
        })
    }

    /// (store, discount) pairs active on `date`, stores in sorted order.
    pub fn active_on(&self, date: NaiveDate) -> impl Iterator<Item = (&str, &Discount)> {
        self.stores.iter().flat_map(move |(store, list)| {
            list.iter()
                .filter(move |d| d.is_active_on(date))
                .map(move |d| (store.as_str(), d))
        })
    }

    pub fn discount_count(&self) -> usize {
        self.stores.values().map(Vec::len).sum()
    }
}

/// First entry of `discounts` accepted by `targets` whose interval contains `date`.
pub fn first_applicable(
    discounts: &[Discount],
    date: NaiveDate,
    targets: impl Fn(&Discount) -> bool,
) -> Option<&Discount> {
    discounts.iter().find(|&d| targets(d) && d.is_active_on(date))
}
