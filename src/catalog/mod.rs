//! Per-store product index keyed by lowercased product id and product name.

use crate::loader::cleaner::normalise_key;
use crate::models::ProductPrice;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogIndex {
    stores: BTreeMap<String, BTreeMap<String, ProductPrice>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the store's mapping. Every record is indexed under its id and
    /// its name; a later record with a colliding key wins.
    pub fn load(&mut self, store: &str, records: impl IntoIterator<Item = ProductPrice>) {
        let mut keys = BTreeMap::new();
        for price in records {
            keys.insert(normalise_key(&price.product_id), price.clone());
            keys.insert(normalise_key(&price.product_name), price);
        }
        self.stores.insert(store.to_string(), keys);
    }

    pub fn lookup(&self, store: &str, key: &str) -> Option<&ProductPrice> {
        self.stores.get(store)?.get(key)
    }

    /// First record, in key order, whose key contains `needle`.
    pub fn lookup_by_substring(&self, store: &str, needle: &str) -> Option<&ProductPrice> {
        self.stores
            .get(store)?
            .iter()
            .find(|(key, _)| key.contains(needle))
            .map(|(_, price)| price)
    }

    /// Store ids in sorted order.
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    /// Distinct records of a store (an entry reachable by two keys is yielded once).
    pub fn products(&self, store: &str) -> Vec<&ProductPrice> {
        let mut seen: BTreeMap<(&str, &str), &ProductPrice> = BTreeMap::new();
        if let Some(keys) = self.stores.get(store) {
            for price in keys.values() {
                seen.entry((price.product_id.as_str(), price.product_name.as_str()))
                    .or_insert(price);
            }
        }
        seen.into_values().collect()
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    pub fn product_count(&self) -> usize {
        self.stores.keys().map(|s| self.products(s).len()).sum()
    }
}
