use chrono::NaiveDate;
use serde::Serialize;

/// Money in minor currency units (bani / cents).
pub type Cents = i64;

/// Convert minor units to major units for display and per-unit maths.
pub fn to_major(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Apply a percentage markdown, truncating toward zero.
/// 600 @ 20% → 480 | 999 @ 15% → 849
pub fn apply_discount(price: Cents, percentage: f64) -> Cents {
    let factor = 1.0 - percentage / 100.0;
    (price as f64 * factor) as Cents
}

// ── Catalog entry ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductPrice {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub brand: String,
    pub package_quantity: f64,
    pub package_unit: String,
    pub price: Cents,
    pub currency: String,
}

// ── Discount ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Discount {
    pub product_id: String,
    pub product_name: String,
    pub brand: String,
    pub package_quantity: f64,
    pub package_unit: String,
    pub category: String,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub percentage: f64,
}

impl Discount {
    /// Both bounds inclusive.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }
}

// ── Raw CSV rows ──────────────────────────────────────────────────────────────

/// product_id; product_name; category; brand; package_quantity; package_unit; price; currency
#[derive(Debug, Clone, Default)]
pub struct RawPriceRow {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub brand: String,
    pub package_quantity: String,
    pub package_unit: String,
    pub price: String,
    pub currency: String,
}

/// product_id; product_name; brand; package_quantity; package_unit; product_category;
/// from_date; to_date; percentage_of_discount
#[derive(Debug, Clone, Default)]
pub struct RawDiscountRow {
    pub product_id: String,
    pub product_name: String,
    pub brand: String,
    pub package_quantity: String,
    pub package_unit: String,
    pub category: String,
    pub from_date: String,
    pub to_date: String,
    pub percentage: String,
}

// ── Query results ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BestDeal {
    pub store: String,
    pub regular_price: Cents,
    pub final_price: Cents,
    pub discounted: bool,
    pub discount_percentage: Option<f64>,
    /// Canonical name from the matched catalog entry, not the query string.
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub product_name: String,
    pub store: String,
    pub brand: String,
    pub category: String,
    pub regular_price: f64,
    pub final_price: f64,
    pub discounted: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValuePerUnit {
    pub product_name: String,
    pub brand: String,
    pub store: String,
    pub regular_price: f64,
    pub final_price: f64,
    pub package_quantity: f64,
    pub package_unit: String,
    pub discounted: bool,
    pub discount_percentage: Option<f64>,
    pub value_per_unit: f64,
    pub final_value_per_unit: f64,
}

/// Products sharing a name prefix, cheapest per unit first.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SizeGroup {
    pub name: String,
    pub items: Vec<ValuePerUnit>,
}

/// An active discount enriched with the store's catalog price, when known.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscountOffer {
    pub store: String,
    pub product_id: String,
    pub product_name: String,
    pub brand: String,
    pub percentage: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub regular_price: Option<Cents>,
    pub final_price: Option<Cents>,
}

// ── Shopping basket ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingItem {
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShoppingPlanItem {
    pub product_name: String,
    pub quantity: u32,
    pub regular_price: Cents,
    pub final_price: Cents,
    pub discounted: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ShoppingPlan {
    /// (store, items) in store order.
    pub stores: Vec<(String, Vec<ShoppingPlanItem>)>,
    pub unresolved: Vec<String>,
}

impl ShoppingPlan {
    pub fn add_item(&mut self, store: &str, item: ShoppingPlanItem) {
        match self.stores.iter_mut().find(|(s, _)| s == store) {
            Some((_, items)) => items.push(item),
            None => {
                self.stores.push((store.to_string(), vec![item]));
                self.stores.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }
    }

    pub fn store_total(items: &[ShoppingPlanItem]) -> Cents {
        items.iter().map(|i| i.final_price * i.quantity as Cents).sum()
    }

    pub fn total_cost(&self) -> Cents {
        self.stores.iter().map(|(_, items)| Self::store_total(items)).sum()
    }

    pub fn total_savings(&self) -> Cents {
        self.stores
            .iter()
            .flat_map(|(_, items)| items)
            .map(|i| (i.regular_price - i.final_price) * i.quantity as Cents)
            .sum()
    }

    pub fn item_count(&self) -> usize {
        self.stores.iter().map(|(_, items)| items.len()).sum()
    }
}

// ── Alerts ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceAlert {
    pub product_name: String,
    pub target_price: Cents,
    pub alert_id: String,
    pub active: bool,
}

impl PriceAlert {
    pub fn new(product_name: &str, target_price: Cents) -> Self {
        let product_name = product_name.trim().to_lowercase();
        Self {
            alert_id: format!("{}_{}", product_name, target_price),
            product_name,
            target_price,
            active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertMatch {
    pub alert: PriceAlert,
    pub store: String,
    pub product_name: String,
    pub current_price: Cents,
    pub discounted: bool,
    pub discount_percentage: Option<f64>,
}
