//! Price-threshold alerts checked against the best available deal.

use crate::loader::cleaner::normalise_key;
use crate::models::{AlertMatch, Cents, PriceAlert};
use crate::resolver::find_best_deal;
use crate::snapshot::PriceSnapshot;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Alerts keyed by their derived id: the same (name, threshold) pair replaces.
#[derive(Debug, Clone, Default)]
pub struct AlertRegistry {
    alerts: BTreeMap<String, PriceAlert>,
}

impl AlertRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_alert(&mut self, product_name: &str, target_price: Cents) -> &PriceAlert {
        let alert = PriceAlert::new(product_name, target_price);
        debug!("Alert {} set", alert.alert_id);
        let id = alert.alert_id.clone();
        self.alerts.insert(id.clone(), alert);
        &self.alerts[&id]
    }

    /// Drop every alert for the product name; returns how many were removed.
    pub fn remove_alert(&mut self, product_name: &str) -> usize {
        let name = normalise_key(product_name);
        let before = self.alerts.len();
        self.alerts.retain(|_, a| a.product_name != name);
        before - self.alerts.len()
    }

    pub fn deactivate(&mut self, alert_id: &str) -> bool {
        match self.alerts.get_mut(alert_id) {
            Some(a) => {
                a.active = false;
                true
            }
            None => false,
        }
    }

    pub fn list_active(&self) -> Vec<&PriceAlert> {
        self.alerts.values().filter(|a| a.active).collect()
    }

    /// Active alerts whose best deal on `date` is at or below the threshold.
    pub fn check_triggered(&self, snapshot: &PriceSnapshot, date: NaiveDate) -> Vec<AlertMatch> {
        let matches: Vec<AlertMatch> = self
            .list_active()
            .into_iter()
            .filter_map(|alert| {
                let deal = find_best_deal(snapshot, &alert.product_name, date)?;
                (deal.final_price <= alert.target_price).then(|| AlertMatch {
                    alert: alert.clone(),
                    store: deal.store,
                    product_name: deal.product_name,
                    current_price: deal.final_price,
                    discounted: deal.discounted,
                    discount_percentage: deal.discount_percentage,
                })
            })
            .collect();

        info!("{} of {} alerts triggered", matches.len(), self.list_active().len());
        matches
    }
}
