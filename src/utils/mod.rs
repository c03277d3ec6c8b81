use crate::loader::cleaner::parse_price_cents;
use crate::models::{Cents, ShoppingItem};
use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};
use tracing::info;

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

/// Format minor units as a major-unit amount.
/// 1050 → "10.50" | 7 → "0.07" | -250 → "-2.50"
pub fn fmt_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

pub fn fmt_money(cents: Cents, currency: &str) -> String {
    format!("{} {}", fmt_cents(cents), currency)
}

/// "lapte:2" → 2 × lapte | "paine" → 1 × paine
pub fn parse_shopping_item(s: &str) -> Result<ShoppingItem> {
    let (name, qty) = match s.rsplit_once(':') {
        Some((name, qty)) => (
            name,
            qty.trim()
                .parse::<u32>()
                .with_context(|| format!("Bad quantity in '{}'", s))?,
        ),
        None => (s, 1),
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Empty product name in '{}'", s);
    }
    Ok(ShoppingItem { product_name: name.to_string(), quantity: qty })
}

/// "lapte=8.50" → (lapte, 850)
pub fn parse_alert_spec(s: &str) -> Result<(String, Cents)> {
    let (name, price) = s
        .rsplit_once('=')
        .with_context(|| format!("Expected NAME=PRICE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Empty product name in '{}'", s);
    }
    let cents = parse_price_cents(price).with_context(|| format!("Bad threshold in '{}'", s))?;
    Ok((name.to_string(), cents))
}
