//! Console rendering of query results.

use crate::models::{
    AlertMatch, BestDeal, DiscountOffer, PricePoint, ProductPrice, ShoppingPlan, SizeGroup,
    ValuePerUnit,
};
use crate::snapshot::SnapshotStats;
use crate::utils::{fmt_cents, fmt_money};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

const RULE: &str = "─────────────────────────────────";

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn best_deal(query: &str, date: NaiveDate, deal: Option<&BestDeal>, currency: &str) {
    let Some(deal) = deal else {
        println!("No store carries '{}'.", query);
        return;
    };
    println!("Best deal for '{}' on {}:", query, date);
    println!("  Store    : {}", deal.store.to_uppercase());
    println!("  Product  : {}", deal.product_name);
    match deal.discount_percentage {
        Some(pct) => println!(
            "  Price    : {} (DISCOUNTED {}% from {})",
            fmt_money(deal.final_price, currency),
            pct,
            fmt_cents(deal.regular_price)
        ),
        None => println!("  Price    : {}", fmt_money(deal.final_price, currency)),
    }
}

pub fn comparison(query: &str, results: &[(&str, Vec<&ProductPrice>)]) {
    if results.is_empty() {
        println!("No products named like '{}'.", query);
        return;
    }
    println!("=== PRICE COMPARISON - {} ===", query.to_uppercase());
    for (store, prices) in results {
        for p in prices {
            println!(
                "{} - {} {}{}: {}",
                store.to_uppercase(),
                p.product_name,
                p.package_quantity,
                p.package_unit,
                fmt_money(p.price, &p.currency)
            );
        }
    }
}

pub fn history(term: &str, points: &[PricePoint], currency: &str) {
    if points.is_empty() {
        println!("No history for '{}'.", term);
        return;
    }
    println!("=== PRICE HISTORY - {} ===", term.to_uppercase());
    for p in points {
        let mark = if p.discounted { " *" } else { "" };
        println!(
            "{}  {:<10} {:<30} {:<12} {:>8.2} → {:>8.2} {}{}",
            p.date, p.store, p.product_name, p.brand, p.regular_price, p.final_price, currency, mark
        );
    }
    println!("(* discounted)");
}

fn value_line(v: &ValuePerUnit, currency: &str) -> String {
    let discount = match v.discount_percentage {
        Some(pct) => format!(" (-{}%)", pct),
        None => String::new(),
    };
    format!(
        "{:<10} {} - {} {}{}: {:.2} {}{} → {:.2} {}/{}",
        v.store.to_uppercase(),
        v.product_name,
        v.brand,
        v.package_quantity,
        v.package_unit,
        v.final_price,
        currency,
        discount,
        v.final_value_per_unit,
        currency,
        v.package_unit
    )
}

pub fn best_value(term: &str, items: &[ValuePerUnit], currency: &str) {
    if items.is_empty() {
        println!("Nothing to rank for '{}'.", term);
        return;
    }
    println!("=== BEST VALUE - {} ===", term.to_uppercase());
    for (i, v) in items.iter().enumerate() {
        println!("{:>3}. {}", i + 1, value_line(v, currency));
    }
}

pub fn size_groups(term: &str, groups: &[SizeGroup], currency: &str) {
    if groups.is_empty() {
        println!("Nothing to compare for '{}'.", term);
        return;
    }
    for g in groups {
        println!("=== {} ===", g.name.to_uppercase());
        for v in &g.items {
            println!("  {}", value_line(v, currency));
        }
    }
}

pub fn top_discounts(date: NaiveDate, offers: &[DiscountOffer], currency: &str) {
    if offers.is_empty() {
        println!("No discounts active on {}.", date);
        return;
    }
    println!("=== TOP DISCOUNTS on {} ===", date);
    for o in offers {
        let price = match (o.regular_price, o.final_price) {
            (Some(r), Some(f)) => format!(" {} → {}", fmt_cents(r), fmt_money(f, currency)),
            _ => String::new(),
        };
        println!(
            "{:>5.1}%  {:<10} {} ({}) until {}{}",
            o.percentage,
            o.store.to_uppercase(),
            o.product_name,
            o.brand,
            o.valid_to,
            price
        );
    }
}

pub fn shopping_plan(date: NaiveDate, plan: &ShoppingPlan, currency: &str) {
    println!("=== OPTIMIZED SHOPPING PLAN ===");
    println!("Date: {}", date);
    println!("\nSHOPPING LISTS BY STORE:");
    for (store, items) in &plan.stores {
        println!("\n{}:", store.to_uppercase());
        for item in items {
            let price = if item.discounted {
                format!(
                    "{} (DISCOUNTED from {})",
                    fmt_cents(item.final_price),
                    fmt_cents(item.regular_price)
                )
            } else {
                fmt_cents(item.final_price)
            };
            println!("- {} x{}: {} {}", item.product_name, item.quantity, price, currency);
        }
        println!("STORE SUBTOTAL: {}", fmt_money(ShoppingPlan::store_total(items), currency));
    }
    if !plan.unresolved.is_empty() {
        println!("\nNOT FOUND: {}", plan.unresolved.join(", "));
    }
    println!("\nTOTAL COST: {}", fmt_money(plan.total_cost(), currency));
    println!("TOTAL SAVINGS: {}", fmt_money(plan.total_savings(), currency));
}

pub fn alerts(date: NaiveDate, watched: usize, matches: &[AlertMatch], currency: &str) {
    println!("=== PRICE ALERTS on {} ({} watched) ===", date, watched);
    if matches.is_empty() {
        println!("No alert triggered.");
        return;
    }
    for m in matches {
        let discount = match m.discount_percentage {
            Some(pct) => format!(" (-{}%)", pct),
            None => String::new(),
        };
        println!(
            "'{}' ≤ {}: {} at {} for {}{}",
            m.alert.product_name,
            fmt_cents(m.alert.target_price),
            m.product_name,
            m.store.to_uppercase(),
            fmt_money(m.current_price, currency),
            discount
        );
    }
}

pub fn categories(categories: &BTreeSet<String>) {
    println!("{} categories:", categories.len());
    for c in categories {
        println!("  {}", c);
    }
}

pub fn stats(stats: &SnapshotStats) {
    println!("{}", RULE);
    println!("  Price Comparator — Snapshot Stats");
    println!("{}", RULE);
    println!("  Stores      : {}", stats.stores);
    println!("  Products    : {}", stats.products);
    println!("  Discounts   : {}", stats.discounts);
    println!("  Diagnostics : {}", stats.diagnostics.len());
    println!("{}", RULE);
    for d in stats.diagnostics {
        println!("  {}", d);
    }
}
