use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use price_comparator::alerts::AlertRegistry;
use price_comparator::config::AppConfig;
use price_comparator::history::{self, FsSnapshotSource};
use price_comparator::snapshot::PriceSnapshot;
use price_comparator::{report, resolver, utils, value};

#[derive(Parser)]
#[command(name = "price-comparator", about = "Compare store prices and discounts from CSV snapshots", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Reference date for discounts (yyyy-MM-dd, default: config or today)
    #[arg(long, global = true, env = "PRICECMP_DATE")]
    date: Option<NaiveDate>,

    /// Directory holding <store>_<date>.csv price files
    #[arg(long, global = true)]
    prices_dir: Option<PathBuf>,

    /// Directory holding <store>_discounts_<date>.csv files
    #[arg(long, global = true)]
    discounts_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Cheapest store for a product after discounts
    BestDeal { product: String },

    /// Every store's matching products, cheapest first
    Compare { product: String },

    /// Regular vs discounted prices across all snapshot dates
    History { term: String },

    /// Rank matching products by price per package unit
    BestValue {
        term: String,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Group package sizes of the same product and compare per-unit prices
    CompareSizes { term: String },

    /// Deepest discounts active on the reference date
    TopDiscounts {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Split a shopping list across stores at the lowest prices (items as NAME[:QTY])
    Plan {
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Check price alerts given as NAME=PRICE
    Alerts {
        #[arg(required = true)]
        watch: Vec<String>,
    },

    /// List product categories
    Categories,

    /// Show snapshot statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "price_comparator=info,warn",
        1 => "price_comparator=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(dir) = cli.prices_dir {
        config.data.prices_dir = dir;
    }
    if let Some(dir) = cli.discounts_dir {
        config.data.discounts_dir = dir;
    }

    let date = cli
        .date
        .or(config.analysis.reference_date)
        .unwrap_or_else(|| Utc::now().date_naive());
    let currency = config.analysis.currency.as_str();
    debug!("Reference date {}, data in {:?} / {:?}", date, config.data.prices_dir, config.data.discounts_dir);

    if let Command::History { term } = &cli.command {
        let _t = utils::Timer::start("History reconstruction");
        let source = FsSnapshotSource::new(&config.data.prices_dir, &config.data.discounts_dir);
        let points = history::history(&source, term);
        if cli.json {
            report::print_json(&points)?;
        } else {
            report::history(term, &points, currency);
        }
        return Ok(());
    }

    let snapshot = {
        let _t = utils::Timer::start("Snapshot load");
        PriceSnapshot::load(&config.data.prices_dir, &config.data.discounts_dir)
    };

    match cli.command {
        Command::BestDeal { product } => {
            let deal = resolver::find_best_deal(&snapshot, &product, date);
            if cli.json {
                report::print_json(&deal)?;
            } else {
                report::best_deal(&product, date, deal.as_ref(), currency);
            }
        }

        Command::Compare { product } => {
            let results = resolver::compare_prices(&snapshot, &product);
            if cli.json {
                report::print_json(&results)?;
            } else {
                report::comparison(&product, &results);
            }
        }

        Command::BestValue { term, limit } => {
            let mut items = value::best_value(&snapshot, &term, date);
            if let Some(n) = limit {
                items.truncate(n);
            }
            if cli.json {
                report::print_json(&items)?;
            } else {
                report::best_value(&term, &items, currency);
            }
        }

        Command::CompareSizes { term } => {
            let groups = value::compare_package_sizes(&snapshot, &term, date);
            if cli.json {
                report::print_json(&groups)?;
            } else {
                report::size_groups(&term, &groups, currency);
            }
        }

        Command::TopDiscounts { limit } => {
            let limit = limit.unwrap_or(config.analysis.top_discounts);
            let offers = resolver::top_discounts(&snapshot, date, limit);
            if cli.json {
                report::print_json(&offers)?;
            } else {
                report::top_discounts(date, &offers, currency);
            }
        }

        Command::Plan { items } => {
            let items = items
                .iter()
                .map(|s| utils::parse_shopping_item(s))
                .collect::<Result<Vec<_>>>()?;
            let plan = resolver::plan_shopping(&snapshot, &items, date);
            info!("Plan: {} of {} items resolved", plan.item_count(), items.len());
            if cli.json {
                report::print_json(&plan)?;
            } else {
                report::shopping_plan(date, &plan, currency);
            }
        }

        Command::Alerts { watch } => {
            let mut registry = AlertRegistry::new();
            for spec in &watch {
                let (name, cents) = utils::parse_alert_spec(spec)?;
                registry.add_alert(&name, cents);
            }
            let matches = registry.check_triggered(&snapshot, date);
            if cli.json {
                report::print_json(&matches)?;
            } else {
                report::alerts(date, registry.list_active().len(), &matches, currency);
            }
        }

        Command::Categories => {
            let categories = resolver::all_categories(&snapshot);
            if cli.json {
                report::print_json(&categories)?;
            } else {
                report::categories(&categories);
            }
        }

        Command::Stats => {
            let stats = snapshot.stats();
            if cli.json {
                report::print_json(&stats)?;
            } else {
                report::stats(&stats);
            }
        }

        // Reads the files directly, handled above.
        Command::History { .. } => {}
    }

    Ok(())
}
