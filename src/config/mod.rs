use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Where snapshot files live
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_prices_dir")]
    pub prices_dir: PathBuf,

    #[serde(default = "default_discounts_dir")]
    pub discounts_dir: PathBuf,
}

/// Query defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Reference date for discounts; today when unset.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_top_discounts")]
    pub top_discounts: usize,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_prices_dir() -> PathBuf {
    PathBuf::from("data/prices")
}
fn default_discounts_dir() -> PathBuf {
    PathBuf::from("data/discounts")
}
fn default_currency() -> String {
    "RON".to_string()
}
fn default_top_discounts() -> usize {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            prices_dir: default_prices_dir(),
            discounts_dir: default_discounts_dir(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            currency: default_currency(),
            top_discounts: default_top_discounts(),
        }
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("PRICECMP").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|e| {
            warn!("Invalid configuration ({}), using defaults", e);
            AppConfig::default()
        });
        Ok(app_cfg)
    }
}
