//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Planner configuration.
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Summary cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Budget planner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Currency used when a snapshot does not name one.
    #[serde(default)]
    pub currency: Currency,
    /// Name fragment identifying the payroll category when none is flagged.
    #[serde(default = "default_payroll_keyword")]
    pub payroll_keyword: String,
    /// Utilization percentage at which an entry turns into a warning.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: Decimal,
    /// Decimal places used when printing or exporting amounts.
    #[serde(default = "default_display_decimal_places")]
    pub display_decimal_places: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            payroll_keyword: default_payroll_keyword(),
            warning_threshold_percent: default_warning_threshold(),
            display_decimal_places: default_display_decimal_places(),
        }
    }
}

fn default_payroll_keyword() -> String {
    "salary".to_string()
}

fn default_warning_threshold() -> Decimal {
    Decimal::from(90)
}

fn default_display_decimal_places() -> u32 {
    2
}

/// Summary cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached yearly summaries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Time-to-live of a cached summary in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_capacity() -> u64 {
    64
}

fn default_ttl_secs() -> u64 {
    300 // 5 minutes
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "haushalt=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HAUSHALT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
