//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Finance engine defaults.
    #[serde(default)]
    pub finance: FinanceConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Finance engine defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// ISO 4217 currency code stamped on payment records.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of (student, rule) pairs committed per posting transaction.
    #[serde(default = "default_posting_chunk_size")]
    pub posting_chunk_size: usize,
    /// Day of the month used for a period's default due date.
    #[serde(default = "default_due_day_of_month")]
    pub due_day_of_month: u32,
    /// Base URL for the `paymentLink` reminder token, when payments are
    /// collectable online.
    #[serde(default)]
    pub payment_link_base: Option<String>,
}

fn default_currency() -> String {
    "PKR".to_string()
}

fn default_posting_chunk_size() -> usize {
    500
}

fn default_due_day_of_month() -> u32 {
    10
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            posting_chunk_size: default_posting_chunk_size(),
            due_day_of_month: default_due_day_of_month(),
            payment_link_base: None,
        }
    }
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
            .add_source(config::Environment::with_prefix("TAHSIL").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
