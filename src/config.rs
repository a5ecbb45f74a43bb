use crate::detection::DEFAULT_MIN_PARTICIPANTS;
use crate::errors::AppResult;
use crate::types::ScanPlan;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub scan: ScanConfig,
    pub classifier: ClassifierConfig,
    pub bitcoin_rpc: BitcoinRpcConfig,
}

/// Range to scan and per-window fetch limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Unix timestamp where the first window starts
    pub start_timestamp: i64,
    pub window_seconds: i64,
    pub window_count: usize,
    /// In-flight block/transaction lookups within one window
    pub concurrent_fetches: usize,
    /// Per-lookup timeout; a timed-out lookup is skipped
    pub fetch_timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        // April and May 2014, one day at a time
        Self {
            start_timestamp: 1_396_317_600,
            window_seconds: 86_400,
            window_count: 61,
            concurrent_fetches: 16,
            fetch_timeout_seconds: 60,
        }
    }
}

impl ScanConfig {
    pub fn scan_plan(&self) -> AppResult<ScanPlan> {
        ScanPlan::new(self.start_timestamp, self.window_seconds, self.window_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub min_participants: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_participants: DEFAULT_MIN_PARTICIPANTS,
        }
    }
}

/// Bitcoin Core RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoinRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    pub concurrent_requests: usize,
    /// Previous transactions kept for input value resolution
    pub cache_capacity: usize,
}

impl Default for BitcoinRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8332".to_string(),
            username: "bitcoin".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
            concurrent_requests: 10,
            cache_capacity: 50_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let scan = ScanConfig::default();
        let classifier = ClassifierConfig::default();
        let rpc = BitcoinRpcConfig::default();
        let config = Config::builder()
            .set_default("scan.start_timestamp", scan.start_timestamp)?
            .set_default("scan.window_seconds", scan.window_seconds)?
            .set_default("scan.window_count", scan.window_count as i64)?
            .set_default("scan.concurrent_fetches", scan.concurrent_fetches as i64)?
            .set_default("scan.fetch_timeout_seconds", scan.fetch_timeout_seconds)?
            .set_default(
                "classifier.min_participants",
                classifier.min_participants as i64,
            )?
            .set_default("bitcoin_rpc.url", rpc.url)?
            .set_default("bitcoin_rpc.username", rpc.username)?
            .set_default("bitcoin_rpc.password", rpc.password)?
            .set_default("bitcoin_rpc.timeout_seconds", rpc.timeout_seconds)?
            .set_default(
                "bitcoin_rpc.concurrent_requests",
                rpc.concurrent_requests as i64,
            )?
            .set_default("bitcoin_rpc.cache_capacity", rpc.cache_capacity as i64)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // COINSHUFFLE_SCAN__WINDOW_COUNT=30 overrides scan.window_count
            .add_source(
                Environment::with_prefix("COINSHUFFLE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Conventional Bitcoin Core credentials
        if let Ok(url) = env::var("BITCOIN_RPC_URL") {
            app_config.bitcoin_rpc.url = url;
        }
        if let Ok(username) = env::var("BITCOIN_RPC_USER") {
            app_config.bitcoin_rpc.username = username;
        }
        if let Ok(password) = env::var("BITCOIN_RPC_PASSWORD") {
            app_config.bitcoin_rpc.password = password;
        }

        Ok(app_config)
    }

    /// Load configuration, falling back to built-in defaults when loading fails
    pub fn get_defaults() -> Result<Self, ConfigError> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => Ok(Self::default()),
        }
    }
}
