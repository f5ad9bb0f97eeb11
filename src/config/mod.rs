use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::calls::Call;
use crate::error::{Error, Result};
use crate::validation::validate_api_key;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const BIRDEYE_KEY_ENV: &str = "BIRDEYE_API_KEY";
pub const SOLANA_TRACKER_KEY_ENV: &str = "SOLANA_TRACKER_API_KEY";

/// Intervals accepted by the OHLCV endpoints.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1H", "2H", "4H", "6H", "8H", "12H", "1D",
];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub scanner: ScannerConfig,
    pub calls: Vec<Call>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub birdeye_api_key: String,
    pub solana_tracker_api_key: String,
    pub birdeye_base_url: String,
    pub dexscreener_base_url: String,
    pub solana_tracker_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            birdeye_api_key: String::new(),
            solana_tracker_api_key: String::new(),
            birdeye_base_url: "https://public-api.birdeye.so".to_string(),
            dexscreener_base_url: "https://api.dexscreener.com".to_string(),
            solana_tracker_base_url: "https://data.solanatracker.io".to_string(),
            request_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    pub cache_ttl_secs: u64,
    pub request_spacing_ms: u64,
    pub candle_interval: String,
    pub lookback_hours: u32,
    pub token_list_limit: usize,
    pub min_total_score: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 60,
            request_spacing_ms: 1200,
            candle_interval: "15m".to_string(),
            lookback_hours: 24,
            token_list_limit: 50,
            min_total_score: 0,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn has_birdeye_key(&self) -> bool {
        !self.birdeye_api_key.trim().is_empty()
    }

    pub fn has_solana_tracker_key(&self) -> bool {
        !self.solana_tracker_api_key.trim().is_empty()
    }
}

impl ScannerConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_spacing(&self) -> Duration {
        Duration::from_millis(self.request_spacing_ms)
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when the file does not exist.
    /// Environment overrides are applied afterwards.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_str = fs::read_to_string(path)?;
            toml::from_str(&config_str)?
        } else {
            info!("No configuration at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// API keys from the environment (and `.env`) win over the file.
    pub fn apply_env_overrides(&mut self) {
        dotenv::dotenv().ok();
        if let Some(key) = non_empty_env(BIRDEYE_KEY_ENV) {
            debug!("Using {} from environment", BIRDEYE_KEY_ENV);
            self.api.birdeye_api_key = key;
        }
        if let Some(key) = non_empty_env(SOLANA_TRACKER_KEY_ENV) {
            debug!("Using {} from environment", SOLANA_TRACKER_KEY_ENV);
            self.api.solana_tracker_api_key = key;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.has_birdeye_key() {
            validate_api_key(&self.api.birdeye_api_key)?;
        }
        if self.api.has_solana_tracker_key() {
            validate_api_key(&self.api.solana_tracker_api_key)?;
        }
        if self.scanner.cache_ttl_secs == 0 {
            return Err(Error::ConfigError("cache_ttl_secs must be positive".to_string()));
        }
        if self.scanner.token_list_limit == 0 {
            return Err(Error::ConfigError("token_list_limit must be positive".to_string()));
        }
        if self.scanner.lookback_hours == 0 {
            return Err(Error::ConfigError("lookback_hours must be positive".to_string()));
        }
        if !SUPPORTED_INTERVALS.contains(&self.scanner.candle_interval.as_str()) {
            return Err(Error::ConfigError(format!(
                "Unsupported candle interval: {}",
                self.scanner.candle_interval
            )));
        }
        for call in &self.calls {
            if !(call.entry_market_cap > 0.0) {
                return Err(Error::ConfigError(format!(
                    "Call {} has a non-positive entry market cap",
                    call.symbol
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
