use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::analysis::normalize_candles;
use crate::config::ApiConfig;
use crate::error::{Error, Result};

pub mod birdeye;
pub mod dexscreener;
pub mod fetcher;
pub mod solana_tracker;
pub mod types;

pub use birdeye::BirdeyeClient;
pub use dexscreener::DexscreenerClient;
pub use fetcher::{RateLimitedFetcher, ScanCache};
pub use solana_tracker::SolanaTrackerClient;
pub use types::CandleQuery;

/// Source of raw token records and price history. Payloads are returned
/// untouched; the analysis extractor and candle normalizer read them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    async fn fetch_token(&self, address: &str) -> Result<Value>;
    async fn fetch_candles(&self, address: &str, query: &CandleQuery) -> Result<Value>;
    async fn fetch_token_list(&self, limit: usize) -> Result<Vec<Value>>;
}

#[derive(Debug, Clone)]
pub struct MarketDataCollector {
    birdeye: Option<BirdeyeClient>,
    dexscreener: DexscreenerClient,
    solana_tracker: Option<SolanaTrackerClient>,
}

impl MarketDataCollector {
    pub fn new(
        birdeye: Option<BirdeyeClient>,
        dexscreener: DexscreenerClient,
        solana_tracker: Option<SolanaTrackerClient>,
    ) -> Self {
        Self {
            birdeye,
            dexscreener,
            solana_tracker,
        }
    }

    /// Wires every client to one shared fetcher. Clients whose key is not
    /// configured are left out.
    pub fn from_config(config: &ApiConfig, fetcher: Arc<RateLimitedFetcher>) -> Self {
        let birdeye = config.has_birdeye_key().then(|| {
            BirdeyeClient::new(
                fetcher.clone(),
                config.birdeye_api_key.clone(),
                Some(config.birdeye_base_url.clone()),
            )
        });
        let solana_tracker = config.has_solana_tracker_key().then(|| {
            SolanaTrackerClient::new(
                fetcher.clone(),
                config.solana_tracker_api_key.clone(),
                Some(config.solana_tracker_base_url.clone()),
            )
        });
        let dexscreener = DexscreenerClient::new(fetcher, Some(config.dexscreener_base_url.clone()));

        info!(
            "Market data sources: birdeye={}, dexscreener=true, solana_tracker={}",
            birdeye.is_some(),
            solana_tracker.is_some()
        );
        Self::new(birdeye, dexscreener, solana_tracker)
    }

    pub fn has_token_list(&self) -> bool {
        self.birdeye.is_some()
    }
}

#[async_trait]
impl TokenDataProvider for MarketDataCollector {
    async fn fetch_token(&self, address: &str) -> Result<Value> {
        if let Some(birdeye) = &self.birdeye {
            match birdeye.token_overview(address).await {
                Ok(record) => return Ok(record),
                Err(e) => warn!("Birdeye overview failed for {}, trying Dexscreener: {}", address, e),
            }
        }
        self.dexscreener.token_record(address).await
    }

    async fn fetch_candles(&self, address: &str, query: &CandleQuery) -> Result<Value> {
        let mut last_error = None;

        if let Some(birdeye) = &self.birdeye {
            match birdeye.ohlcv(address, query).await {
                Ok(payload) if !normalize_candles(&payload).is_empty() => return Ok(payload),
                Ok(_) => {
                    warn!("Birdeye returned no candles for {}", address);
                    last_error = Some(Error::ApiInvalidData(format!("No candles for {}", address)));
                }
                Err(e) => {
                    warn!("Birdeye OHLCV failed for {}: {}", address, e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(tracker) = &self.solana_tracker {
            return tracker.chart(address, query).await;
        }

        Err(last_error.unwrap_or_else(|| {
            Error::ConfigError("No price-history provider configured".to_string())
        }))
    }

    async fn fetch_token_list(&self, limit: usize) -> Result<Vec<Value>> {
        match &self.birdeye {
            Some(birdeye) => birdeye.token_list(limit).await,
            None => Err(Error::ConfigError(
                "Token list requires a Birdeye API key".to_string(),
            )),
        }
    }
}
