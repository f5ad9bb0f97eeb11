#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use bounce_scanner::api::{CandleQuery, TokenDataProvider};
use bounce_scanner::config::{Config, ScannerConfig};
use bounce_scanner::error::{Error, Result};

pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";
pub const SOL: &str = "So11111111111111111111111111111111111111112";

/// 40% dip, five stable candles, then a strong recovery.
pub const BOUNCE_CLOSES: [f64; 13] = [1.0, 2.0, 4.0, 7.0, 10.0, 6.0, 6.2, 6.4, 6.6, 6.8, 7.0, 9.2, 9.0];

pub fn create_test_config() -> Config {
    Config {
        scanner: ScannerConfig {
            cache_ttl_secs: 30,
            request_spacing_ms: 0,
            min_total_score: 0,
            ..ScannerConfig::default()
        },
        ..Config::default()
    }
}

pub fn token_json(address: &str, symbol: &str, market_cap: f64, liquidity: f64, volume: f64) -> Value {
    json!({
        "address": address,
        "symbol": symbol,
        "name": symbol,
        "mc": market_cap,
        "liquidity": liquidity,
        "price": 0.01,
        "v24h": volume,
        "priceChange1h": -3.0,
        "priceChange4h": 2.0,
        "priceChange12h": 6.0,
        "priceChange24h": 14.0
    })
}

/// Solana Tracker shaped chart payload.
pub fn chart_json(closes: &[f64]) -> Value {
    let candles: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| json!({ "time": i as i64 * 900, "close": close, "volume": 1000.0 }))
        .collect();
    json!({ "oclhv": candles })
}

/// In-memory provider. Unknown addresses fail the way an upstream 404 would.
#[derive(Default)]
pub struct StaticProvider {
    tokens: HashMap<String, Value>,
    candles: HashMap<String, Value>,
    listed: Vec<Value>,
    pub token_requests: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, address: &str, token: Value, candles: Option<Value>) -> Self {
        self.tokens.insert(address.to_string(), token);
        if let Some(candles) = candles {
            self.candles.insert(address.to_string(), candles);
        }
        self.listed.push(json!({ "address": address }));
        self
    }

    pub fn requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenDataProvider for StaticProvider {
    async fn fetch_token(&self, address: &str) -> Result<Value> {
        self.token_requests.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .get(address)
            .cloned()
            .ok_or_else(|| Error::ApiError(format!("unknown token {}", address)))
    }

    async fn fetch_candles(&self, address: &str, _query: &CandleQuery) -> Result<Value> {
        self.candles
            .get(address)
            .cloned()
            .ok_or_else(|| Error::NetworkError(format!("no candles for {}", address)))
    }

    async fn fetch_token_list(&self, limit: usize) -> Result<Vec<Value>> {
        Ok(self.listed.iter().take(limit).cloned().collect())
    }
}
