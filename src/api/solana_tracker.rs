use serde_json::Value;
use std::sync::Arc;

use super::fetcher::RateLimitedFetcher;
use super::types::CandleQuery;
use crate::error::Result;

pub const API_BASE_URL: &str = "https://data.solanatracker.io";
const RATE_LIMIT_KEY: &str = "solana_tracker";

/// Secondary price-history source, used when Birdeye has no candles.
#[derive(Debug, Clone)]
pub struct SolanaTrackerClient {
    fetcher: Arc<RateLimitedFetcher>,
    api_key: String,
    base_url: String,
}

impl SolanaTrackerClient {
    pub fn new(fetcher: Arc<RateLimitedFetcher>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            fetcher,
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| API_BASE_URL.to_string()),
        }
    }

    /// Chart payload, `{ "oclhv": [...] }`.
    pub async fn chart(&self, address: &str, query: &CandleQuery) -> Result<Value> {
        let url = format!("{}/chart/{}", self.base_url, address);
        let params = [
            ("type", chart_interval(&query.interval)),
            ("time_from", query.time_from.to_string()),
            ("time_to", query.time_to.to_string()),
        ];
        let headers = [("x-api-key", self.api_key.as_str())];
        self.fetcher.get_json(RATE_LIMIT_KEY, &url, &params, &headers).await
    }
}

/// Solana Tracker spells hour and day intervals in lower case.
fn chart_interval(interval: &str) -> String {
    interval.to_lowercase()
}
