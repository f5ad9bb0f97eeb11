use log::debug;
use serde_json::Value;
use std::sync::Arc;

use super::fetcher::RateLimitedFetcher;
use super::types::{BirdeyeEnvelope, CandleQuery};
use crate::error::{Error, Result};

pub const API_BASE_URL: &str = "https://public-api.birdeye.so";
const RATE_LIMIT_KEY: &str = "birdeye";

#[derive(Debug, Clone)]
pub struct BirdeyeClient {
    fetcher: Arc<RateLimitedFetcher>,
    api_key: String,
    base_url: String,
}

impl BirdeyeClient {
    pub fn new(fetcher: Arc<RateLimitedFetcher>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            fetcher,
            api_key,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| API_BASE_URL.to_string()),
        }
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let headers = [("X-API-KEY", self.api_key.as_str()), ("x-chain", "solana")];
        let body = self.fetcher.get_json(RATE_LIMIT_KEY, &url, params, &headers).await?;
        let envelope: BirdeyeEnvelope = serde_json::from_value(body)?;
        envelope.into_data()
    }

    pub async fn token_overview(&self, address: &str) -> Result<Value> {
        let data = self
            .get("defi/token_overview", &[("address", address.to_string())])
            .await?;
        Ok(normalize_overview(data))
    }

    /// Tokens sorted by 24h USD volume, highest first.
    pub async fn token_list(&self, limit: usize) -> Result<Vec<Value>> {
        let params = [
            ("sort_by", "v24hUSD".to_string()),
            ("sort_type", "desc".to_string()),
            ("offset", "0".to_string()),
            ("limit", limit.to_string()),
        ];
        let data = self.get("defi/tokenlist", &params).await?;
        let tokens = data
            .get("tokens")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| Error::ApiInvalidData("Birdeye token list has no tokens".to_string()))?;
        debug!("Birdeye token list returned {} tokens", tokens.len());
        Ok(tokens.into_iter().take(limit).collect())
    }

    /// OHLCV payload, `{ "items": [...] }`.
    pub async fn ohlcv(&self, address: &str, query: &CandleQuery) -> Result<Value> {
        let params = [
            ("address", address.to_string()),
            ("type", query.interval.clone()),
            ("time_from", query.time_from.to_string()),
            ("time_to", query.time_to.to_string()),
        ];
        self.get("defi/ohlcv", &params).await
    }
}

/// The overview carries `v24h` in token units next to `v24hUSD`; the USD
/// figure is the one the volume ratio needs.
fn normalize_overview(mut data: Value) -> Value {
    if let Some(object) = data.as_object_mut() {
        if let Some(usd) = object.get("v24hUSD").filter(|v| !v.is_null()).cloned() {
            object.insert("v24h".to_string(), usd);
        }
    }
    data
}
