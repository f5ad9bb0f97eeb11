use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;

use super::fetcher::RateLimitedFetcher;
use super::types::DexscreenerPairsResponse;
use crate::analysis::extractor::coerce_f64;
use crate::error::{Error, Result};

pub const API_BASE_URL: &str = "https://api.dexscreener.com";
const RATE_LIMIT_KEY: &str = "dexscreener";

/// Keyless fallback for token records.
#[derive(Debug, Clone)]
pub struct DexscreenerClient {
    fetcher: Arc<RateLimitedFetcher>,
    base_url: String,
}

impl DexscreenerClient {
    pub fn new(fetcher: Arc<RateLimitedFetcher>, base_url: Option<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| API_BASE_URL.to_string()),
        }
    }

    /// Token record built from the token's most liquid pair.
    pub async fn token_record(&self, address: &str) -> Result<Value> {
        let url = format!("{}/latest/dex/tokens/{}", self.base_url, address);
        let body = self.fetcher.get_json(RATE_LIMIT_KEY, &url, &[], &[]).await?;
        let response: DexscreenerPairsResponse = serde_json::from_value(body)?;
        let pairs = response.pairs.unwrap_or_default();
        debug!("Dexscreener returned {} pairs for {}", pairs.len(), address);

        let pair = most_liquid_pair(&pairs)
            .ok_or_else(|| Error::ApiInvalidData(format!("No Dexscreener pairs for {}", address)))?;
        Ok(flatten_pair(pair, address))
    }
}

fn pair_liquidity(pair: &Value) -> f64 {
    pair.pointer("/liquidity/usd").and_then(coerce_f64).unwrap_or(0.0)
}

/// Highest USD liquidity; the first pair wins ties.
fn most_liquid_pair(pairs: &[Value]) -> Option<&Value> {
    pairs.iter().fold(None, |best: Option<&Value>, pair| match best {
        Some(current) if pair_liquidity(current) >= pair_liquidity(pair) => Some(current),
        _ => Some(pair),
    })
}

/// Maps a pair onto the token-record keys the extractor reads. Dexscreener
/// has no 4h or 12h change, so those keys are left out.
fn flatten_pair(pair: &Value, address: &str) -> Value {
    let market_cap = pair
        .get("marketCap")
        .filter(|v| !v.is_null())
        .or_else(|| pair.get("fdv"))
        .cloned()
        .unwrap_or(Value::Null);

    json!({
        "address": pair.pointer("/baseToken/address").cloned().unwrap_or_else(|| json!(address)),
        "symbol": pair.pointer("/baseToken/symbol").cloned().unwrap_or(Value::Null),
        "name": pair.pointer("/baseToken/name").cloned().unwrap_or(Value::Null),
        "mc": market_cap,
        "liquidity": pair.pointer("/liquidity/usd").cloned().unwrap_or(Value::Null),
        "price": pair.get("priceUsd").cloned().unwrap_or(Value::Null),
        "v24h": pair.pointer("/volume/h24").cloned().unwrap_or(Value::Null),
        "priceChange1h": pair.pointer("/priceChange/h1").cloned().unwrap_or(Value::Null),
        "priceChange24h": pair.pointer("/priceChange/h24").cloned().unwrap_or(Value::Null),
    })
}
