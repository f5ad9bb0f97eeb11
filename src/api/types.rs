use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Price-history window requested from an OHLCV endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    pub interval: String,
    pub time_from: i64,
    pub time_to: i64,
}

impl CandleQuery {
    pub fn new(interval: impl Into<String>, time_from: i64, time_to: i64) -> Self {
        Self {
            interval: interval.into(),
            time_from,
            time_to,
        }
    }

    /// The `hours` leading up to `now`.
    pub fn lookback(interval: impl Into<String>, hours: u32, now: DateTime<Utc>) -> Self {
        let from = now - ChronoDuration::hours(i64::from(hours));
        Self::new(interval, from.timestamp(), now.timestamp())
    }
}

/// Birdeye wraps every payload in `{ success, data, message? }`.
#[derive(Debug, Deserialize)]
pub struct BirdeyeEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: Option<String>,
}

impl BirdeyeEnvelope {
    pub fn into_data(self) -> Result<Value> {
        if !self.success {
            return Err(Error::ApiError(
                self.message
                    .unwrap_or_else(|| "Birdeye request was not successful".to_string()),
            ));
        }
        if self.data.is_null() {
            return Err(Error::ApiInvalidData("Birdeye response has no data".to_string()));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Deserialize)]
pub struct DexscreenerPairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<Value>>,
}
