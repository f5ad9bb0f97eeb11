//! Tracking of earlier calls: the market cap a token was flagged at versus
//! where it trades now.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::extract_token_metrics;
use crate::api::TokenDataProvider;
use crate::error::Result;
use crate::utils::format::{format_market_cap, format_multiple, format_percent, symbol_tag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub address: String,
    pub symbol: String,
    pub entry_market_cap: f64,
    pub called_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallPerformance {
    pub call: Call,
    pub current_market_cap: f64,
    pub multiple: f64,
    pub pnl_percent: f64,
}

impl CallPerformance {
    pub fn compute(call: &Call, current_market_cap: f64) -> Self {
        let multiple = if call.entry_market_cap > 0.0 {
            current_market_cap / call.entry_market_cap
        } else {
            0.0
        };
        Self {
            call: call.clone(),
            current_market_cap,
            multiple,
            pnl_percent: (multiple - 1.0) * 100.0,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.multiple > 1.0
    }

    /// Days between the call and `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.call.called_at).num_days()
    }

    pub fn display_row(&self) -> String {
        format!(
            "{:<10} entry {:>9}  now {:>9}  {:>7}  {:>8}",
            symbol_tag(&self.call.symbol),
            format_market_cap(self.call.entry_market_cap),
            format_market_cap(self.current_market_cap),
            format_multiple(self.multiple),
            format_percent(self.pnl_percent),
        )
    }
}

/// Looks up the current market cap of every call. A call whose token can no
/// longer be fetched is logged and left out.
pub async fn track_calls<P: TokenDataProvider + ?Sized>(provider: &P, calls: &[Call]) -> Vec<CallPerformance> {
    let mut performances = Vec::with_capacity(calls.len());
    for call in calls {
        match current_market_cap(provider, call).await {
            Ok(market_cap) => performances.push(CallPerformance::compute(call, market_cap)),
            Err(e) => warn!("Could not refresh call {} ({}): {}", call.symbol, call.address, e),
        }
    }
    performances
}

async fn current_market_cap<P: TokenDataProvider + ?Sized>(provider: &P, call: &Call) -> Result<f64> {
    let record = provider.fetch_token(&call.address).await?;
    Ok(extract_token_metrics(&record, &call.address).market_cap)
}
