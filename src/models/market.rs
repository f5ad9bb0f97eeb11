use serde::{Deserialize, Serialize};

/// Minimum number of candles the pattern detector needs.
pub const MIN_CANDLES: usize = 10;

/// Canonical token metrics built from a raw upstream token record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub market_cap: f64,
    pub liquidity: f64,
    pub price: f64,
    pub volume_24h: f64,
    pub price_change_1h: f64,
    pub price_change_4h: f64,
    pub price_change_12h: f64,
    pub price_change_24h: f64,
    pub volume_to_mcap_ratio: f64,
    pub liquidity_to_mcap_ratio: f64,
}

impl TokenMetrics {
    /// Builds metrics and derives the market-cap ratios. Ratios stay 0 when
    /// the market cap is not positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: String,
        symbol: String,
        name: String,
        market_cap: f64,
        liquidity: f64,
        price: f64,
        volume_24h: f64,
        price_changes: [f64; 4],
    ) -> Self {
        let (volume_to_mcap_ratio, liquidity_to_mcap_ratio) = if market_cap > 0.0 {
            (volume_24h / market_cap, liquidity / market_cap)
        } else {
            (0.0, 0.0)
        };

        Self {
            address,
            symbol,
            name,
            market_cap,
            liquidity,
            price,
            volume_24h,
            price_change_1h: price_changes[0],
            price_change_4h: price_changes[1],
            price_change_12h: price_changes[2],
            price_change_24h: price_changes[3],
            volume_to_mcap_ratio,
            liquidity_to_mcap_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix seconds
    pub timestamp: i64,
    pub close: f64,
    pub volume: f64,
}

/// Candles in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Sorts the given candles by timestamp. The sort is stable, so candles
    /// sharing a timestamp keep their input order.
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self { candles }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn has_minimum(&self) -> bool {
        self.candles.len() >= MIN_CANDLES
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}
