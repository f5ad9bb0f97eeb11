use serde_json::{json, Value};

use crate::analysis::{PatternAnalysis, PricePattern, VolumePattern};
use crate::models::{Candle, CandleSeries, TokenMetrics};

/// 15-minute candles.
pub const CANDLE_SPACING_SECS: i64 = 900;

pub fn series_from_closes(closes: &[f64]) -> CandleSeries {
    series_with_volumes(closes, &vec![100.0; closes.len()])
}

pub fn series_with_volumes(closes: &[f64], volumes: &[f64]) -> CandleSeries {
    let candles = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Candle {
            timestamp: i as i64 * CANDLE_SPACING_SECS,
            close,
            volume,
        })
        .collect();
    CandleSeries::new(candles)
}

/// A 40% dip followed by five stable candles and a 53% recovery.
pub fn bounce_series() -> CandleSeries {
    series_from_closes(&[1.0, 2.0, 4.0, 7.0, 10.0, 6.0, 6.2, 6.4, 6.6, 6.8, 7.0, 9.2, 9.0])
}

/// Metrics with the two ratios set directly and every price change at zero.
pub fn metrics_with_ratios(volume_ratio: f64, liquidity_ratio: f64) -> TokenMetrics {
    let market_cap = 1_000_000.0;
    TokenMetrics {
        address: "TestMint1111111111111111111111111111111111".to_string(),
        symbol: "TEST".to_string(),
        name: "Test Token".to_string(),
        market_cap,
        liquidity: market_cap * liquidity_ratio,
        price: 0.001,
        volume_24h: market_cap * volume_ratio,
        volume_to_mcap_ratio: volume_ratio,
        liquidity_to_mcap_ratio: liquidity_ratio,
        ..TokenMetrics::default()
    }
}

pub fn pattern_fixture(dip: bool, bounce: bool) -> PatternAnalysis {
    let price_pattern = if bounce {
        PricePattern::SecondBounce
    } else if dip {
        PricePattern::Dip
    } else {
        PricePattern::Other
    };

    PatternAnalysis {
        dip_detected: dip,
        bounce_detected: bounce,
        price_pattern,
        highest_price: 10.0,
        lowest_price_after_high: 7.0,
        current_price: 7.0,
        dip_percentage: if dip { 30.0 } else { 0.0 },
        recovery_percentage: if bounce { 12.0 } else { 0.0 },
        stabilization_count: if bounce { 3 } else { 0 },
        volume_pattern: if dip {
            VolumePattern::Normal
        } else {
            VolumePattern::Unknown
        },
    }
}

/// A raw token record shaped like a Birdeye overview payload.
pub fn token_record(address: &str, symbol: &str, market_cap: f64, liquidity: f64, volume: f64) -> Value {
    json!({
        "address": address,
        "symbol": symbol,
        "name": format!("{} Token", symbol),
        "mc": market_cap,
        "liquidity": liquidity,
        "price": 0.001,
        "v24h": volume,
        "priceChange1hPercent": -3.0,
        "priceChange24hPercent": 12.0
    })
}

/// A raw `{ "data": { "items": [...] } }` price-history payload.
pub fn candle_payload(closes: &[f64]) -> Value {
    let items: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            json!({
                "unixTime": i as i64 * CANDLE_SPACING_SECS,
                "c": close,
                "v": 100.0
            })
        })
        .collect();
    json!({ "data": { "items": items } })
}
