//! Normalises raw token records from the different upstream APIs into
//! [`TokenMetrics`].
//!
//! Providers spell the same field differently (`priceChange1h` vs
//! `price_change_1h`, `mc` vs `marketCap`). Each canonical field maps to an
//! ordered list of accepted keys; the first key present with a non-null value
//! wins. Values that cannot be read as numbers become `0.0`.

use serde_json::Value;

use crate::models::TokenMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenField {
    Address,
    Symbol,
    Name,
    MarketCap,
    Liquidity,
    Price,
    Volume24h,
    PriceChange1h,
    PriceChange4h,
    PriceChange12h,
    PriceChange24h,
}

pub const FIELD_ALIASES: &[(TokenField, &[&str])] = &[
    (TokenField::Address, &["address", "tokenAddress", "mint"]),
    (TokenField::Symbol, &["symbol"]),
    (TokenField::Name, &["name"]),
    (TokenField::MarketCap, &["mc", "marketCap", "market_cap", "fdv"]),
    (TokenField::Liquidity, &["liquidity", "liquidityUsd", "liquidity_usd"]),
    (TokenField::Price, &["price", "priceUsd", "price_usd"]),
    (TokenField::Volume24h, &["v24h", "volume_24h", "v24hUSD", "volume24h"]),
    (TokenField::PriceChange1h, &["priceChange1h", "price_change_1h", "priceChange1hPercent"]),
    (TokenField::PriceChange4h, &["priceChange4h", "price_change_4h", "priceChange4hPercent"]),
    (TokenField::PriceChange12h, &["priceChange12h", "price_change_12h", "priceChange12hPercent"]),
    (TokenField::PriceChange24h, &["priceChange24h", "price_change_24h", "priceChange24hPercent"]),
];

pub fn aliases(field: TokenField) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Returns the value stored under the first accepted key for `field`.
pub fn resolve(record: &Value, field: TokenField) -> Option<&Value> {
    aliases(field)
        .iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
}

/// Numeric coercion shared by the extractor and the candle normaliser.
/// Accepts JSON numbers and numeric strings; anything else, including
/// non-finite results, is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn number_field(record: &Value, field: TokenField) -> f64 {
    resolve(record, field).and_then(coerce_f64).unwrap_or(0.0)
}

fn text_field(record: &Value, field: TokenField) -> Option<String> {
    match resolve(record, field)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Builds [`TokenMetrics`] from a raw token record. `fallback_address` is used
/// when the record itself carries no address.
pub fn extract_token_metrics(record: &Value, fallback_address: &str) -> TokenMetrics {
    let address = text_field(record, TokenField::Address)
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| fallback_address.to_string());

    TokenMetrics::new(
        address,
        text_field(record, TokenField::Symbol).unwrap_or_default(),
        text_field(record, TokenField::Name).unwrap_or_default(),
        number_field(record, TokenField::MarketCap),
        number_field(record, TokenField::Liquidity),
        number_field(record, TokenField::Price),
        number_field(record, TokenField::Volume24h),
        [
            number_field(record, TokenField::PriceChange1h),
            number_field(record, TokenField::PriceChange4h),
            number_field(record, TokenField::PriceChange12h),
            number_field(record, TokenField::PriceChange24h),
        ],
    )
}
