use log::debug;
use serde_json::Value;

use super::extractor::coerce_f64;
use crate::models::{Candle, CandleSeries};

const TIME_KEYS: &[&str] = &["time", "unixTime", "timestamp"];
const CLOSE_KEYS: &[&str] = &["close", "c"];
const VOLUME_KEYS: &[&str] = &["volume", "v"];

fn first_number(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| !value.is_null())
        .and_then(coerce_f64)
}

/// Locates the candle array inside the payload shapes the providers return:
/// a bare array, `{items: [...]}`, `{oclhv: [...]}` or `{data: {items: [...]}}`.
fn candle_records(payload: &Value) -> &[Value] {
    if let Some(records) = payload.as_array() {
        return records;
    }
    for key in ["items", "oclhv", "candles"] {
        if let Some(records) = payload.get(key).and_then(Value::as_array) {
            return records;
        }
    }
    match payload.get("data") {
        Some(data) if !data.is_null() => candle_records(data),
        _ => &[],
    }
}

/// Converts one raw record. A record without a usable time cannot be
/// ordered and yields `None`; an unreadable close or volume is `0.0`.
pub fn parse_candle(record: &Value) -> Option<Candle> {
    let timestamp = first_number(record, TIME_KEYS)? as i64;
    let close = first_number(record, CLOSE_KEYS).unwrap_or(0.0);
    let volume = first_number(record, VOLUME_KEYS).unwrap_or(0.0);

    Some(Candle {
        timestamp,
        close: close.max(0.0),
        volume: volume.max(0.0),
    })
}

/// Builds a chronologically sorted [`CandleSeries`] from a raw price-history
/// payload. Never fails: unreadable payloads give an empty series, which the
/// pattern detector reports as insufficient data.
pub fn normalize_candles(payload: &Value) -> CandleSeries {
    let records = candle_records(payload);
    let candles: Vec<Candle> = records.iter().filter_map(parse_candle).collect();

    if candles.len() < records.len() {
        debug!(
            "Dropped {} candle records without a time",
            records.len() - candles.len()
        );
    }

    CandleSeries::new(candles)
}
