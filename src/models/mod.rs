pub mod market;

pub use market::{Candle, CandleSeries, TokenMetrics, MIN_CANDLES};
