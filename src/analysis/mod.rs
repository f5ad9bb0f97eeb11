//! Second Bounce token evaluation.
//!
//! Raw token record -> [`extractor`] -> [`TokenMetrics`]; raw price history ->
//! [`candles`] -> [`pattern`]; both feed the [`scoring`] functions, and
//! [`aggregator`] turns the sub-scores into the final [`AnalysisResult`].
//! Nothing in here performs I/O or keeps state between calls.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{CandleSeries, TokenMetrics};
use crate::utils::format::{format_market_cap, symbol_tag};

pub mod aggregator;
pub mod candles;
pub mod extractor;
pub mod pattern;
pub mod scoring;

pub use aggregator::{Potential, ScoreBreakdown, Verdict};
pub use candles::normalize_candles;
pub use extractor::extract_token_metrics;
pub use pattern::{detect_pattern, PatternAnalysis, PricePattern, VolumePattern};
pub use scoring::{SubScore, VolumeTrend, TOTAL_WEIGHT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub address: String,
    pub metrics: TokenMetrics,
    pub scores: ScoreBreakdown,
    /// Pattern reasons, then volume, timeframe and rugpull reasons.
    pub reasons: Vec<String>,
    pub potential: Potential,
    pub main_reason: String,
    pub dip_detected: bool,
    pub bounce_detected: bool,
    pub volume_trend: VolumeTrend,
    pub pattern: PatternAnalysis,
}

/// One display row: symbol, market cap, score, potential, volume trend and
/// main reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub symbol: String,
    pub market_cap: String,
    pub score: String,
    pub potential: String,
    pub volume_trend: String,
    pub main_reason: String,
}

impl ResultSummary {
    pub fn as_tuple(&self) -> (&str, &str, &str, &str, &str, &str) {
        (
            &self.symbol,
            &self.market_cap,
            &self.score,
            &self.potential,
            &self.volume_trend,
            &self.main_reason,
        )
    }
}

impl AnalysisResult {
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            symbol: symbol_tag(&self.metrics.symbol),
            market_cap: format_market_cap(self.metrics.market_cap),
            score: format!("{}/{}", self.scores.total, TOTAL_WEIGHT),
            potential: self.potential.label(),
            volume_trend: self.volume_trend.glyph().to_string(),
            main_reason: self.main_reason.clone(),
        }
    }
}

/// Stateless scorer for the Second Bounce strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenEvaluator;

impl TokenEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Scores already normalised inputs. `None` history is treated like a
    /// short one: the pattern score is zero and the other scorers still run.
    pub fn evaluate(&self, metrics: &TokenMetrics, history: Option<&CandleSeries>) -> AnalysisResult {
        let pattern = match history {
            Some(series) => detect_pattern(series),
            None => PatternAnalysis::insufficient_data(),
        };
        self.evaluate_with_pattern(metrics, pattern)
    }

    /// Scores a raw token record and an optional raw price-history payload.
    pub fn evaluate_raw(&self, address: &str, token: &Value, history: Option<&Value>) -> AnalysisResult {
        let metrics = extract_token_metrics(token, address);
        let series = history.map(normalize_candles);
        self.evaluate(&metrics, series.as_ref())
    }

    pub fn evaluate_with_pattern(&self, metrics: &TokenMetrics, pattern: PatternAnalysis) -> AnalysisResult {
        let pattern_part = scoring::pattern_score(&pattern);
        let (volume_part, volume_trend) = scoring::volume_score(metrics, &pattern);
        let timeframe_part = scoring::timeframe_score(metrics, &pattern);
        let rugpull_part = scoring::rugpull_score(metrics);

        let scores = ScoreBreakdown::new(
            pattern_part.score,
            volume_part.score,
            timeframe_part.score,
            rugpull_part.score,
        );

        let verdict = Verdict {
            scores,
            dip_detected: pattern.dip_detected,
            bounce_detected: pattern.bounce_detected,
            volume_trend,
        };
        let potential = aggregator::potential(&verdict);
        let main_reason = aggregator::main_reason(&verdict).to_string();

        let reasons = [pattern_part, volume_part, timeframe_part, rugpull_part]
            .into_iter()
            .flat_map(|part| part.reasons)
            .collect();

        debug!(
            "Scored {} ({}): {} -> {} ({})",
            metrics.symbol, metrics.address, scores.total, potential, main_reason
        );

        AnalysisResult {
            address: metrics.address.clone(),
            metrics: metrics.clone(),
            scores,
            reasons,
            potential,
            main_reason,
            dip_detected: pattern.dip_detected,
            bounce_detected: pattern.bounce_detected,
            volume_trend,
            pattern,
        }
    }
}
