//! The four sub-scorers. Each is a pure function of its inputs and returns a
//! bounded score together with the reasons that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pattern::{PatternAnalysis, VolumePattern};
use crate::models::TokenMetrics;

pub const PATTERN_WEIGHT: u32 = 40;
pub const VOLUME_WEIGHT: u32 = 35;
pub const TIMEFRAME_WEIGHT: u32 = 15;
pub const RUGPULL_WEIGHT: u32 = 10;
pub const TOTAL_WEIGHT: u32 = PATTERN_WEIGHT + VOLUME_WEIGHT + TIMEFRAME_WEIGHT + RUGPULL_WEIGHT;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: u32,
    pub reasons: Vec<String>,
}

impl SubScore {
    fn new(score: u32, reasons: Vec<String>) -> Self {
        Self { score, reasons }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeTrend {
    #[serde(rename = "↑↑")]
    StrongUp,
    #[serde(rename = "↑")]
    Up,
    #[serde(rename = "→")]
    Flat,
    #[serde(rename = "↓")]
    Down,
    #[serde(rename = "↓↓")]
    StrongDown,
}

impl VolumeTrend {
    pub fn glyph(&self) -> &'static str {
        match self {
            VolumeTrend::StrongUp => "↑↑",
            VolumeTrend::Up => "↑",
            VolumeTrend::Flat => "→",
            VolumeTrend::Down => "↓",
            VolumeTrend::StrongDown => "↓↓",
        }
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, VolumeTrend::StrongUp | VolumeTrend::Up)
    }

    /// Capitulation volume lifts a flat or falling trend by one notch.
    fn upgraded(self) -> Self {
        match self {
            VolumeTrend::Flat => VolumeTrend::Up,
            VolumeTrend::Down => VolumeTrend::Flat,
            other => other,
        }
    }
}

impl fmt::Display for VolumeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Scores the price pattern (max 40).
pub fn pattern_score(pattern: &PatternAnalysis) -> SubScore {
    if !pattern.has_history() {
        return SubScore::new(
            0,
            vec!["Insufficient historical data for pattern analysis".to_string()],
        );
    }

    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    if pattern.dip_detected {
        score += 15;
        reasons.push(format!(
            "Dip of {:.1}% after high (ideal range 15-40%)",
            pattern.dip_percentage
        ));

        if pattern.stabilization_count >= 3 {
            let bonus = ((pattern.stabilization_count as u32 - 2) * 5).min(10);
            score += bonus;
            reasons.push(format!(
                "Price stabilized for {} candles (+{})",
                pattern.stabilization_count, bonus
            ));
        } else {
            reasons.push(format!(
                "Insufficient stabilization ({} candles)",
                pattern.stabilization_count
            ));
        }

        if pattern.bounce_detected {
            let bonus = (5 + (pattern.recovery_percentage / 5.0).floor() as u32).min(15);
            score += bonus;
            reasons.push(format!(
                "Second bounce: {:.1}% recovery from dip low (+{})",
                pattern.recovery_percentage, bonus
            ));
        } else {
            reasons.push("No clear bounce yet".to_string());
        }
    } else if pattern.dip_percentage > 40.0 {
        score = 5;
        reasons.push(format!(
            "Dip too deep ({:.1}%) - higher risk",
            pattern.dip_percentage
        ));
    } else if pattern.dip_percentage > 0.0 {
        score = 5;
        reasons.push(format!(
            "Dip too shallow ({:.1}%) - weak signal",
            pattern.dip_percentage
        ));
    } else {
        reasons.push("No significant dip after high".to_string());
    }

    SubScore::new(score.min(PATTERN_WEIGHT), reasons)
}

/// Ratio ladder for volume/market-cap, evaluated top-down.
const VOLUME_LADDER: &[(f64, u32, VolumeTrend, &str)] = &[
    (0.30, 35, VolumeTrend::StrongUp, "Exceptional volume"),
    (0.20, 30, VolumeTrend::Up, "Very high volume"),
    (0.10, 25, VolumeTrend::Up, "High volume"),
    (0.05, 20, VolumeTrend::Up, "Good volume"),
    (0.02, 15, VolumeTrend::Flat, "Moderate volume"),
];

/// Scores 24h volume relative to market cap (max 35) and derives the volume
/// trend shown next to the result.
pub fn volume_score(metrics: &TokenMetrics, pattern: &PatternAnalysis) -> (SubScore, VolumeTrend) {
    let ratio = metrics.volume_to_mcap_ratio;
    let percent = ratio * 100.0;
    let mut reasons = Vec::new();

    let (mut score, mut trend) = match VOLUME_LADDER.iter().find(|(min, ..)| ratio >= *min) {
        Some((_, points, trend, label)) => {
            reasons.push(format!("{}: {:.1}% of MCAP", label, percent));
            (*points, *trend)
        }
        None if ratio > 0.0 => {
            reasons.push(format!("Low volume: {:.1}% of MCAP", percent));
            (10, VolumeTrend::Down)
        }
        None => {
            reasons.push("No trading volume".to_string());
            (0, VolumeTrend::StrongDown)
        }
    };

    match pattern.volume_pattern {
        VolumePattern::HighDipVolume => {
            let bonus = 5u32.min(VOLUME_WEIGHT - score);
            score += bonus;
            trend = trend.upgraded();
            reasons.push(format!("High volume during dip - capitulation (+{})", bonus));
        }
        VolumePattern::IncreasingAfterDip => {
            let bonus = 3u32.min(VOLUME_WEIGHT - score);
            score += bonus;
            reasons.push(format!("Volume increasing after dip (+{})", bonus));
        }
        VolumePattern::Normal | VolumePattern::Unknown => {}
    }

    (SubScore::new(score, reasons), trend)
}

/// Scores short-term versus long-term price divergence (max 15).
pub fn timeframe_score(metrics: &TokenMetrics, pattern: &PatternAnalysis) -> SubScore {
    let change_1h = metrics.price_change_1h;
    let short_term_negative = change_1h < -2.0;
    let long_term_positive = metrics.price_change_12h > 0.0 || metrics.price_change_24h > 0.0;
    let mut reasons = Vec::new();

    let mut score: u32 = if short_term_negative && long_term_positive {
        reasons.push(format!(
            "Ideal divergence: 1h {:.1}% while 12h/24h positive",
            change_1h
        ));
        15
    } else if change_1h <= 0.0 && long_term_positive {
        reasons.push(format!(
            "Slight short-term pullback (1h {:.1}%) in uptrend",
            change_1h
        ));
        10
    } else if change_1h > 0.0 && long_term_positive {
        reasons.push(format!(
            "Rising on all timeframes (1h +{:.1}%) - possibly late",
            change_1h
        ));
        5
    } else if !long_term_positive {
        reasons.push(format!(
            "Long-term downtrend (12h {:.1}%, 24h {:.1}%)",
            metrics.price_change_12h, metrics.price_change_24h
        ));
        0
    } else {
        reasons.push("Inconsistent timeframe signals".to_string());
        2
    };

    if pattern.dip_detected && pattern.current_price > pattern.lowest_price_after_high {
        score = (score + 3).min(TIMEFRAME_WEIGHT);
        reasons.push("Price recovering from dip low (+3)".to_string());
    }

    SubScore::new(score, reasons)
}

const LIQUIDITY_LADDER: &[(f64, u32, &str)] = &[
    (0.30, 10, "Excellent liquidity"),
    (0.20, 8, "Strong liquidity"),
    (0.10, 6, "Adequate liquidity"),
    (0.05, 4, "Low liquidity"),
    (0.02, 2, "Thin liquidity - elevated rugpull risk"),
];

/// Scores liquidity relative to market cap as a rugpull-safety proxy (max 10).
pub fn rugpull_score(metrics: &TokenMetrics) -> SubScore {
    let ratio = metrics.liquidity_to_mcap_ratio;
    let percent = ratio * 100.0;

    match LIQUIDITY_LADDER.iter().find(|(min, ..)| ratio >= *min) {
        Some((_, points, label)) => SubScore::new(
            *points,
            vec![format!("{}: {:.1}% of MCAP", label, percent)],
        ),
        None => SubScore::new(
            0,
            vec![format!(
                "Very low liquidity — rugpull risk ({:.1}% of MCAP)",
                percent
            )],
        ),
    }
}
