//! Second Bounce pattern detection over a token's close/volume history.
//!
//! The detector looks for the all-time high, the deepest trough after it and
//! a recovery from that trough that has settled into a stable run of candles.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::CandleSeries;

/// Dip depth (percent below the high) that qualifies as a dip, inclusive.
pub const DIP_MIN_PERCENT: f64 = 15.0;
pub const DIP_MAX_PERCENT: f64 = 40.0;
/// Recovery from the dip low needed for a bounce.
pub const BOUNCE_MIN_RECOVERY_PERCENT: f64 = 10.0;
/// Stable candles needed after the dip low for a bounce.
pub const BOUNCE_MIN_STABILIZATION: usize = 3;
/// Candle-over-candle change below which a candle counts as stable.
pub const STABLE_CHANGE_PERCENT: f64 = 5.0;
/// Candles inspected after the dip low when counting stabilization.
pub const STABILIZATION_WINDOW: usize = 5;
/// A high this close to the end of the series leaves no room for a dip.
const RECENT_HIGH_CANDLES: usize = 3;
const MIN_POINTS_AFTER_DIP: usize = 3;
const VOLUME_SHIFT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePattern {
    InsufficientData,
    SecondBounce,
    Dip,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumePattern {
    Unknown,
    HighDipVolume,
    IncreasingAfterDip,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub dip_detected: bool,
    pub bounce_detected: bool,
    pub price_pattern: PricePattern,
    pub highest_price: f64,
    pub lowest_price_after_high: f64,
    pub current_price: f64,
    pub dip_percentage: f64,
    pub recovery_percentage: f64,
    pub stabilization_count: usize,
    pub volume_pattern: VolumePattern,
}

impl PatternAnalysis {
    pub fn insufficient_data() -> Self {
        Self {
            dip_detected: false,
            bounce_detected: false,
            price_pattern: PricePattern::InsufficientData,
            highest_price: 0.0,
            lowest_price_after_high: 0.0,
            current_price: 0.0,
            dip_percentage: 0.0,
            recovery_percentage: 0.0,
            stabilization_count: 0,
            volume_pattern: VolumePattern::Unknown,
        }
    }

    pub fn has_history(&self) -> bool {
        self.price_pattern != PricePattern::InsufficientData
    }
}

/// Index and value of the first maximum.
fn first_max(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_idx, best), (idx, &v)| {
            if v > best {
                (idx, v)
            } else {
                (best_idx, best)
            }
        })
}

/// Index and value of the first minimum.
fn first_min(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best_idx, best), (idx, &v)| {
            if v < best {
                (idx, v)
            } else {
                (best_idx, best)
            }
        })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

/// Counts consecutive stable candles after `lowest_idx`, stopping at the first
/// candle that moved by 5% or more or whose previous close is zero. The best
/// run is not searched for: counting ends at the first failure.
fn stabilization_count(closes: &[f64], lowest_idx: usize) -> usize {
    let end = (lowest_idx + STABILIZATION_WINDOW).min(closes.len() - 1);
    let mut count = 0;

    for i in (lowest_idx + 1)..=end {
        let previous = closes[i - 1];
        if previous == 0.0 {
            break;
        }
        let change = (closes[i] - previous) / previous * 100.0;
        if change.abs() < STABLE_CHANGE_PERCENT {
            count += 1;
        } else {
            break;
        }
    }

    count
}

fn classify_volume(volumes: &[f64], highest_idx: usize, lowest_idx: usize) -> VolumePattern {
    if highest_idx > lowest_idx || lowest_idx >= volumes.len() {
        return VolumePattern::Unknown;
    }

    let avg_volume_before_high = if highest_idx == 0 {
        1.0
    } else {
        mean(&volumes[..highest_idx])
    };
    let avg_dip_volume = mean(&volumes[highest_idx..=lowest_idx]);
    let avg_after_dip_volume = mean(&volumes[lowest_idx..]);

    if avg_dip_volume > avg_volume_before_high * VOLUME_SHIFT_FACTOR {
        VolumePattern::HighDipVolume
    } else if avg_after_dip_volume > avg_dip_volume * VOLUME_SHIFT_FACTOR {
        VolumePattern::IncreasingAfterDip
    } else {
        VolumePattern::Normal
    }
}

/// Runs the pattern detector. Fewer than ten candles yields
/// [`PricePattern::InsufficientData`] with every flag cleared.
///
/// The bounce check does not consult the 15-40% dip gate: a 5% dip followed
/// by a stable 10% recovery reports `bounce_detected` with `dip_detected`
/// false. Scorers only award bounce points when both are set.
pub fn detect_pattern(series: &CandleSeries) -> PatternAnalysis {
    if !series.has_minimum() {
        debug!("Pattern detection skipped: {} candles", series.len());
        return PatternAnalysis::insufficient_data();
    }

    let closes = series.closes();
    let volumes = series.volumes();
    let n = closes.len();
    let current_price = closes[n - 1];
    let (highest_idx, highest_price) = first_max(&closes);

    if highest_idx >= n - RECENT_HIGH_CANDLES {
        let (_, overall_low) = first_min(&closes);
        return PatternAnalysis {
            dip_detected: false,
            bounce_detected: false,
            price_pattern: PricePattern::Other,
            highest_price,
            lowest_price_after_high: overall_low,
            current_price,
            dip_percentage: 0.0,
            recovery_percentage: 0.0,
            stabilization_count: 0,
            volume_pattern: VolumePattern::Unknown,
        };
    }

    let (offset, lowest_price_after_high) = first_min(&closes[highest_idx..]);
    let lowest_idx = highest_idx + offset;

    let dip_percentage = if highest_price > 0.0 {
        (highest_price - lowest_price_after_high) / highest_price * 100.0
    } else {
        0.0
    };
    let dip_detected = (DIP_MIN_PERCENT..=DIP_MAX_PERCENT).contains(&dip_percentage);

    let after_dip = &closes[lowest_idx..];
    let (recovery_percentage, stabilization) = if after_dip.len() >= MIN_POINTS_AFTER_DIP {
        let (_, highest_after_dip) = first_max(after_dip);
        let recovery = if lowest_price_after_high > 0.0 {
            (highest_after_dip - lowest_price_after_high) / lowest_price_after_high * 100.0
        } else {
            0.0
        };
        (recovery, stabilization_count(&closes, lowest_idx))
    } else {
        (0.0, 0)
    };

    let bounce_detected = recovery_percentage >= BOUNCE_MIN_RECOVERY_PERCENT
        && stabilization >= BOUNCE_MIN_STABILIZATION;

    let price_pattern = if bounce_detected {
        PricePattern::SecondBounce
    } else if dip_detected {
        PricePattern::Dip
    } else {
        PricePattern::Other
    };

    let volume_pattern = if dip_detected {
        classify_volume(&volumes, highest_idx, lowest_idx)
    } else {
        VolumePattern::Unknown
    };

    debug!(
        "Pattern {:?}: dip {:.1}%, recovery {:.1}%, stable {}, volume {:?}",
        price_pattern, dip_percentage, recovery_percentage, stabilization, volume_pattern
    );

    PatternAnalysis {
        dip_detected,
        bounce_detected,
        price_pattern,
        highest_price,
        lowest_price_after_high,
        current_price,
        dip_percentage,
        recovery_percentage,
        stabilization_count: stabilization,
        volume_pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::{series_from_closes, series_with_volumes};

    #[test]
    fn test_insufficient_data() {
        let analysis = detect_pattern(&series_from_closes(&[1.0, 2.0, 3.0]));
        assert_eq!(analysis.price_pattern, PricePattern::InsufficientData);
        assert!(!analysis.dip_detected);
        assert!(!analysis.bounce_detected);
        assert_eq!(analysis.stabilization_count, 0);
        assert_eq!(analysis.volume_pattern, VolumePattern::Unknown);
    }

    #[test]
    fn test_flat_series_has_no_dip() {
        let analysis = detect_pattern(&series_from_closes(&[1.0; 10]));
        assert_eq!(analysis.price_pattern, PricePattern::Other);
        assert_eq!(analysis.dip_percentage, 0.0);
        assert!(!analysis.dip_detected);
        assert!(!analysis.bounce_detected);
    }

    #[test]
    fn test_recent_high_skips_dip_evaluation() {
        let closes = [5.0, 4.0, 3.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 9.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.highest_price, 10.0);
        assert_eq!(analysis.lowest_price_after_high, 2.0);
        assert_eq!(analysis.dip_percentage, 0.0);
        assert_eq!(analysis.recovery_percentage, 0.0);
        assert_eq!(analysis.price_pattern, PricePattern::Other);
    }

    #[test]
    fn test_high_three_candles_from_end_is_recent() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 10.0, 8.0, 8.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.highest_price, 10.0);
        assert_eq!(analysis.lowest_price_after_high, 1.0);
        assert_eq!(analysis.dip_percentage, 0.0);
        assert!(!analysis.dip_detected);
        assert_eq!(analysis.price_pattern, PricePattern::Other);
    }

    #[test]
    fn test_high_four_candles_from_end_is_evaluated() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 8.0, 8.0, 8.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.lowest_price_after_high, 8.0);
        assert!((analysis.dip_percentage - 20.0).abs() < 1e-9);
        assert!(analysis.dip_detected);
        assert_eq!(analysis.stabilization_count, 2);
        assert_eq!(analysis.price_pattern, PricePattern::Dip);
    }

    #[test]
    fn test_dip_gate_lower_bound_is_inclusive() {
        let closes = [10.0, 20.0, 40.0, 70.0, 100.0, 85.0, 85.0, 85.0, 85.0, 85.0, 85.0, 85.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.dip_percentage, 15.0);
        assert!(analysis.dip_detected);
        assert!(!analysis.bounce_detected);
        assert_eq!(analysis.price_pattern, PricePattern::Dip);
    }

    #[test]
    fn test_dip_just_below_gate() {
        let closes = [10.0, 20.0, 40.0, 70.0, 100.0, 85.1, 85.1, 85.1, 85.1, 85.1, 85.1, 85.1];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!(analysis.dip_percentage < DIP_MIN_PERCENT);
        assert!(analysis.dip_percentage > 14.8);
        assert!(!analysis.dip_detected);
        assert_eq!(analysis.volume_pattern, VolumePattern::Unknown);
        assert_eq!(analysis.price_pattern, PricePattern::Other);
    }

    #[test]
    fn test_low_near_series_end_has_no_recovery() {
        let closes = [1.0, 2.0, 4.0, 10.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 8.0, 8.1];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.lowest_price_after_high, 8.0);
        assert!(analysis.dip_detected);
        assert_eq!(analysis.recovery_percentage, 0.0);
        assert_eq!(analysis.stabilization_count, 0);
        assert!(!analysis.bounce_detected);
        assert_eq!(analysis.price_pattern, PricePattern::Dip);
    }

    #[test]
    fn test_second_bounce() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 6.0, 6.2, 6.3, 6.4, 6.6, 6.9, 6.9];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!(analysis.dip_detected);
        assert!((analysis.dip_percentage - 40.0).abs() < 1e-9);
        assert_eq!(analysis.stabilization_count, 5);
        assert!((analysis.recovery_percentage - 15.0).abs() < 1e-9);
        assert!(analysis.bounce_detected);
        assert_eq!(analysis.price_pattern, PricePattern::SecondBounce);
        assert_eq!(analysis.current_price, 6.9);
    }

    #[test]
    fn test_dip_without_bounce() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 8.0, 7.0, 8.0, 8.0, 8.0, 8.0, 8.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!(analysis.dip_detected);
        // 7 -> 8 is a 14% jump, so stabilization stops immediately.
        assert_eq!(analysis.stabilization_count, 0);
        assert!(!analysis.bounce_detected);
        assert_eq!(analysis.price_pattern, PricePattern::Dip);
    }

    #[test]
    fn test_deep_dip_is_not_a_dip() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!((analysis.dip_percentage - 50.0).abs() < 1e-9);
        assert!(!analysis.dip_detected);
        assert_eq!(analysis.volume_pattern, VolumePattern::Unknown);
    }

    #[test]
    fn test_bounce_without_qualifying_dip() {
        // 12% dip is below the dip gate, but the stable climb back still
        // counts as a bounce.
        let closes = [1.0, 2.0, 4.0, 10.0, 8.8, 9.0, 9.2, 9.4, 9.7, 9.7, 9.7, 9.7];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!(analysis.dip_percentage < DIP_MIN_PERCENT);
        assert!(!analysis.dip_detected);
        assert!(analysis.recovery_percentage >= BOUNCE_MIN_RECOVERY_PERCENT);
        assert_eq!(analysis.stabilization_count, 5);
        assert!(analysis.bounce_detected);
        assert_eq!(analysis.price_pattern, PricePattern::SecondBounce);
    }

    #[test]
    fn test_stabilization_breaks_on_first_spike() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 7.0, 7.1, 8.0, 8.0, 8.0, 8.0, 8.0];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.stabilization_count, 1);
        assert!(!analysis.bounce_detected);
    }

    #[test]
    fn test_stabilization_capped_at_series_end() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 10.0, 8.0, 8.1, 8.2, 8.3];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert!(analysis.dip_detected);
        assert_eq!(analysis.stabilization_count, 3);
    }

    #[test]
    fn test_high_dip_volume() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 8.0, 7.0, 7.1, 7.2, 7.3, 7.3, 7.3];
        let volumes = [10.0, 10.0, 10.0, 10.0, 30.0, 30.0, 30.0, 5.0, 5.0, 5.0, 5.0, 5.0];
        let analysis = detect_pattern(&series_with_volumes(&closes, &volumes));
        assert!(analysis.dip_detected);
        assert_eq!(analysis.volume_pattern, VolumePattern::HighDipVolume);
    }

    #[test]
    fn test_increasing_after_dip_volume() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 8.0, 7.0, 7.1, 7.2, 7.3, 7.3, 7.3];
        let volumes = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 40.0, 40.0, 40.0, 40.0, 40.0];
        let analysis = detect_pattern(&series_with_volumes(&closes, &volumes));
        assert_eq!(analysis.volume_pattern, VolumePattern::IncreasingAfterDip);
    }

    #[test]
    fn test_normal_volume() {
        let closes = [1.0, 2.0, 4.0, 7.0, 10.0, 8.0, 7.0, 7.1, 7.2, 7.3, 7.3, 7.3];
        let analysis = detect_pattern(&series_with_volumes(&closes, &[10.0; 12]));
        assert_eq!(analysis.volume_pattern, VolumePattern::Normal);
    }

    #[test]
    fn test_zero_prices_do_not_divide() {
        let closes = [0.0; 12];
        let analysis = detect_pattern(&series_from_closes(&closes));
        assert_eq!(analysis.dip_percentage, 0.0);
        assert_eq!(analysis.recovery_percentage, 0.0);
        assert_eq!(analysis.stabilization_count, 0);
    }
}
