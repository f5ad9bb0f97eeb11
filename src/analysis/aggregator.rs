//! Combines sub-scores into the final verdict: total score, potential
//! multiple and the main reason.
//!
//! The potential adjustments and the main reason are ordered rule lists
//! evaluated first-match-wins, so every rule can be tested on its own.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scoring::VolumeTrend;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pattern: u32,
    pub volume: u32,
    pub timeframe: u32,
    pub rugpull: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    pub fn new(pattern: u32, volume: u32, timeframe: u32, rugpull: u32) -> Self {
        Self {
            pattern,
            volume,
            timeframe,
            rugpull,
            total: pattern + volume + timeframe + rugpull,
        }
    }
}

/// Expected upside tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Potential {
    OneX,
    OneAndHalfX,
    TwoX,
    ThreeX,
    FiveX,
    SevenX,
    TenX,
}

impl Potential {
    pub fn multiple(&self) -> &'static str {
        match self {
            Potential::OneX => "1X",
            Potential::OneAndHalfX => "1.5X",
            Potential::TwoX => "2X",
            Potential::ThreeX => "3X",
            Potential::FiveX => "5X",
            Potential::SevenX => "7X",
            Potential::TenX => "10X",
        }
    }

    pub fn label(&self) -> String {
        format!("→{}", self.multiple())
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let multiple = label.trim_start_matches('→');
        BASE_POTENTIAL
            .iter()
            .map(|(_, potential)| *potential)
            .chain(std::iter::once(Potential::OneX))
            .find(|potential| potential.multiple() == multiple)
    }
}

impl fmt::Display for Potential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "→{}", self.multiple())
    }
}

impl Serialize for Potential {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Potential {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Potential::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown potential label: {}", label)))
    }
}

/// Minimum total score for each tier, top-down. Anything below is 1X.
pub const BASE_POTENTIAL: &[(u32, Potential)] = &[
    (90, Potential::TenX),
    (85, Potential::SevenX),
    (80, Potential::FiveX),
    (75, Potential::ThreeX),
    (70, Potential::TwoX),
    (60, Potential::OneAndHalfX),
];

pub fn base_potential(total: u32) -> Potential {
    BASE_POTENTIAL
        .iter()
        .find(|(min, _)| total >= *min)
        .map(|(_, potential)| *potential)
        .unwrap_or(Potential::OneX)
}

/// Inputs the adjustment and main-reason rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub scores: ScoreBreakdown,
    pub dip_detected: bool,
    pub bounce_detected: bool,
    pub volume_trend: VolumeTrend,
}

pub struct Rule<T> {
    pub name: &'static str,
    pub applies: fn(&Verdict) -> bool,
    pub outcome: T,
}

/// Returns the outcome of the first rule whose predicate holds.
pub fn first_match<T: Copy>(rules: &[Rule<T>], verdict: &Verdict) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find(|rule| (rule.applies)(verdict))
        .map(|rule| (rule.name, rule.outcome))
}

type Adjustment = fn(Potential) -> Potential;

fn bounce_upgrade(potential: Potential) -> Potential {
    match potential {
        Potential::FiveX => Potential::SevenX,
        Potential::ThreeX => Potential::FiveX,
        Potential::TwoX => Potential::ThreeX,
        other => other,
    }
}

fn dip_upgrade(potential: Potential) -> Potential {
    match potential {
        Potential::ThreeX => Potential::FiveX,
        Potential::TwoX => Potential::ThreeX,
        Potential::OneAndHalfX => Potential::TwoX,
        other => other,
    }
}

fn dead_volume(_: Potential) -> Potential {
    Potential::OneX
}

/// Adjustments to the base tier. Only the first matching rule applies.
pub const POTENTIAL_ADJUSTMENTS: &[Rule<Adjustment>] = &[
    Rule {
        name: "bounce_with_rising_volume",
        applies: |v| v.bounce_detected && v.volume_trend.is_rising() && v.scores.total >= 75,
        outcome: bounce_upgrade,
    },
    Rule {
        name: "dip_with_rising_volume",
        applies: |v| {
            v.dip_detected && !v.bounce_detected && v.volume_trend.is_rising() && v.scores.total >= 70
        },
        outcome: dip_upgrade,
    },
    Rule {
        name: "dead_volume",
        applies: |v| v.volume_trend == VolumeTrend::StrongDown && v.scores.total < 75,
        outcome: dead_volume,
    },
];

pub fn potential(verdict: &Verdict) -> Potential {
    let base = base_potential(verdict.scores.total);
    match first_match(POTENTIAL_ADJUSTMENTS, verdict) {
        Some((_, adjust)) => adjust(base),
        None => base,
    }
}

pub const MAIN_REASONS: &[Rule<&str>] = &[
    Rule {
        name: "excellent_bounce",
        applies: |v| v.scores.total >= 85 && v.bounce_detected && v.volume_trend.is_rising(),
        outcome: "Second Bounce with strong volume",
    },
    Rule {
        name: "excellent_pattern_volume",
        applies: |v| v.scores.total >= 85 && v.scores.pattern >= 30 && v.scores.volume >= 25,
        outcome: "Optimal price/volume pattern",
    },
    Rule {
        name: "excellent",
        applies: |v| v.scores.total >= 85,
        outcome: "Excellent overall scores",
    },
    Rule {
        name: "good_dip",
        applies: |v| v.scores.total >= 70 && v.dip_detected && !v.bounce_detected,
        outcome: "Dip detected — potential entry point",
    },
    Rule {
        name: "good_bounce",
        applies: |v| v.scores.total >= 70 && v.bounce_detected,
        outcome: "Second Bounce in progress",
    },
    Rule {
        name: "good_volume",
        applies: |v| v.scores.total >= 70 && v.scores.volume >= 25,
        outcome: "Strong trading volume",
    },
    Rule {
        name: "good",
        applies: |v| v.scores.total >= 70,
        outcome: "Solid overall scores",
    },
    Rule {
        name: "rugpull_risk",
        applies: |v| v.scores.rugpull <= 2,
        outcome: "High rugpull risk",
    },
    Rule {
        name: "low_volume",
        applies: |v| v.scores.volume < 15,
        outcome: "Volume too low",
    },
    Rule {
        name: "no_pattern",
        applies: |v| v.scores.pattern < 10,
        outcome: "No clear price pattern",
    },
    Rule {
        name: "weak_dip",
        applies: |v| v.dip_detected && v.scores.volume < 20,
        outcome: "Dip with weak volume",
    },
];

pub const FALLBACK_REASON: &str = "Insufficient overall scores";

pub fn main_reason(verdict: &Verdict) -> &'static str {
    first_match(MAIN_REASONS, verdict)
        .map(|(_, reason)| reason)
        .unwrap_or(FALLBACK_REASON)
}
