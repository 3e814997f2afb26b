// ABOUTME: Anthropometric indicators, WHO reference rows, and per-indicator z-score results
// ABOUTME: Z-scores are typed nullable numbers; formatting happens only at the edge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// WHO growth indicator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Height (length) for age, keyed by age in months
    HeightForAge,
    /// Weight for age, keyed by age in months
    WeightForAge,
    /// Weight for height, keyed by height in 0.5 cm steps
    WeightForHeight,
    /// Mid-upper-arm circumference for age, keyed by age in months
    MuacForAge,
}

impl Indicator {
    /// All indicators in diagnosis order
    pub const ALL: [Self; 4] = [
        Self::HeightForAge,
        Self::WeightForAge,
        Self::WeightForHeight,
        Self::MuacForAge,
    ];

    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HeightForAge => "height_for_age",
            Self::WeightForAge => "weight_for_age",
            Self::WeightForHeight => "weight_for_height",
            Self::MuacForAge => "muac_for_age",
        }
    }

    /// Whether reference rows for this indicator are keyed by age
    #[must_use]
    pub const fn is_age_based(&self) -> bool {
        !matches!(self, Self::WeightForHeight)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a WHO reference table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceRow {
    /// Population median
    pub median: f64,
    /// Value at -3 SD
    pub minus_3sd: f64,
    /// Value at -2 SD
    pub minus_2sd: f64,
    /// Value at +2 SD
    pub plus_2sd: f64,
    /// Value at +3 SD
    pub plus_3sd: f64,
}

impl ReferenceRow {
    /// Whether the SD cut-offs are finite and strictly ascending
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let values = [
            self.minus_3sd,
            self.minus_2sd,
            self.median,
            self.plus_2sd,
            self.plus_3sd,
        ];
        values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[0] < w[1])
    }
}

/// Categorical label for a z-score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrowthCategory {
    /// Height-for-age at or below -3 SD
    VeryShort,
    /// Height-for-age at or below -2 SD
    Short,
    /// Within the normal band
    Normal,
    /// Height-for-age at or above +2 SD
    Tall,
    /// Height-for-age at or above the configured very-tall cut-off
    VeryTall,
    /// Weight-for-age at or below -3 SD
    SeverelyUnderweight,
    /// Weight-for-age at or below -2 SD
    Underweight,
    /// Weight-for-age or weight-for-height at or above +2 SD
    Overweight,
    /// Weight-for-age or weight-for-height at or above +3 SD
    Obese,
    /// Weight-for-height at or below -3 SD
    SeverelyWasted,
    /// Weight-for-height at or below -2 SD
    Wasted,
    /// MUAC at or below -3 SD
    SeverelyLow,
    /// MUAC at or below -2 SD
    Low,
    /// MUAC at or above +2 SD
    AboveNormal,
    /// Reference data or measurement unavailable
    Unknown,
}

impl GrowthCategory {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VeryShort => "very_short",
            Self::Short => "short",
            Self::Normal => "normal",
            Self::Tall => "tall",
            Self::VeryTall => "very_tall",
            Self::SeverelyUnderweight => "severely_underweight",
            Self::Underweight => "underweight",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
            Self::SeverelyWasted => "severely_wasted",
            Self::Wasted => "wasted",
            Self::SeverelyLow => "severely_low",
            Self::Low => "low",
            Self::AboveNormal => "above_normal",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GrowthCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Z-score outcome for a single indicator
///
/// `z_score` is `None` when the measurement or the matching reference row is
/// unavailable. Consumers must read that as "not computable", never as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZScoreResult {
    /// Indicator this result belongs to
    pub indicator: Indicator,
    /// Computed z-score
    pub z_score: Option<f64>,
    /// Reference row the score was computed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceRow>,
    /// Categorical label
    pub category: GrowthCategory,
}

impl ZScoreResult {
    /// Result for an indicator that could not be computed
    #[must_use]
    pub const fn unknown(indicator: Indicator) -> Self {
        Self {
            indicator,
            z_score: None,
            reference: None,
            category: GrowthCategory::Unknown,
        }
    }

    /// Whether a numeric z-score is available
    #[must_use]
    pub const fn is_computable(&self) -> bool {
        self.z_score.is_some()
    }

    /// Presentation form: two decimals, or `-` when not computable
    #[must_use]
    pub fn formatted(&self) -> String {
        self.z_score
            .map_or_else(|| "-".to_owned(), |z| format!("{z:.2}"))
    }
}
