// ABOUTME: Diagnosis record derived from one growth measurement
// ABOUTME: Stunting status, severity tier, per-indicator z-scores, and recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::growth::{Indicator, ZScoreResult};
use super::ids::{ChildId, DiagnosisId, MeasurementId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall stunting status derived from height-for-age
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StuntingStatus {
    /// No growth concern
    Normal,
    /// At risk of stunting
    Berisiko,
    /// Stunted
    Stunting,
    /// Severely stunted
    SeverelyStunted,
}

impl StuntingStatus {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Berisiko => "berisiko",
            Self::Stunting => "stunting",
            Self::SeverelyStunted => "severely_stunted",
        }
    }

    /// Severity tier mirroring this status
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Normal => Severity::None,
            Self::Berisiko => Severity::Mild,
            Self::Stunting => Severity::Moderate,
            Self::SeverelyStunted => Severity::Severe,
        }
    }
}

impl fmt::Display for StuntingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// No concern
    None,
    /// Early warning
    Mild,
    /// Requires follow-up
    Moderate,
    /// Requires referral
    Severe,
}

/// One diagnosis per growth measurement, append-only per child
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    /// Diagnosis id
    pub id: DiagnosisId,
    /// Source measurement
    pub measurement_id: MeasurementId,
    /// Diagnosed child
    pub child_id: ChildId,
    /// Date of the source measurement
    pub measured_on: NaiveDate,
    /// Age at measurement in months
    pub age_months: u32,
    /// Overall status; `None` when height-for-age is not computable
    pub status: Option<StuntingStatus>,
    /// Severity tier; `None` when height-for-age is not computable
    pub severity: Option<Severity>,
    /// Height-for-age result
    pub height_for_age: ZScoreResult,
    /// Weight-for-age result
    pub weight_for_age: ZScoreResult,
    /// Weight-for-height result
    pub weight_for_height: ZScoreResult,
    /// MUAC-for-age result
    pub muac_for_age: ZScoreResult,
    /// Every recommendation whose rule matched, in rule order
    pub recommendations: Vec<String>,
    /// Free-text notes (e.g. indicators lacking reference data)
    pub notes: Vec<String>,
    /// When the diagnosis was produced
    pub created_at: DateTime<Utc>,
}

impl Diagnosis {
    /// Result for one indicator
    #[must_use]
    pub const fn result(&self, indicator: Indicator) -> &ZScoreResult {
        match indicator {
            Indicator::HeightForAge => &self.height_for_age,
            Indicator::WeightForAge => &self.weight_for_age,
            Indicator::WeightForHeight => &self.weight_for_height,
            Indicator::MuacForAge => &self.muac_for_age,
        }
    }

    /// All four indicator results in a fixed order
    #[must_use]
    pub fn results(&self) -> [&ZScoreResult; 4] {
        [
            &self.height_for_age,
            &self.weight_for_age,
            &self.weight_for_height,
            &self.muac_for_age,
        ]
    }

    /// Recommendations truncated for display
    #[must_use]
    pub fn display_recommendations(&self, limit: usize) -> &[String] {
        let end = self.recommendations.len().min(limit);
        &self.recommendations[..end]
    }

    /// Whether the child is stunted or severely stunted
    #[must_use]
    pub fn is_stunted(&self) -> bool {
        matches!(
            self.status,
            Some(StuntingStatus::Stunting | StuntingStatus::SeverelyStunted)
        )
    }
}
