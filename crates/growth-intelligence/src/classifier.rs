// ABOUTME: Converts raw anthropometric values into WHO z-scores and categorical labels
// ABOUTME: Pure and stateless; missing reference data yields a null z-score, never an error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Growth classifier.
//!
//! Z-scores use the WHO piecewise linear approximation around the median:
//! values below the median are scaled by the distance to -2 SD, values at or
//! above it by the distance to +2 SD. Both halves are multiplied by 2 so
//! that a value on the -2 SD line scores exactly -2.

use crate::config::{ClassificationConfig, GrowthIntelligenceConfig};
use crate::reference::ReferenceTables;
use growth_core::errors::{AppError, AppResult};
use growth_core::models::{
    GrowthCategory, GrowthMeasurement, Indicator, ReferenceRow, Sex, ZScoreResult,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Raw classifier input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationInput {
    /// Age in whole months
    pub age_months: u32,
    /// Sex used for reference lookup
    pub sex: Sex,
    /// Body weight (kg)
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Height or recumbent length (cm)
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Mid-upper-arm circumference (cm)
    #[serde(default)]
    pub muac_cm: Option<f64>,
}

impl ClassificationInput {
    /// Parse untyped input, rejecting a negative or fractional age
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the JSON does not describe a valid input
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            AppError::invalid_input(format!("Invalid classification input: {e}"))
        })
    }
}

impl From<&GrowthMeasurement> for ClassificationInput {
    fn from(measurement: &GrowthMeasurement) -> Self {
        Self {
            age_months: measurement.age_months,
            sex: measurement.sex,
            weight_kg: Some(measurement.weight_kg),
            height_cm: Some(measurement.height_cm),
            muac_cm: measurement.muac_cm,
        }
    }
}

/// Classifier output: one result per indicator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthClassification {
    /// Height-for-age
    pub height_for_age: ZScoreResult,
    /// Weight-for-age
    pub weight_for_age: ZScoreResult,
    /// Weight-for-height
    pub weight_for_height: ZScoreResult,
    /// MUAC-for-age
    pub muac_for_age: ZScoreResult,
}

impl GrowthClassification {
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

    /// Indicators whose z-score could not be computed
    #[must_use]
    pub fn missing_indicators(&self) -> Vec<Indicator> {
        Indicator::ALL
            .into_iter()
            .filter(|i| !self.result(*i).is_computable())
            .collect()
    }
}

/// WHO piecewise z-score of `value` against `row`
#[must_use]
pub fn calculate_z_score(value: f64, row: &ReferenceRow) -> f64 {
    if value < row.median {
        (value - row.median) / (row.median - row.minus_2sd) * 2.0
    } else {
        (value - row.median) / (row.plus_2sd - row.median) * 2.0
    }
}

/// Height-for-age label
#[must_use]
pub fn categorize_height_for_age(z: f64, config: &ClassificationConfig) -> GrowthCategory {
    if z <= config.severe_threshold {
        GrowthCategory::VeryShort
    } else if z <= config.moderate_threshold {
        GrowthCategory::Short
    } else if config.very_tall_threshold.is_some_and(|t| z >= t) {
        GrowthCategory::VeryTall
    } else if z >= config.upper_threshold {
        GrowthCategory::Tall
    } else {
        GrowthCategory::Normal
    }
}

/// Weight-for-age label
#[must_use]
pub fn categorize_weight_for_age(z: f64, config: &ClassificationConfig) -> GrowthCategory {
    if z <= config.severe_threshold {
        GrowthCategory::SeverelyUnderweight
    } else if z <= config.moderate_threshold {
        GrowthCategory::Underweight
    } else if z >= config.obese_threshold {
        GrowthCategory::Obese
    } else if z >= config.upper_threshold {
        GrowthCategory::Overweight
    } else {
        GrowthCategory::Normal
    }
}

/// Weight-for-height label
#[must_use]
pub fn categorize_weight_for_height(z: f64, config: &ClassificationConfig) -> GrowthCategory {
    if z <= config.severe_threshold {
        GrowthCategory::SeverelyWasted
    } else if z <= config.moderate_threshold {
        GrowthCategory::Wasted
    } else if z >= config.obese_threshold {
        GrowthCategory::Obese
    } else if z >= config.upper_threshold {
        GrowthCategory::Overweight
    } else {
        GrowthCategory::Normal
    }
}

/// MUAC-for-age label (no obesity band)
#[must_use]
pub fn categorize_muac(z: f64, config: &ClassificationConfig) -> GrowthCategory {
    if z <= config.severe_threshold {
        GrowthCategory::SeverelyLow
    } else if z <= config.moderate_threshold {
        GrowthCategory::Low
    } else if z >= config.upper_threshold {
        GrowthCategory::AboveNormal
    } else {
        GrowthCategory::Normal
    }
}

/// Label a nullable z-score for any indicator
#[must_use]
pub fn categorize(
    indicator: Indicator,
    z_score: Option<f64>,
    config: &ClassificationConfig,
) -> GrowthCategory {
    let Some(z) = z_score else {
        return GrowthCategory::Unknown;
    };
    match indicator {
        Indicator::HeightForAge => categorize_height_for_age(z, config),
        Indicator::WeightForAge => categorize_weight_for_age(z, config),
        Indicator::WeightForHeight => categorize_weight_for_height(z, config),
        Indicator::MuacForAge => categorize_muac(z, config),
    }
}

/// Stateless classifier over shared reference tables
#[derive(Debug, Clone)]
pub struct GrowthClassifier {
    tables: Arc<ReferenceTables>,
    config: ClassificationConfig,
}

impl GrowthClassifier {
    /// Create a classifier using the global configuration
    #[must_use]
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self::with_config(
            tables,
            GrowthIntelligenceConfig::global().classification.clone(),
        )
    }

    /// Create a classifier with explicit thresholds
    #[must_use]
    pub const fn with_config(tables: Arc<ReferenceTables>, config: ClassificationConfig) -> Self {
        Self { tables, config }
    }

    /// Thresholds in use
    #[must_use]
    pub const fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Classify one set of raw values
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-finite or non-positive value, and
    /// `MissingRequiredField` when no value is given
    pub fn classify(&self, input: &ClassificationInput) -> AppResult<GrowthClassification> {
        let age_months = input.age_months;
        if input.weight_kg.is_none() && input.height_cm.is_none() && input.muac_cm.is_none() {
            return Err(AppError::missing_field("weight_kg, height_cm or muac_cm"));
        }
        for (field, value) in [
            ("weight_kg", input.weight_kg),
            ("height_cm", input.height_cm),
            ("muac_cm", input.muac_cm),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(AppError::invalid_input(format!(
                        "{field} must be a positive number, got {v}"
                    )));
                }
            }
        }

        let sex = input.sex;
        let by_age = |indicator: Indicator, value: Option<f64>| {
            self.score(
                indicator,
                value,
                value.and_then(|_| self.tables.lookup_by_age(indicator, sex, age_months)),
            )
        };

        let classification = GrowthClassification {
            height_for_age: by_age(Indicator::HeightForAge, input.height_cm),
            weight_for_age: by_age(Indicator::WeightForAge, input.weight_kg),
            weight_for_height: match (input.weight_kg, input.height_cm) {
                (Some(weight), Some(height)) => self.score(
                    Indicator::WeightForHeight,
                    Some(weight),
                    self.tables.lookup_by_height(sex, height),
                ),
                _ => ZScoreResult::unknown(Indicator::WeightForHeight),
            },
            muac_for_age: by_age(Indicator::MuacForAge, input.muac_cm),
        };

        debug!(
            age_months,
            %sex,
            height_for_age = ?classification.height_for_age.z_score,
            weight_for_age = ?classification.weight_for_age.z_score,
            weight_for_height = ?classification.weight_for_height.z_score,
            muac_for_age = ?classification.muac_for_age.z_score,
            "Classified growth measurement"
        );
        Ok(classification)
    }

    /// Classify a stored measurement
    ///
    /// # Errors
    ///
    /// Returns a validation error if the measurement values are invalid
    pub fn classify_measurement(
        &self,
        measurement: &GrowthMeasurement,
    ) -> AppResult<GrowthClassification> {
        self.classify(&ClassificationInput::from(measurement))
    }

    /// Classify many measurements in parallel, preserving input order
    pub fn classify_batch(
        &self,
        measurements: &[GrowthMeasurement],
    ) -> Vec<AppResult<GrowthClassification>> {
        measurements
            .par_iter()
            .map(|m| self.classify_measurement(m))
            .collect()
    }

    fn score(
        &self,
        indicator: Indicator,
        value: Option<f64>,
        row: Option<&ReferenceRow>,
    ) -> ZScoreResult {
        match (value, row) {
            (Some(value), Some(row)) => {
                let z = calculate_z_score(value, row);
                ZScoreResult {
                    indicator,
                    z_score: Some(z),
                    reference: Some(*row),
                    category: categorize(indicator, Some(z), &self.config),
                }
            }
            _ => ZScoreResult::unknown(indicator),
        }
    }
}
