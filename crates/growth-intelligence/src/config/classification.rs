// ABOUTME: Z-score cut-offs used to label growth indicators and derive stunting status
// ABOUTME: Defaults follow the WHO Child Growth Standards -3/-2/+2/+3 SD bands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Z-score thresholds.
//!
//! # References
//!
//! - WHO Multicentre Growth Reference Study Group (2006). WHO Child Growth
//!   Standards: Length/height-for-age, weight-for-age, weight-for-length,
//!   weight-for-height and body mass index-for-age.
//! - Permenkes RI No. 2 Tahun 2020 tentang Standar Antropometri Anak.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Z-score cut-offs shared by every indicator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Severe band upper bound (inclusive): -3.0
    pub severe_threshold: f64,
    /// Moderate band upper bound (inclusive for labels): -2.0
    pub moderate_threshold: f64,
    /// At-risk (berisiko) band upper bound (inclusive): -1.0
    pub at_risk_threshold: f64,
    /// Upper band lower bound (inclusive): +2.0
    pub upper_threshold: f64,
    /// Obesity band lower bound (inclusive): +3.0
    pub obese_threshold: f64,
    /// Very-tall lower bound; WHO defines none, so disabled by default
    pub very_tall_threshold: Option<f64>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            severe_threshold: -3.0,
            moderate_threshold: -2.0,
            at_risk_threshold: -1.0,
            upper_threshold: 2.0,
            obese_threshold: 3.0,
            very_tall_threshold: None,
        }
    }
}

impl ClassificationConfig {
    /// Validate threshold ordering
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRange` unless
    /// severe < moderate < at-risk < 0 < upper < obese, and any very-tall
    /// cut-off lies above the upper threshold
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [
            self.severe_threshold,
            self.moderate_threshold,
            self.at_risk_threshold,
            0.0,
            self.upper_threshold,
            self.obese_threshold,
        ];
        if ordered.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValueOutOfRange(
                "Z-score thresholds must be finite",
            ));
        }
        if !ordered.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::InvalidRange(
                "Thresholds must satisfy severe < moderate < at_risk < 0 < upper < obese",
            ));
        }
        if let Some(very_tall) = self.very_tall_threshold {
            if !very_tall.is_finite() || very_tall <= self.upper_threshold {
                return Err(ConfigError::InvalidRange(
                    "very_tall_threshold must be greater than upper_threshold",
                ));
            }
        }
        Ok(())
    }
}
