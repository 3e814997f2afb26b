// ABOUTME: Diagnosis engine settings for recommendation list size and display truncation
// ABOUTME: The engine returns the full list unless an explicit cap is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Diagnosis engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisConfig {
    /// Hard cap on recommendations returned by the engine (`None` = all)
    pub recommendation_limit: Option<usize>,
    /// How many recommendations presentation layers show
    pub display_limit: usize,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            recommendation_limit: None,
            display_limit: 3,
        }
    }
}

impl DiagnosisConfig {
    /// Validate limits
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueOutOfRange` if either limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_limit == 0 {
            return Err(ConfigError::ValueOutOfRange(
                "display_limit must be at least 1",
            ));
        }
        if self.recommendation_limit == Some(0) {
            return Err(ConfigError::ValueOutOfRange(
                "recommendation_limit must be at least 1 when set",
            ));
        }
        Ok(())
    }
}
