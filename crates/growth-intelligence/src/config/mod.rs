// ABOUTME: Growth intelligence configuration with defaults, env overrides, and validation
// ABOUTME: Provides a process-wide singleton loaded once and shared without locking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Growth Intelligence Configuration Module
//!
//! - `classification` - z-score cut-offs for labels and stunting status
//! - `diagnosis` - recommendation list cap and display limit
//!
//! Values start from defaults, are overridden by `GROWTH_*` environment
//! variables, and are validated before use.

pub mod classification;
pub mod diagnosis;
pub mod error;

pub use classification::ClassificationConfig;
pub use diagnosis::DiagnosisConfig;
pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::warn;

/// Global configuration singleton
static GROWTH_INTELLIGENCE_CONFIG: OnceLock<GrowthIntelligenceConfig> = OnceLock::new();

/// Main growth intelligence configuration container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrowthIntelligenceConfig {
    /// Z-score cut-offs
    pub classification: ClassificationConfig,
    /// Diagnosis engine settings
    pub diagnosis: DiagnosisConfig,
}

impl GrowthIntelligenceConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        GROWTH_INTELLIGENCE_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load growth intelligence config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| env::var(name).ok())
    }

    /// Load configuration using an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a looked-up value fails to parse or validation fails
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self::default().apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any section is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classification.validate()?;
        self.diagnosis.validate()
    }

    fn apply_var<T: FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        target: &mut T,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup(name) {
            *target = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {name}")))?;
        }
        Ok(())
    }

    /// Optional values are cleared by an empty string or `none`
    fn apply_optional_var<T: FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        target: &mut Option<T>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup(name) {
            let val = val.trim();
            *target = if val.is_empty() || val.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(
                    val.parse()
                        .map_err(|_| ConfigError::Parse(format!("Invalid {name}")))?,
                )
            };
        }
        Ok(())
    }

    fn apply_overrides(
        mut self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let cls = &mut self.classification;
        Self::apply_var(lookup, "GROWTH_SEVERE_Z_THRESHOLD", &mut cls.severe_threshold)?;
        Self::apply_var(lookup, "GROWTH_MODERATE_Z_THRESHOLD", &mut cls.moderate_threshold)?;
        Self::apply_var(lookup, "GROWTH_AT_RISK_Z_THRESHOLD", &mut cls.at_risk_threshold)?;
        Self::apply_var(lookup, "GROWTH_UPPER_Z_THRESHOLD", &mut cls.upper_threshold)?;
        Self::apply_var(lookup, "GROWTH_OBESE_Z_THRESHOLD", &mut cls.obese_threshold)?;
        Self::apply_optional_var(
            lookup,
            "GROWTH_VERY_TALL_Z_THRESHOLD",
            &mut cls.very_tall_threshold,
        )?;

        let diag = &mut self.diagnosis;
        Self::apply_optional_var(
            lookup,
            "GROWTH_RECOMMENDATION_LIMIT",
            &mut diag.recommendation_limit,
        )?;
        Self::apply_var(
            lookup,
            "GROWTH_RECOMMENDATION_DISPLAY_LIMIT",
            &mut diag.display_limit,
        )?;

        Ok(self)
    }
}
