// ABOUTME: Growth intelligence engine entry point and module organization
// ABOUTME: Reference tables, z-score classification, diagnosis rules, and progress rollups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Growth Intelligence
//!
//! Pure, request-independent computations:
//!
//! - **reference**: WHO reference tables loaded once and shared read-only
//! - **classifier**: raw measurements to per-indicator z-scores and labels
//! - **diagnosis**: z-scores to stunting status, severity, and recommendations
//! - **progress**: meal consumption flags to day and plan completion
//! - **config**: validated thresholds with environment overrides
//!
//! Nothing in this crate performs I/O apart from reading a reference
//! dataset from disk at startup.

/// Validated configuration for classification and diagnosis
pub mod config;

/// WHO reference table storage and lookup
pub mod reference;

/// Z-score computation and categorical labelling
pub mod classifier;

/// Stunting status derivation and recommendation rules
pub mod diagnosis;

/// Day and plan progress aggregation
pub mod progress;

pub use classifier::{ClassificationInput, GrowthClassification, GrowthClassifier};
pub use config::{ClassificationConfig, ConfigError, DiagnosisConfig, GrowthIntelligenceConfig};
pub use diagnosis::{DiagnosisEngine, RecommendationRule};
pub use progress::{DaySummary, PlanSummary};
pub use reference::ReferenceTables;
