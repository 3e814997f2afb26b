// ABOUTME: Domain model module organization and re-exports
// ABOUTME: Measurements, z-score results, diagnoses, and weekly nutrition plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain models shared by the classification engine and the storage layer.
//!
//! Ownership follows the aggregate boundaries: a [`NutritionPlan`] owns its
//! [`DailyRecommendation`]s and each day owns its [`MealItem`]s. A
//! [`Diagnosis`] refers to its [`GrowthMeasurement`] by id only.

mod diagnosis;
mod growth;
mod ids;
mod measurement;
mod plan;

pub use diagnosis::{Diagnosis, Severity, StuntingStatus};
pub use growth::{GrowthCategory, Indicator, ReferenceRow, ZScoreResult};
pub use ids::{ChildId, DailyRecommendationId, DiagnosisId, MealItemId, MeasurementId, PlanId};
pub use measurement::{age_in_months, GrowthMeasurement, NewGrowthMeasurement, Sex};
pub use plan::{
    DailyRecommendation, DailyTargets, DayStatus, MealItem, MealSlot, NutritionFacts,
    NutritionPlan, Recipe,
};
