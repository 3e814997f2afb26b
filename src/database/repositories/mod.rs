// ABOUTME: Repository traits for nutrition plans and growth records
// ABOUTME: Services depend on these seams; SQLite and in-memory stores implement them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Repository layer.
//!
//! Every implementation must honour the same contract:
//!
//! - `insert_plan` rejects a second active plan for the same child with
//!   `ResourceAlreadyExists`.
//! - `save_day` writes only when the stored day version equals
//!   `expected_version`, returning the day with the incremented version, and
//!   fails with `ConcurrencyConflict` otherwise.

mod growth_repository;
mod memory;
mod plan_repository;

pub use growth_repository::SqliteGrowthRepository;
pub use memory::{InMemoryGrowthRepository, InMemoryPlanRepository};
pub use plan_repository::SqlitePlanRepository;

use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use growth_core::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, Diagnosis, GrowthMeasurement,
    MeasurementId, NutritionPlan, PlanId,
};

/// Storage for the weekly nutrition plan aggregate
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Insert a complete plan
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate plan or a second active plan
    async fn insert_plan(&self, plan: &NutritionPlan) -> AppResult<()>;

    /// Get a plan by id
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn get_plan(&self, plan_id: PlanId) -> AppResult<Option<NutritionPlan>>;

    /// The child's not-yet-completed plan
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn find_active_plan(&self, child_id: ChildId) -> AppResult<Option<NutritionPlan>>;

    /// All plans of a child, oldest week first
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn list_plans(&self, child_id: ChildId) -> AppResult<Vec<NutritionPlan>>;

    /// Get one day with its meal items
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn get_day(&self, day_id: DailyRecommendationId)
        -> AppResult<Option<DailyRecommendation>>;

    /// Compare-and-set write of a day's meal flags and cached progress
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` when the stored version moved on, or
    /// `ResourceNotFound` for an unknown day
    async fn save_day(
        &self,
        day: &DailyRecommendation,
        expected_version: u64,
    ) -> AppResult<DailyRecommendation>;

    /// Mark a plan completed; `false` if it already was
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown plan
    async fn set_completed(&self, plan_id: PlanId, completed_at: DateTime<Utc>)
        -> AppResult<bool>;
}

/// Storage for growth measurements and diagnoses
#[async_trait]
pub trait GrowthRepository: Send + Sync {
    /// Store a measurement and its diagnosis atomically
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` for a duplicate measurement id
    async fn insert_record(
        &self,
        measurement: &GrowthMeasurement,
        diagnosis: &Diagnosis,
    ) -> AppResult<()>;

    /// Get one measurement
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn get_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> AppResult<Option<GrowthMeasurement>>;

    /// A child's measurements in measurement-date order
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn list_measurements(&self, child_id: ChildId) -> AppResult<Vec<GrowthMeasurement>>;

    /// A child's diagnoses in measurement-date order
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn list_diagnoses(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>>;

    /// Diagnosis of the most recent measurement
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails
    async fn latest_diagnosis(&self, child_id: ChildId) -> AppResult<Option<Diagnosis>>;
}
