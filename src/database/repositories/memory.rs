// ABOUTME: In-memory repository implementations for tests and one-shot CLI runs
// ABOUTME: Same version-check and active-plan rules as the SQLite store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{GrowthRepository, PlanRepository};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use growth_core::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, Diagnosis, GrowthMeasurement,
    MeasurementId, NutritionPlan, PlanId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct PlanState {
    plans: HashMap<PlanId, NutritionPlan>,
    day_owners: HashMap<DailyRecommendationId, PlanId>,
}

/// In-memory `PlanRepository`
///
/// Clones share the same store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryPlanRepository {
    store: Arc<RwLock<PlanState>>,
}

impl InMemoryPlanRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn insert_plan(&self, plan: &NutritionPlan) -> AppResult<()> {
        let mut state = self.store.write().await;

        if state.plans.contains_key(&plan.id) {
            return Err(AppError::already_exists(format!(
                "Nutrition plan {} already exists",
                plan.id
            )));
        }
        if plan.is_active()
            && state
                .plans
                .values()
                .any(|p| p.child_id == plan.child_id && p.is_active())
        {
            return Err(AppError::already_exists(format!(
                "Child {} already has an active nutrition plan",
                plan.child_id
            )));
        }
        if let Some(day) = plan.days.iter().find(|d| state.day_owners.contains_key(&d.id)) {
            return Err(AppError::already_exists(format!(
                "Daily recommendation {} already exists",
                day.id
            )));
        }

        for day in &plan.days {
            state.day_owners.insert(day.id, plan.id);
        }
        state.plans.insert(plan.id, plan.clone());
        Ok(())
    }

    async fn get_plan(&self, plan_id: PlanId) -> AppResult<Option<NutritionPlan>> {
        Ok(self.store.read().await.plans.get(&plan_id).cloned())
    }

    async fn find_active_plan(&self, child_id: ChildId) -> AppResult<Option<NutritionPlan>> {
        Ok(self
            .store
            .read()
            .await
            .plans
            .values()
            .find(|p| p.child_id == child_id && p.is_active())
            .cloned())
    }

    async fn list_plans(&self, child_id: ChildId) -> AppResult<Vec<NutritionPlan>> {
        let mut plans: Vec<NutritionPlan> = self
            .store
            .read()
            .await
            .plans
            .values()
            .filter(|p| p.child_id == child_id)
            .cloned()
            .collect();
        plans.sort_by_key(|p| (p.week_index, p.created_at));
        Ok(plans)
    }

    async fn get_day(
        &self,
        day_id: DailyRecommendationId,
    ) -> AppResult<Option<DailyRecommendation>> {
        let state = self.store.read().await;
        Ok(state
            .day_owners
            .get(&day_id)
            .and_then(|plan_id| state.plans.get(plan_id))
            .and_then(|plan| plan.day(day_id))
            .cloned())
    }

    async fn save_day(
        &self,
        day: &DailyRecommendation,
        expected_version: u64,
    ) -> AppResult<DailyRecommendation> {
        let mut guard = self.store.write().await;
        let state = &mut *guard;

        let stored = state
            .day_owners
            .get(&day.id)
            .and_then(|plan_id| state.plans.get_mut(plan_id))
            .and_then(|plan| plan.day_mut(day.id))
            .ok_or_else(|| AppError::not_found(format!("Daily recommendation {}", day.id)))?;

        if stored.version != expected_version {
            return Err(
                AppError::concurrency_conflict(format!("Daily recommendation {}", day.id))
                    .with_resource_id(day.id.to_string()),
            );
        }

        for meal in &day.meals {
            if let Some(target) = stored.meal_mut(meal.id) {
                target.consumed = meal.consumed;
            }
        }
        stored.status = day.status;
        stored.progress_percentage = day.progress_percentage;
        stored.version = expected_version + 1;
        Ok(stored.clone())
    }

    async fn set_completed(
        &self,
        plan_id: PlanId,
        completed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.store.write().await;
        let plan = state
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| AppError::not_found(format!("Nutrition plan {plan_id}")))?;

        if plan.completed {
            return Ok(false);
        }
        plan.completed = true;
        plan.completed_at = Some(completed_at);
        Ok(true)
    }
}

#[derive(Debug, Default)]
struct GrowthState {
    measurements: Vec<GrowthMeasurement>,
    diagnoses: Vec<Diagnosis>,
}

/// In-memory `GrowthRepository`
#[derive(Clone, Debug, Default)]
pub struct InMemoryGrowthRepository {
    store: Arc<RwLock<GrowthState>>,
}

impl InMemoryGrowthRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrowthRepository for InMemoryGrowthRepository {
    async fn insert_record(
        &self,
        measurement: &GrowthMeasurement,
        diagnosis: &Diagnosis,
    ) -> AppResult<()> {
        let mut state = self.store.write().await;
        if state.measurements.iter().any(|m| m.id == measurement.id) {
            return Err(AppError::already_exists(format!(
                "Growth measurement {} already exists",
                measurement.id
            )));
        }
        state.measurements.push(measurement.clone());
        state.diagnoses.push(diagnosis.clone());
        Ok(())
    }

    async fn get_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> AppResult<Option<GrowthMeasurement>> {
        Ok(self
            .store
            .read()
            .await
            .measurements
            .iter()
            .find(|m| m.id == measurement_id)
            .cloned())
    }

    async fn list_measurements(&self, child_id: ChildId) -> AppResult<Vec<GrowthMeasurement>> {
        let mut measurements: Vec<GrowthMeasurement> = self
            .store
            .read()
            .await
            .measurements
            .iter()
            .filter(|m| m.child_id == child_id)
            .cloned()
            .collect();
        measurements.sort_by_key(|m| (m.measured_on, m.recorded_at));
        Ok(measurements)
    }

    async fn list_diagnoses(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>> {
        let mut diagnoses: Vec<Diagnosis> = self
            .store
            .read()
            .await
            .diagnoses
            .iter()
            .filter(|d| d.child_id == child_id)
            .cloned()
            .collect();
        diagnoses.sort_by_key(|d| (d.measured_on, d.created_at));
        Ok(diagnoses)
    }

    async fn latest_diagnosis(&self, child_id: ChildId) -> AppResult<Option<Diagnosis>> {
        Ok(self.list_diagnoses(child_id).await?.pop())
    }
}
