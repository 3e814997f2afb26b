// ABOUTME: Nutrition plan store enforcing the weekly plan's structural invariants
// ABOUTME: Accepts externally generated plans, serves the active plan, and completes plans
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::PlanStoreConfig;
use crate::database::repositories::PlanRepository;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use growth_core::constants::plan::{DAYS_PER_PLAN, FIRST_DAY_INDEX};
use growth_core::models::{ChildId, MealItem, MealItemId, NutritionPlan, PlanId};
use growth_intelligence::progress::{is_plan_complete, recompute_plan, summarize_plan};
use growth_intelligence::PlanSummary;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Owner of the weekly plan aggregate
#[derive(Clone)]
pub struct NutritionPlanStore {
    repo: Arc<dyn PlanRepository>,
    config: PlanStoreConfig,
}

impl NutritionPlanStore {
    /// Create a store over the given repository
    #[must_use]
    pub fn new(repo: Arc<dyn PlanRepository>, config: PlanStoreConfig) -> Self {
        Self { repo, config }
    }

    /// Validate and store a fully formed plan
    ///
    /// Cached day progress and versions in the input are ignored and
    /// recomputed from the meal flags.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a structurally invalid plan and
    /// `ResourceAlreadyExists` if the child already has an active plan.
    /// Nothing is stored on error.
    pub async fn store_plan(&self, mut plan: NutritionPlan) -> AppResult<NutritionPlan> {
        validate_plan(&plan)?;

        for day in &mut plan.days {
            day.version = 0;
        }
        recompute_plan(&mut plan);

        if plan.is_active() {
            if let Some(existing) = self.repo.find_active_plan(plan.child_id).await? {
                return Err(AppError::already_exists(format!(
                    "Child {} already has active nutrition plan {}",
                    plan.child_id, existing.id
                ))
                .with_resource_id(existing.id.to_string()));
            }
        }

        self.repo.insert_plan(&plan).await?;
        info!(
            plan_id = %plan.id,
            child_id = %plan.child_id,
            week_index = plan.week_index,
            "Stored nutrition plan"
        );
        Ok(plan)
    }

    /// The child's current plan, with cached progress refreshed
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn get_active_plan(&self, child_id: ChildId) -> AppResult<Option<NutritionPlan>> {
        Ok(self
            .repo
            .find_active_plan(child_id)
            .await?
            .map(refreshed))
    }

    /// Get a plan by id
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown plan
    pub async fn get_plan(&self, plan_id: PlanId) -> AppResult<NutritionPlan> {
        self.repo
            .get_plan(plan_id)
            .await?
            .map(refreshed)
            .ok_or_else(|| AppError::not_found(format!("Nutrition plan {plan_id}")))
    }

    /// Every plan of a child, oldest week first
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn list_plans(&self, child_id: ChildId) -> AppResult<Vec<NutritionPlan>> {
        Ok(self
            .repo
            .list_plans(child_id)
            .await?
            .into_iter()
            .map(refreshed)
            .collect())
    }

    /// Weekly progress rollup for a plan
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown plan
    pub async fn plan_summary(&self, plan_id: PlanId) -> AppResult<PlanSummary> {
        let plan = self.get_plan(plan_id).await?;
        Ok(summarize_plan(&plan))
    }

    /// Complete a plan
    ///
    /// Completing an already completed plan returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown plan, or `InvalidInput` when
    /// full progress is required and some day is unfinished
    pub async fn mark_completed(&self, plan_id: PlanId) -> AppResult<NutritionPlan> {
        let plan = self.get_plan(plan_id).await?;
        if plan.completed {
            return Ok(plan);
        }

        if self.config.require_full_progress && !is_plan_complete(&plan) {
            return Err(AppError::invalid_input(format!(
                "Nutrition plan {plan_id} cannot be completed before every day is finished"
            ))
            .with_resource_id(plan_id.to_string()));
        }

        if self.repo.set_completed(plan_id, Utc::now()).await? {
            info!(plan_id = %plan_id, child_id = %plan.child_id, "Nutrition plan completed");
        } else {
            warn!(plan_id = %plan_id, "Nutrition plan was completed concurrently");
        }
        self.get_plan(plan_id).await
    }
}

/// Recompute cached progress so callers never see drifted values
fn refreshed(mut plan: NutritionPlan) -> NutritionPlan {
    recompute_plan(&mut plan);
    plan
}

/// Structural validation of an externally generated plan
///
/// # Errors
///
/// Returns a validation error naming the first violated rule
pub fn validate_plan(plan: &NutritionPlan) -> AppResult<()> {
    if plan.start_date > plan.end_date {
        return Err(AppError::invalid_input(format!(
            "Plan start date {} is after end date {}",
            plan.start_date, plan.end_date
        )));
    }

    if plan.days.len() != DAYS_PER_PLAN {
        return Err(AppError::invalid_input(format!(
            "Plan must have exactly {DAYS_PER_PLAN} days, got {}",
            plan.days.len()
        )));
    }

    let mut dates = HashSet::with_capacity(DAYS_PER_PLAN);
    let mut day_ids = HashSet::with_capacity(DAYS_PER_PLAN);
    let mut meal_ids = HashSet::new();

    for (expected_index, day) in (FIRST_DAY_INDEX..).zip(&plan.days) {
        if day.day_index != expected_index {
            return Err(AppError::invalid_input(format!(
                "Day indices must run 1..{DAYS_PER_PLAN} in order: expected {expected_index}, got {}",
                day.day_index
            )));
        }
        if day.plan_id != plan.id {
            return Err(AppError::invalid_input(format!(
                "Day {} belongs to plan {}, not {}",
                day.day_index, day.plan_id, plan.id
            )));
        }
        if day.date < plan.start_date || day.date > plan.end_date {
            return Err(AppError::invalid_input(format!(
                "Day {} date {} is outside the plan range {}..{}",
                day.day_index, day.date, plan.start_date, plan.end_date
            )));
        }
        if !dates.insert(day.date) {
            return Err(AppError::invalid_input(format!(
                "Date {} appears on more than one day",
                day.date
            )));
        }
        if !day_ids.insert(day.id) {
            return Err(AppError::invalid_input(format!(
                "Daily recommendation id {} is duplicated",
                day.id
            )));
        }

        validate_meals(&day.meals, &mut meal_ids)?;
    }

    Ok(())
}

fn validate_meals(meals: &[MealItem], seen: &mut HashSet<MealItemId>) -> AppResult<()> {
    for meal in meals {
        if !seen.insert(meal.id) {
            return Err(AppError::invalid_input(format!(
                "Meal item id {} is duplicated",
                meal.id
            )));
        }
        if !meal.target_calories.is_finite() || meal.target_calories < 0.0 {
            return Err(AppError::invalid_input(format!(
                "Meal item {} has invalid target calories {}",
                meal.id, meal.target_calories
            )));
        }
    }
    Ok(())
}
