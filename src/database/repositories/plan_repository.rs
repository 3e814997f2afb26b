// ABOUTME: SQLite implementation of PlanRepository
// ABOUTME: Delegates to PlanManager over the shared connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::PlanRepository;
use crate::database::{Database, PlanManager};
use crate::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use growth_core::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, NutritionPlan, PlanId,
};

/// `SQLite` implementation of `PlanRepository`
#[derive(Clone, Debug)]
pub struct SqlitePlanRepository {
    manager: PlanManager,
}

impl SqlitePlanRepository {
    /// Create a repository over the given database
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            manager: db.plans(),
        }
    }
}

#[async_trait]
impl PlanRepository for SqlitePlanRepository {
    async fn insert_plan(&self, plan: &NutritionPlan) -> AppResult<()> {
        self.manager.insert_plan(plan).await
    }

    async fn get_plan(&self, plan_id: PlanId) -> AppResult<Option<NutritionPlan>> {
        self.manager.get_plan(plan_id).await
    }

    async fn find_active_plan(&self, child_id: ChildId) -> AppResult<Option<NutritionPlan>> {
        self.manager.find_active_plan(child_id).await
    }

    async fn list_plans(&self, child_id: ChildId) -> AppResult<Vec<NutritionPlan>> {
        self.manager.list_plans(child_id).await
    }

    async fn get_day(
        &self,
        day_id: DailyRecommendationId,
    ) -> AppResult<Option<DailyRecommendation>> {
        self.manager.get_day(day_id).await
    }

    async fn save_day(
        &self,
        day: &DailyRecommendation,
        expected_version: u64,
    ) -> AppResult<DailyRecommendation> {
        self.manager.save_day(day, expected_version).await
    }

    async fn set_completed(
        &self,
        plan_id: PlanId,
        completed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.manager.set_completed(plan_id, completed_at).await
    }
}
