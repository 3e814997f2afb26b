// ABOUTME: SQLite persistence for the weekly nutrition plan aggregate
// ABOUTME: Day writes are guarded by an optimistic version column on daily_recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::transactions::TransactionGuard;
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use chrono::{DateTime, NaiveDate, Utc};
use growth_core::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, DayStatus, MealItem, MealSlot,
    NutritionPlan, PlanId,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Database manager for nutrition plans
#[derive(Clone, Debug)]
pub struct PlanManager {
    pool: SqlitePool,
}

impl PlanManager {
    /// Create a new plan manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Plan Operations
    // ========================================================================

    /// Insert a complete plan with its days and meal items in one transaction
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the child already has an active plan
    /// or an id is reused, and `DatabaseError` for other failures
    pub async fn insert_plan(&self, plan: &NutritionPlan) -> AppResult<()> {
        let mut guard = TransactionGuard::begin(&self.pool).await?;

        sqlx::query(
            r"
            INSERT INTO nutrition_plans
                (id, child_id, week_index, start_date, end_date, completed,
                 completed_at, targets, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.child_id.to_string())
        .bind(i64::from(plan.week_index))
        .bind(plan.start_date)
        .bind(plan.end_date)
        .bind(plan.completed)
        .bind(plan.completed_at.map(|t| t.to_rfc3339()))
        .bind(serde_json::to_string(&plan.targets)?)
        .bind(plan.created_at.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .db_context("Failed to insert nutrition plan")?;

        for day in &plan.days {
            sqlx::query(
                r"
                INSERT INTO daily_recommendations
                    (id, plan_id, day_index, date, status, progress_percentage, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(day.id.to_string())
            .bind(plan.id.to_string())
            .bind(i64::from(day.day_index))
            .bind(day.date)
            .bind(day.status.as_str())
            .bind(i64::from(day.progress_percentage))
            .bind(to_i64(day.version)?)
            .execute(guard.executor()?)
            .await
            .db_context("Failed to insert daily recommendation")?;

            for meal in &day.meals {
                sqlx::query(
                    r"
                    INSERT INTO meal_items
                        (id, daily_recommendation_id, position, slot, name, portion,
                         target_calories, consumed, nutrition, recipe)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    ",
                )
                .bind(meal.id.to_string())
                .bind(day.id.to_string())
                .bind(i64::from(meal.position))
                .bind(meal.slot.as_str())
                .bind(&meal.name)
                .bind(&meal.portion)
                .bind(meal.target_calories)
                .bind(meal.consumed)
                .bind(meal.nutrition.as_ref().map(serde_json::to_string).transpose()?)
                .bind(meal.recipe.as_ref().map(serde_json::to_string).transpose()?)
                .execute(guard.executor()?)
                .await
                .db_context("Failed to insert meal item")?;
            }
        }

        guard.commit().await?;
        debug!(plan_id = %plan.id, child_id = %plan.child_id, "Inserted nutrition plan");
        Ok(())
    }

    /// Get a plan by id, including all days and meal items
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_plan(&self, plan_id: PlanId) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, child_id, week_index, start_date, end_date, completed,
                   completed_at, targets, created_at
            FROM nutrition_plans
            WHERE id = $1
            ",
        )
        .bind(plan_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to get nutrition plan")?;

        match row {
            Some(row) => Ok(Some(self.load_plan(&row).await?)),
            None => Ok(None),
        }
    }

    /// The child's plan that is not yet completed
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn find_active_plan(&self, child_id: ChildId) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, child_id, week_index, start_date, end_date, completed,
                   completed_at, targets, created_at
            FROM nutrition_plans
            WHERE child_id = $1 AND completed = 0
            LIMIT 1
            ",
        )
        .bind(child_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to find active nutrition plan")?;

        match row {
            Some(row) => Ok(Some(self.load_plan(&row).await?)),
            None => Ok(None),
        }
    }

    /// All plans of a child, oldest week first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_plans(&self, child_id: ChildId) -> AppResult<Vec<NutritionPlan>> {
        let rows = sqlx::query(
            r"
            SELECT id, child_id, week_index, start_date, end_date, completed,
                   completed_at, targets, created_at
            FROM nutrition_plans
            WHERE child_id = $1
            ORDER BY week_index, created_at
            ",
        )
        .bind(child_id.to_string())
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to list nutrition plans")?;

        let mut plans = Vec::with_capacity(rows.len());
        for row in &rows {
            plans.push(self.load_plan(row).await?);
        }
        Ok(plans)
    }

    /// Mark a plan completed if it is still active
    ///
    /// Returns `false` when the plan was already completed.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown plan
    pub async fn set_completed(
        &self,
        plan_id: PlanId,
        completed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE nutrition_plans
            SET completed = 1, completed_at = $1
            WHERE id = $2 AND completed = 0
            ",
        )
        .bind(completed_at.to_rfc3339())
        .bind(plan_id.to_string())
        .execute(&self.pool)
        .await
        .db_context("Failed to complete nutrition plan")?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists = sqlx::query("SELECT 1 FROM nutrition_plans WHERE id = $1")
            .bind(plan_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .db_context("Failed to check nutrition plan")?
            .is_some();
        if exists {
            Ok(false)
        } else {
            Err(AppError::not_found(format!("Nutrition plan {plan_id}")))
        }
    }

    // ========================================================================
    // Day Operations
    // ========================================================================

    /// Get one day with its meal items
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_day(
        &self,
        day_id: DailyRecommendationId,
    ) -> AppResult<Option<DailyRecommendation>> {
        let row = sqlx::query(
            r"
            SELECT id, plan_id, day_index, date, status, progress_percentage, version
            FROM daily_recommendations
            WHERE id = $1
            ",
        )
        .bind(day_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to get daily recommendation")?;

        match row {
            Some(row) => Ok(Some(self.load_day(&row).await?)),
            None => Ok(None),
        }
    }

    /// Write a day's cached progress and meal flags if its version is unchanged
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` if the stored version differs from
    /// `expected_version` (nothing is written), or `ResourceNotFound` if the
    /// day does not exist
    pub async fn save_day(
        &self,
        day: &DailyRecommendation,
        expected_version: u64,
    ) -> AppResult<DailyRecommendation> {
        let next_version = expected_version + 1;
        let mut guard = TransactionGuard::begin(&self.pool).await?;

        let result = sqlx::query(
            r"
            UPDATE daily_recommendations
            SET status = $1, progress_percentage = $2, version = $3
            WHERE id = $4 AND version = $5
            ",
        )
        .bind(day.status.as_str())
        .bind(i64::from(day.progress_percentage))
        .bind(to_i64(next_version)?)
        .bind(day.id.to_string())
        .bind(to_i64(expected_version)?)
        .execute(guard.executor()?)
        .await
        .db_context("Failed to update daily recommendation")?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM daily_recommendations WHERE id = $1")
                .bind(day.id.to_string())
                .fetch_optional(guard.executor()?)
                .await
                .db_context("Failed to check daily recommendation")?
                .is_some();
            return Err(if exists {
                AppError::concurrency_conflict(format!("Daily recommendation {}", day.id))
                    .with_resource_id(day.id.to_string())
            } else {
                AppError::not_found(format!("Daily recommendation {}", day.id))
            });
        }

        for meal in &day.meals {
            sqlx::query(
                r"
                UPDATE meal_items SET consumed = $1
                WHERE id = $2 AND daily_recommendation_id = $3
                ",
            )
            .bind(meal.consumed)
            .bind(meal.id.to_string())
            .bind(day.id.to_string())
            .execute(guard.executor()?)
            .await
            .db_context("Failed to update meal item")?;
        }

        guard.commit().await?;

        let mut saved = day.clone();
        saved.version = next_version;
        Ok(saved)
    }

    // ========================================================================
    // Row Loading
    // ========================================================================

    async fn load_plan(&self, row: &SqliteRow) -> AppResult<NutritionPlan> {
        let mut plan = row_to_plan(row)?;

        let day_rows = sqlx::query(
            r"
            SELECT id, plan_id, day_index, date, status, progress_percentage, version
            FROM daily_recommendations
            WHERE plan_id = $1
            ORDER BY day_index
            ",
        )
        .bind(plan.id.to_string())
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to load plan days")?;

        for day_row in &day_rows {
            plan.days.push(self.load_day(day_row).await?);
        }
        Ok(plan)
    }

    async fn load_day(&self, row: &SqliteRow) -> AppResult<DailyRecommendation> {
        let mut day = row_to_day(row)?;

        let meal_rows = sqlx::query(
            r"
            SELECT id, position, slot, name, portion, target_calories, consumed,
                   nutrition, recipe
            FROM meal_items
            WHERE daily_recommendation_id = $1
            ORDER BY position
            ",
        )
        .bind(day.id.to_string())
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to load meal items")?;

        day.meals = meal_rows
            .iter()
            .map(row_to_meal)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(day)
    }
}

/// Parse a stored identifier
pub(crate) fn parse_id<T>(value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| AppError::internal(format!("Invalid stored id '{value}': {e}")))
}

/// Parse a stored RFC 3339 timestamp
pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))
}

fn to_i64(version: u64) -> AppResult<i64> {
    i64::try_from(version)
        .map_err(|_| AppError::value_out_of_range(format!("Version {version} is too large")))
}

/// Convert a plan row, without days
fn row_to_plan(row: &SqliteRow) -> AppResult<NutritionPlan> {
    let id: String = row.get("id");
    let child_id: String = row.get("child_id");
    let targets_json: String = row.get("targets");
    let completed_at: Option<String> = row.get("completed_at");
    let created_at: String = row.get("created_at");
    let week_index: i64 = row.get("week_index");

    Ok(NutritionPlan {
        id: parse_id(&id)?,
        child_id: parse_id(&child_id)?,
        week_index: week_index as u32,
        start_date: row.get::<NaiveDate, _>("start_date"),
        end_date: row.get::<NaiveDate, _>("end_date"),
        completed: row.get("completed"),
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        targets: serde_json::from_str(&targets_json)?,
        days: Vec::new(),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Convert a day row, without meals
fn row_to_day(row: &SqliteRow) -> AppResult<DailyRecommendation> {
    let id: String = row.get("id");
    let plan_id: String = row.get("plan_id");
    let status: String = row.get("status");
    let day_index: i64 = row.get("day_index");
    let progress: i64 = row.get("progress_percentage");
    let version: i64 = row.get("version");

    Ok(DailyRecommendation {
        id: parse_id(&id)?,
        plan_id: parse_id(&plan_id)?,
        day_index: day_index as u8,
        date: row.get::<NaiveDate, _>("date"),
        status: DayStatus::parse(&status),
        progress_percentage: progress as u8,
        version: version as u64,
        meals: Vec::new(),
    })
}

fn row_to_meal(row: &SqliteRow) -> AppResult<MealItem> {
    let id: String = row.get("id");
    let slot: String = row.get("slot");
    let position: i64 = row.get("position");
    let nutrition: Option<String> = row.get("nutrition");
    let recipe: Option<String> = row.get("recipe");

    Ok(MealItem {
        id: parse_id(&id)?,
        position: position as u32,
        slot: MealSlot::from_str_lossy(&slot),
        name: row.get("name"),
        portion: row.get("portion"),
        target_calories: row.get("target_calories"),
        consumed: row.get("consumed"),
        nutrition: nutrition
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?,
        recipe: recipe.as_deref().map(serde_json::from_str).transpose()?,
    })
}
