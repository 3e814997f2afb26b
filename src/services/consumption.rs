// ABOUTME: Consumption tracker applying single meal-item toggles with optimistic retries
// ABOUTME: Every toggle recomputes the day from its full item set before writing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::ConsumptionConfig;
use crate::database::repositories::PlanRepository;
use crate::errors::{AppError, AppResult};
use growth_core::models::{DailyRecommendation, DailyRecommendationId, DayStatus, MealItemId};
use growth_intelligence::progress::{day_status, recompute_day};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

const BASE_BACKOFF_MS: u64 = 5;
const MAX_BACKOFF_SHIFT: u32 = 6;

/// Result of one toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToggleOutcome {
    /// The day as stored after the toggle
    pub day: DailyRecommendation,
    /// Whether anything was written
    pub changed: bool,
    /// Whether this toggle finished the day
    pub transitioned_to_selesai: bool,
}

/// Applies meal consumption toggles
#[derive(Clone)]
pub struct ConsumptionTracker {
    repo: Arc<dyn PlanRepository>,
    config: ConsumptionConfig,
}

impl ConsumptionTracker {
    /// Create a tracker over the given repository
    #[must_use]
    pub fn new(repo: Arc<dyn PlanRepository>, config: ConsumptionConfig) -> Self {
        Self { repo, config }
    }

    /// Set a meal item's consumed flag to `desired`
    ///
    /// Setting the flag to its current value is a no-op. Version conflicts
    /// with concurrent writers are retried from a fresh read.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown day or meal item, and
    /// `ConcurrencyConflict` once the configured attempts are exhausted
    pub async fn toggle_consumed(
        &self,
        day_id: DailyRecommendationId,
        meal_id: MealItemId,
        desired: bool,
    ) -> AppResult<ToggleOutcome> {
        let max_attempts = self.config.toggle_retries.max(1);
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.try_toggle(day_id, meal_id, desired).await {
                Err(e) if e.is_retryable() && attempts < max_attempts => {
                    let backoff_ms = BASE_BACKOFF_MS << attempts.min(MAX_BACKOFF_SHIFT);
                    warn!(
                        day_id = %day_id,
                        attempt = attempts,
                        max_attempts = max_attempts,
                        backoff_ms = backoff_ms,
                        "Consumption toggle conflicted, retrying after backoff"
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        error!(
                            day_id = %day_id,
                            attempts = attempts,
                            error = %e,
                            "Consumption toggle failed after max retries"
                        );
                    }
                    return Err(e);
                }
                Ok(outcome) => return Ok(outcome),
            }
        }
    }

    /// Toggle using an untyped wire value for the desired state
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without touching storage when `desired` is not
    /// a JSON boolean, otherwise as [`Self::toggle_consumed`]
    pub async fn toggle_consumed_raw(
        &self,
        day_id: DailyRecommendationId,
        meal_id: MealItemId,
        desired: &Value,
    ) -> AppResult<ToggleOutcome> {
        let desired = desired.as_bool().ok_or_else(|| {
            AppError::invalid_input(format!("Consumed state must be a boolean, got {desired}"))
        })?;
        self.toggle_consumed(day_id, meal_id, desired).await
    }

    async fn try_toggle(
        &self,
        day_id: DailyRecommendationId,
        meal_id: MealItemId,
        desired: bool,
    ) -> AppResult<ToggleOutcome> {
        let mut day = self
            .repo
            .get_day(day_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Daily recommendation {day_id}")))?;
        let expected_version = day.version;
        let status_before = day_status(&day);

        let meal = day
            .meal_mut(meal_id)
            .ok_or_else(|| AppError::not_found(format!("Meal item {meal_id}")))?;
        let flag_changed = meal.consumed != desired;
        meal.consumed = desired;

        let cache_drifted = recompute_day(&mut day);
        if !flag_changed && !cache_drifted {
            return Ok(ToggleOutcome {
                day,
                changed: false,
                transitioned_to_selesai: false,
            });
        }

        let saved = self.repo.save_day(&day, expected_version).await?;
        let transitioned_to_selesai =
            status_before != DayStatus::Selesai && saved.status == DayStatus::Selesai;

        debug!(
            day_id = %day_id,
            meal_id = %meal_id,
            consumed = desired,
            progress = saved.progress_percentage,
            status = %saved.status,
            version = saved.version,
            "Applied consumption toggle"
        );

        Ok(ToggleOutcome {
            day: saved,
            changed: true,
            transitioned_to_selesai,
        })
    }
}
