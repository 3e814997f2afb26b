// ABOUTME: Rolls meal consumption flags up into day and plan progress and status
// ABOUTME: Always recomputed from the full item set; stored percentages are only caches
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Progress aggregation.
//!
//! The plan percentage is the mean of the daily percentages, not the ratio
//! of consumed items across the week, so every day weighs the same whatever
//! its item count. All rounding is half-up on integers.

use chrono::NaiveDate;
use growth_core::constants::plan::{ALMOST_COMPLETE_PERCENTAGE, COMPLETE_PERCENTAGE};
use growth_core::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, DayStatus, NutritionPlan, PlanId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Integer percentage of `part` over `total`, rounded half-up; 0 when `total` is 0
///
/// 100 is reserved for `part == total`, so a nearly complete day reports 99.
#[must_use]
pub fn percentage_of(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = part.min(total);
    let rounded = (200 * part + total) / (2 * total);
    let percentage = u8::try_from(rounded).unwrap_or(COMPLETE_PERCENTAGE);
    if part < total {
        percentage.min(ALMOST_COMPLETE_PERCENTAGE)
    } else {
        percentage
    }
}

/// Share of consumed items in a day
#[must_use]
pub fn day_percentage(day: &DailyRecommendation) -> u8 {
    percentage_of(day.consumed_count(), day.meals.len())
}

/// Status implied by a day's consumption flags
#[must_use]
pub fn day_status(day: &DailyRecommendation) -> DayStatus {
    let consumed = day.consumed_count();
    if consumed == 0 {
        DayStatus::BelumDimulai
    } else if consumed == day.meals.len() {
        DayStatus::Selesai
    } else {
        DayStatus::SedangBerjalan
    }
}

/// Rounded mean of daily percentages; 0 for no days
///
/// Like day percentages, 100 only when every day is at 100.
#[must_use]
pub fn plan_percentage_of(day_percentages: &[u8]) -> u8 {
    let n = day_percentages.len();
    if n == 0 {
        return 0;
    }
    let sum: usize = day_percentages.iter().map(|p| usize::from(*p)).sum();
    let rounded = (2 * sum + n) / (2 * n);
    let percentage = u8::try_from(rounded).unwrap_or(COMPLETE_PERCENTAGE);
    if day_percentages.iter().any(|p| *p < COMPLETE_PERCENTAGE) {
        percentage.min(ALMOST_COMPLETE_PERCENTAGE)
    } else {
        percentage
    }
}

/// Plan percentage recomputed from every day's items
#[must_use]
pub fn plan_percentage(plan: &NutritionPlan) -> u8 {
    let days: Vec<u8> = plan.days.iter().map(day_percentage).collect();
    plan_percentage_of(&days)
}

/// Every day has all of its items consumed
#[must_use]
pub fn is_plan_complete(plan: &NutritionPlan) -> bool {
    !plan.days.is_empty()
        && plan
            .days
            .iter()
            .all(|d| day_status(d) == DayStatus::Selesai)
}

/// Refresh a day's cached progress; returns whether anything changed
pub fn recompute_day(day: &mut DailyRecommendation) -> bool {
    let percentage = day_percentage(day);
    let status = day_status(day);
    let changed = day.progress_percentage != percentage || day.status != status;
    if changed {
        debug!(
            day_id = %day.id,
            from_status = %day.status,
            to_status = %status,
            from_percentage = day.progress_percentage,
            to_percentage = percentage,
            "Recomputed day progress"
        );
    }
    day.progress_percentage = percentage;
    day.status = status;
    changed
}

/// Refresh every day of a plan; returns whether any day changed
pub fn recompute_plan(plan: &mut NutritionPlan) -> bool {
    plan.days
        .iter_mut()
        .fold(false, |changed, day| recompute_day(day) || changed)
}

/// Progress of one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySummary {
    /// Day id
    pub day_id: DailyRecommendationId,
    /// Day index (1-7)
    pub day_index: u8,
    /// Calendar date
    pub date: NaiveDate,
    /// Derived status
    pub status: DayStatus,
    /// Derived percentage
    pub progress_percentage: u8,
    /// Consumed items
    pub consumed_items: usize,
    /// All items
    pub total_items: usize,
    /// Target calories of consumed items
    pub consumed_calories: f64,
    /// Target calories of all items
    pub target_calories: f64,
}

impl DaySummary {
    /// Summarize a day from its items
    #[must_use]
    pub fn from_day(day: &DailyRecommendation) -> Self {
        Self {
            day_id: day.id,
            day_index: day.day_index,
            date: day.date,
            status: day_status(day),
            progress_percentage: day_percentage(day),
            consumed_items: day.consumed_count(),
            total_items: day.meals.len(),
            consumed_calories: day.consumed_calories(),
            target_calories: day.meals.iter().map(|m| m.target_calories).sum(),
        }
    }
}

/// Weekly rollup consumed by summary views and reminder triggers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    /// Plan id
    pub plan_id: PlanId,
    /// Owning child
    pub child_id: ChildId,
    /// Week number
    pub week_index: u32,
    /// First day
    pub start_date: NaiveDate,
    /// Last day
    pub end_date: NaiveDate,
    /// Completion flag
    pub completed: bool,
    /// Mean of daily percentages
    pub plan_percentage: u8,
    /// Days with status `selesai`
    pub completed_days: usize,
    /// Whether every day is finished
    pub eligible_for_completion: bool,
    /// Per-day progress
    pub days: Vec<DaySummary>,
}

impl PlanSummary {
    /// Short text rollup, e.g. `3/7 hari selesai (43%)`
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{} hari selesai ({}%)",
            self.completed_days,
            self.days.len(),
            self.plan_percentage
        )
    }
}

/// Build the summary for a plan
#[must_use]
pub fn summarize_plan(plan: &NutritionPlan) -> PlanSummary {
    let days: Vec<DaySummary> = plan.days.iter().map(DaySummary::from_day).collect();
    let percentages: Vec<u8> = days.iter().map(|d| d.progress_percentage).collect();
    PlanSummary {
        plan_id: plan.id,
        child_id: plan.child_id,
        week_index: plan.week_index,
        start_date: plan.start_date,
        end_date: plan.end_date,
        completed: plan.completed,
        plan_percentage: plan_percentage_of(&percentages),
        completed_days: days
            .iter()
            .filter(|d| d.status == DayStatus::Selesai)
            .count(),
        eligible_for_completion: is_plan_complete(plan),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use growth_core::models::{DailyTargets, MealItem, MealItemId, MealSlot};

    fn meals(total: usize, consumed: usize) -> Vec<MealItem> {
        (0..total)
            .map(|i| MealItem {
                id: MealItemId::new(),
                position: u32::try_from(i).unwrap(),
                slot: MealSlot::Other,
                name: format!("Menu {i}"),
                portion: "1 porsi".to_owned(),
                target_calories: 100.0,
                consumed: i < consumed,
                nutrition: None,
                recipe: None,
            })
            .collect()
    }

    fn day(index: u8, total: usize, consumed: usize) -> DailyRecommendation {
        DailyRecommendation {
            id: DailyRecommendationId::new(),
            plan_id: PlanId::new(),
            day_index: index,
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap() + Duration::days(i64::from(index)),
            status: DayStatus::default(),
            progress_percentage: 0,
            version: 0,
            meals: meals(total, consumed),
        }
    }

    fn plan(days: Vec<DailyRecommendation>) -> NutritionPlan {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        NutritionPlan {
            id: PlanId::new(),
            child_id: ChildId::new(),
            week_index: 1,
            start_date: start,
            end_date: start + Duration::days(6),
            completed: false,
            completed_at: None,
            targets: DailyTargets::default(),
            days,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_three_of_seven_items() {
        let d = day(1, 7, 3);
        assert_eq!(day_percentage(&d), 43);
        assert_eq!(day_status(&d), DayStatus::SedangBerjalan);
    }

    #[test]
    fn test_empty_day_is_zero() {
        let d = day(1, 0, 0);
        assert_eq!(day_percentage(&d), 0);
        assert_eq!(day_status(&d), DayStatus::BelumDimulai);
        assert_eq!(plan_percentage_of(&[]), 0);
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(percentage_of(1, 8), 13);
        assert_eq!(percentage_of(1, 200), 1);
        assert_eq!(plan_percentage_of(&[50, 51]), 51);
    }

    #[test]
    fn test_nearly_complete_day_stays_below_hundred() {
        let d = day(1, 200, 199);
        assert_eq!(day_percentage(&d), 99);
        assert_eq!(day_status(&d), DayStatus::SedangBerjalan);

        let full = day(1, 200, 200);
        assert_eq!(day_percentage(&full), 100);
        assert_eq!(day_status(&full), DayStatus::Selesai);
    }

    #[test]
    fn test_week_at_hundred_only_when_every_day_is_done() {
        let mut days: Vec<DailyRecommendation> = (1..=6).map(|i| day(i, 5, 5)).collect();
        days.push(day(7, 200, 199));
        let p = plan(days);

        assert_eq!(plan_percentage_of(&[100, 100, 100, 100, 100, 100, 99]), 99);
        let summary = summarize_plan(&p);
        assert_eq!(summary.plan_percentage, 99);
        assert!(!summary.eligible_for_completion);
        assert!(!is_plan_complete(&p));
    }

    #[test]
    fn test_plan_percentage_is_mean_of_days() {
        // Day A: 1/1 consumed (100%), day B: 1/9 consumed (11%)
        // Mean of days: 56. Raw item ratio: 2/10 = 20.
        let p = plan(vec![day(1, 1, 1), day(2, 9, 1)]);
        assert_eq!(plan_percentage(&p), 56);
        assert_ne!(plan_percentage(&p), percentage_of(2, 10));
    }

    #[test]
    fn test_full_week_is_complete() {
        let p = plan((1..=7).map(|i| day(i, 5, 5)).collect());
        assert_eq!(plan_percentage(&p), 100);
        assert!(is_plan_complete(&p));

        let summary = summarize_plan(&p);
        assert!(summary.eligible_for_completion);
        assert_eq!(summary.completed_days, 7);
        assert_eq!(summary.label(), "7/7 hari selesai (100%)");
    }

    #[test]
    fn test_untoggle_returns_day_to_not_started() {
        let mut d = day(1, 1, 1);
        assert!(recompute_day(&mut d));
        assert_eq!(d.status, DayStatus::Selesai);
        assert_eq!(d.progress_percentage, 100);

        d.meals[0].consumed = false;
        assert!(recompute_day(&mut d));
        assert_eq!(d.status, DayStatus::BelumDimulai);
        assert_eq!(d.progress_percentage, 0);
        assert!(!recompute_day(&mut d));
    }

    #[test]
    fn test_recompute_plan_overwrites_stale_cache() {
        let mut stale = day(1, 4, 2);
        stale.progress_percentage = 100;
        stale.status = DayStatus::Selesai;
        let mut p = plan(vec![stale, day(2, 4, 0)]);

        assert!(recompute_plan(&mut p));
        assert_eq!(p.days[0].progress_percentage, 50);
        assert_eq!(p.days[0].status, DayStatus::SedangBerjalan);
        assert!(!recompute_plan(&mut p));
    }
}
