// ABOUTME: Integration tests for the nutrition plan store
// ABOUTME: Structural validation, single active plan per child, and completion rules
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use chrono::Duration;
use common::{create_test_database, init_test_logging, sample_plan};
use std::sync::Arc;
use stunting_monitor::config::PlanStoreConfig;
use stunting_monitor::database::repositories::{
    InMemoryPlanRepository, PlanRepository, SqlitePlanRepository,
};
use stunting_monitor::errors::ErrorCode;
use stunting_monitor::models::{ChildId, DayStatus, PlanId};
use stunting_monitor::services::NutritionPlanStore;

fn memory_store(require_full_progress: bool) -> NutritionPlanStore {
    init_test_logging();
    NutritionPlanStore::new(
        Arc::new(InMemoryPlanRepository::new()),
        PlanStoreConfig {
            require_full_progress,
        },
    )
}

async fn sqlite_store() -> NutritionPlanStore {
    let db = create_test_database().await;
    let repo: Arc<dyn PlanRepository> = Arc::new(SqlitePlanRepository::new(&db));
    NutritionPlanStore::new(repo, PlanStoreConfig::default())
}

#[tokio::test]
async fn test_store_and_read_back_active_plan() {
    let store = sqlite_store().await;
    let child = ChildId::new();
    let plan = sample_plan(child, 5);

    store.store_plan(plan.clone()).await.unwrap();

    let active = store.get_active_plan(child).await.unwrap().unwrap();
    assert_eq!(active.id, plan.id);
    assert_eq!(active.days.len(), 7);
    assert_eq!(active.targets, plan.targets);
    for (stored, original) in active.days.iter().zip(&plan.days) {
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.date, original.date);
        assert_eq!(stored.meals, original.meals);
    }
}

#[tokio::test]
async fn test_no_active_plan_for_unknown_child() {
    let store = sqlite_store().await;
    assert!(store.get_active_plan(ChildId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejects_wrong_day_count() {
    let store = memory_store(false);
    let child = ChildId::new();
    let mut plan = sample_plan(child, 3);
    plan.days.pop();

    let err = store.store_plan(plan).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert!(store.get_active_plan(child).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejects_non_monotonic_day_indices() {
    let store = memory_store(false);
    let mut plan = sample_plan(ChildId::new(), 3);
    plan.days.swap(1, 2);

    let err = store.store_plan(plan).await.unwrap_err();
    assert!(err.code.is_validation());
}

#[tokio::test]
async fn test_rejects_dates_outside_range_and_duplicates() {
    let store = memory_store(false);

    let mut outside = sample_plan(ChildId::new(), 3);
    outside.days[6].date = outside.end_date + Duration::days(1);
    assert!(store.store_plan(outside).await.unwrap_err().code.is_validation());

    let mut duplicate = sample_plan(ChildId::new(), 3);
    duplicate.days[3].date = duplicate.days[2].date;
    assert!(store.store_plan(duplicate).await.unwrap_err().code.is_validation());
}

#[tokio::test]
async fn test_rejects_day_owned_by_another_plan() {
    let store = memory_store(false);
    let mut plan = sample_plan(ChildId::new(), 3);
    plan.days[0].plan_id = PlanId::new();

    assert!(store.store_plan(plan).await.unwrap_err().code.is_validation());
}

#[tokio::test]
async fn test_rejects_negative_target_calories() {
    let store = memory_store(false);
    let mut plan = sample_plan(ChildId::new(), 3);
    plan.days[4].meals[1].target_calories = -10.0;

    assert!(store.store_plan(plan).await.unwrap_err().code.is_validation());
}

#[tokio::test]
async fn test_second_active_plan_is_rejected() {
    for store in [memory_store(false), sqlite_store().await] {
        let child = ChildId::new();
        store.store_plan(sample_plan(child, 3)).await.unwrap();

        let err = store.store_plan(sample_plan(child, 3)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

        // Other children are independent
        store.store_plan(sample_plan(ChildId::new(), 3)).await.unwrap();
    }
}

#[tokio::test]
async fn test_supplied_progress_is_recomputed() {
    let store = sqlite_store().await;
    let mut plan = sample_plan(ChildId::new(), 4);
    for meal in &mut plan.days[0].meals {
        meal.consumed = true;
    }
    plan.days[1].progress_percentage = 90;
    plan.days[1].status = DayStatus::Selesai;
    plan.days[2].version = 17;

    let stored = store.store_plan(plan).await.unwrap();
    assert_eq!(stored.days[0].progress_percentage, 100);
    assert_eq!(stored.days[0].status, DayStatus::Selesai);
    assert_eq!(stored.days[1].progress_percentage, 0);
    assert_eq!(stored.days[1].status, DayStatus::BelumDimulai);
    assert_eq!(stored.days[2].version, 0);

    let read = store.get_plan(stored.id).await.unwrap();
    assert_eq!(read.days[0].status, DayStatus::Selesai);
    assert_eq!(read.days[2].version, 0);
}

#[tokio::test]
async fn test_mark_completed_is_idempotent_and_frees_the_child() {
    let store = sqlite_store().await;
    let child = ChildId::new();
    let plan = store.store_plan(sample_plan(child, 3)).await.unwrap();

    let completed = store.mark_completed(plan.id).await.unwrap();
    assert!(completed.completed);
    let completed_at = completed.completed_at.unwrap();

    let again = store.mark_completed(plan.id).await.unwrap();
    assert!(again.completed);
    assert_eq!(again.completed_at, Some(completed_at));

    assert!(store.get_active_plan(child).await.unwrap().is_none());

    let mut next_week = sample_plan(child, 3);
    next_week.week_index = 2;
    store.store_plan(next_week).await.unwrap();

    let plans = store.list_plans(child).await.unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0].week_index, 1);
    assert_eq!(plans[1].week_index, 2);
}

#[tokio::test]
async fn test_mark_completed_unknown_plan() {
    let store = memory_store(false);
    let err = store.mark_completed(PlanId::new()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_full_progress_required_when_configured() {
    let store = memory_store(true);
    let plan = store.store_plan(sample_plan(ChildId::new(), 2)).await.unwrap();

    let err = store.mark_completed(plan.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut finished = sample_plan(ChildId::new(), 2);
    for day in &mut finished.days {
        for meal in &mut day.meals {
            meal.consumed = true;
        }
    }
    let finished = store.store_plan(finished).await.unwrap();
    assert!(store.mark_completed(finished.id).await.unwrap().completed);
}

#[tokio::test]
async fn test_full_week_summary_is_eligible_for_completion() {
    let store = memory_store(false);
    let mut plan = sample_plan(ChildId::new(), 3);
    for day in &mut plan.days {
        for meal in &mut day.meals {
            meal.consumed = true;
        }
    }
    let plan = store.store_plan(plan).await.unwrap();

    let summary = store.plan_summary(plan.id).await.unwrap();
    assert_eq!(summary.plan_percentage, 100);
    assert_eq!(summary.completed_days, 7);
    assert!(summary.eligible_for_completion);
    assert_eq!(summary.label(), "7/7 hari selesai (100%)");
}
