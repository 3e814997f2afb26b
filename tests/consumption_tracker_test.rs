// ABOUTME: Integration tests for meal consumption toggles
// ABOUTME: Idempotency, un-toggle transitions, not-found handling, and concurrent convergence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{create_test_database, init_test_logging, sample_plan};
use serde_json::json;
use std::sync::Arc;
use stunting_monitor::config::{ConsumptionConfig, PlanStoreConfig};
use stunting_monitor::database::repositories::{
    InMemoryPlanRepository, PlanRepository, SqlitePlanRepository,
};
use stunting_monitor::errors::ErrorCode;
use stunting_monitor::models::{
    ChildId, DailyRecommendationId, DayStatus, MealItemId, NutritionPlan,
};
use stunting_monitor::services::{ConsumptionTracker, NutritionPlanStore};

struct Harness {
    repo: Arc<dyn PlanRepository>,
    tracker: ConsumptionTracker,
    plan: NutritionPlan,
}

async fn harness(repo: Arc<dyn PlanRepository>, items_per_day: usize, retries: u32) -> Harness {
    let store = NutritionPlanStore::new(repo.clone(), PlanStoreConfig::default());
    let plan = store
        .store_plan(sample_plan(ChildId::new(), items_per_day))
        .await
        .unwrap();
    let tracker = ConsumptionTracker::new(
        repo.clone(),
        ConsumptionConfig {
            toggle_retries: retries,
        },
    );
    Harness {
        repo,
        tracker,
        plan,
    }
}

async fn sqlite_harness(items_per_day: usize, retries: u32) -> Harness {
    let db = create_test_database().await;
    harness(Arc::new(SqlitePlanRepository::new(&db)), items_per_day, retries).await
}

async fn memory_harness(items_per_day: usize, retries: u32) -> Harness {
    init_test_logging();
    harness(Arc::new(InMemoryPlanRepository::new()), items_per_day, retries).await
}

#[tokio::test]
async fn test_three_of_seven_items_is_43_percent() {
    let h = sqlite_harness(7, 3).await;
    let day = &h.plan.days[0];

    for meal in &day.meals[..3] {
        h.tracker.toggle_consumed(day.id, meal.id, true).await.unwrap();
    }

    let stored = h.repo.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(stored.consumed_count(), 3);
    assert_eq!(stored.progress_percentage, 43);
    assert_eq!(stored.status, DayStatus::SedangBerjalan);
    assert_eq!(stored.version, 3);
}

#[tokio::test]
async fn test_same_state_toggle_is_idempotent() {
    let h = sqlite_harness(4, 3).await;
    let day = &h.plan.days[2];
    let meal = day.meals[1].id;

    let first = h.tracker.toggle_consumed(day.id, meal, true).await.unwrap();
    assert!(first.changed);
    assert_eq!(first.day.progress_percentage, 25);

    let second = h.tracker.toggle_consumed(day.id, meal, true).await.unwrap();
    assert!(!second.changed);
    assert_eq!(second.day.progress_percentage, 25);
    assert_eq!(second.day.status, DayStatus::SedangBerjalan);
    assert_eq!(second.day.version, first.day.version);
}

#[tokio::test]
async fn test_untoggling_only_item_returns_day_to_not_started() {
    let h = memory_harness(1, 3).await;
    let day = &h.plan.days[6];
    let meal = day.meals[0].id;

    let done = h.tracker.toggle_consumed(day.id, meal, true).await.unwrap();
    assert_eq!(done.day.status, DayStatus::Selesai);
    assert_eq!(done.day.progress_percentage, 100);
    assert!(done.transitioned_to_selesai);

    let undone = h.tracker.toggle_consumed(day.id, meal, false).await.unwrap();
    assert_eq!(undone.day.status, DayStatus::BelumDimulai);
    assert_eq!(undone.day.progress_percentage, 0);
    assert!(!undone.transitioned_to_selesai);
}

#[tokio::test]
async fn test_untoggling_moves_finished_day_back_to_in_progress() {
    let h = sqlite_harness(2, 3).await;
    let day = &h.plan.days[0];

    for meal in &day.meals {
        h.tracker.toggle_consumed(day.id, meal.id, true).await.unwrap();
    }
    let outcome = h
        .tracker
        .toggle_consumed(day.id, day.meals[0].id, false)
        .await
        .unwrap();
    assert_eq!(outcome.day.status, DayStatus::SedangBerjalan);
    assert_eq!(outcome.day.progress_percentage, 50);
}

#[tokio::test]
async fn test_unknown_meal_and_day_are_not_found() {
    let h = sqlite_harness(3, 3).await;
    let day = &h.plan.days[0];

    let err = h
        .tracker
        .toggle_consumed(day.id, MealItemId::new(), true)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // A meal of another day does not belong to this one
    let foreign = h.plan.days[1].meals[0].id;
    let err = h
        .tracker
        .toggle_consumed(day.id, foreign, true)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = h
        .tracker
        .toggle_consumed(DailyRecommendationId::new(), day.meals[0].id, true)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let stored = h.repo.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 0);
}

#[tokio::test]
async fn test_non_boolean_target_is_rejected_before_mutation() {
    let h = memory_harness(3, 3).await;
    let day = &h.plan.days[0];
    let meal = day.meals[0].id;

    for value in [json!("true"), json!(1), json!(null)] {
        let err = h
            .tracker
            .toggle_consumed_raw(day.id, meal, &value)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    let stored = h.repo.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(stored.consumed_count(), 0);
    assert_eq!(stored.version, 0);

    let outcome = h
        .tracker
        .toggle_consumed_raw(day.id, meal, &json!(true))
        .await
        .unwrap();
    assert!(outcome.changed);
}

#[tokio::test]
async fn test_stale_version_is_a_conflict() {
    for h in [memory_harness(2, 1).await, sqlite_harness(2, 1).await] {
        let day = h.repo.get_day(h.plan.days[0].id).await.unwrap().unwrap();

        let mut first = day.clone();
        first.meals[0].consumed = true;
        let saved = h.repo.save_day(&first, day.version).await.unwrap();
        assert_eq!(saved.version, day.version + 1);

        let mut stale = day.clone();
        stale.meals[1].consumed = true;
        let err = h.repo.save_day(&stale, day.version).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
        assert!(err.is_retryable());

        // The losing write left nothing behind
        let current = h.repo.get_day(day.id).await.unwrap().unwrap();
        assert!(current.meals[0].consumed);
        assert!(!current.meals[1].consumed);
    }
}

async fn toggle_all_concurrently(h: &Harness) {
    let day = h.plan.days[3].clone();
    let handles: Vec<_> = day
        .meals
        .iter()
        .map(|meal| {
            let tracker = h.tracker.clone();
            let (day_id, meal_id) = (day.id, meal.id);
            tokio::spawn(async move { tracker.toggle_consumed(day_id, meal_id, true).await })
        })
        .collect();

    let mut transitions = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.changed);
        if outcome.transitioned_to_selesai {
            transitions += 1;
        }
    }

    let stored = h.repo.get_day(day.id).await.unwrap().unwrap();
    assert_eq!(stored.consumed_count(), day.meals.len());
    assert_eq!(stored.progress_percentage, 100);
    assert_eq!(stored.status, DayStatus::Selesai);
    assert_eq!(stored.version, day.meals.len() as u64);
    assert_eq!(transitions, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_converge_in_memory() {
    let h = memory_harness(7, 50).await;
    toggle_all_concurrently(&h).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_converge_in_sqlite() {
    let h = sqlite_harness(7, 50).await;
    toggle_all_concurrently(&h).await;
}
