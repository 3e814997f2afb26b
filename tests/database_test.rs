// ABOUTME: Integration tests for SQLite storage of plans and growth records
// ABOUTME: File-backed persistence, idempotent migrations, and the active-plan index
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use chrono::Utc;
use common::{create_test_database, init_test_logging, sample_plan};
use std::sync::Arc;
use stunting_monitor::config::{ConsumptionConfig, DatabaseUrl};
use stunting_monitor::database::repositories::SqlitePlanRepository;
use stunting_monitor::database::Database;
use stunting_monitor::errors::ErrorCode;
use stunting_monitor::models::{ChildId, DayStatus, PlanId, Recipe};
use stunting_monitor::services::ConsumptionTracker;
use tempfile::TempDir;

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("nested").join("growth.db"),
    };
    let child = ChildId::new();
    let plan = sample_plan(child, 2);

    {
        let db = Database::new(&url).await.unwrap();
        db.plans().insert_plan(&plan).await.unwrap();
        db.pool().close().await;
    }

    let reopened = Database::new(&url).await.unwrap();
    let active = reopened.plans().find_active_plan(child).await.unwrap().unwrap();
    assert_eq!(active.id, plan.id);
    assert_eq!(active.days.len(), 7);
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let db = create_test_database().await;
    db.migrate().await.unwrap();
    db.migrate().await.unwrap();
}

#[tokio::test]
async fn test_active_plan_index_rejects_second_insert() {
    let db = create_test_database().await;
    let plans = db.plans();
    let child = ChildId::new();

    plans.insert_plan(&sample_plan(child, 1)).await.unwrap();
    let err = plans.insert_plan(&sample_plan(child, 1)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);

    // The failed insert rolled back its days as well
    let all = plans.list_plans(child).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_completed_plans_do_not_block_new_ones() {
    let db = create_test_database().await;
    let plans = db.plans();
    let child = ChildId::new();

    let first = sample_plan(child, 1);
    plans.insert_plan(&first).await.unwrap();
    assert!(plans.set_completed(first.id, Utc::now()).await.unwrap());
    assert!(!plans.set_completed(first.id, Utc::now()).await.unwrap());

    plans.insert_plan(&sample_plan(child, 1)).await.unwrap();

    let err = plans.set_completed(PlanId::new(), Utc::now()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_meal_order_and_optional_content_round_trip() {
    let db = create_test_database().await;
    let mut plan = sample_plan(ChildId::new(), 3);
    plan.days[0].meals.reverse();
    plan.days[0].meals[0].recipe = Some(Recipe {
        ingredients: vec!["1 butir telur".to_owned()],
        steps: vec!["Kukus selama 10 menit".to_owned()],
    });
    db.plans().insert_plan(&plan).await.unwrap();

    let day = db.plans().get_day(plan.days[0].id).await.unwrap().unwrap();
    let positions: Vec<u32> = day.meals.iter().map(|m| m.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    let with_recipe = day.meals.iter().find(|m| m.recipe.is_some()).unwrap();
    assert_eq!(with_recipe.position, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_toggles_on_file_database() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let db = Database::new(&DatabaseUrl::SQLite {
        path: dir.path().join("growth.db"),
    })
    .await
    .unwrap();

    let plan = sample_plan(ChildId::new(), 6);
    db.plans().insert_plan(&plan).await.unwrap();
    let tracker = ConsumptionTracker::new(
        Arc::new(SqlitePlanRepository::new(&db)),
        ConsumptionConfig { toggle_retries: 50 },
    );

    let day = plan.days[5].clone();
    let handles: Vec<_> = day
        .meals
        .iter()
        .map(|meal| {
            let tracker = tracker.clone();
            let (day_id, meal_id) = (day.id, meal.id);
            tokio::spawn(async move { tracker.toggle_consumed(day_id, meal_id, true).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = db.plans().get_day(day.id).await.unwrap().unwrap();
    assert_eq!(stored.status, DayStatus::Selesai);
    assert_eq!(stored.progress_percentage, 100);
    assert_eq!(stored.version, 6);
}
