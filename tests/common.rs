// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides quiet logging, sample plan builders, databases, and reference fixtures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `stunting_monitor`

use chrono::{Duration, NaiveDate, Utc};
use growth_intelligence::{
    ClassificationConfig, DiagnosisEngine, GrowthClassifier, ReferenceTables,
};
use std::sync::{Arc, Once};
use stunting_monitor::database::Database;
use stunting_monitor::models::{
    ChildId, DailyRecommendation, DailyRecommendationId, DailyTargets, DayStatus, MealItem,
    MealItemId, MealSlot, NewGrowthMeasurement, NutritionPlan, PlanId, Sex,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory database with migrations applied
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::connect("sqlite::memory:").await.unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monday of the sample plan week
pub fn week_start() -> NaiveDate {
    date(2025, 3, 3)
}

const SLOTS: [MealSlot; 5] = [
    MealSlot::Morning,
    MealSlot::MorningSnack,
    MealSlot::Noon,
    MealSlot::AfternoonSnack,
    MealSlot::Night,
];

pub fn meal(position: u32) -> MealItem {
    MealItem {
        id: MealItemId::new(),
        position,
        slot: SLOTS[position as usize % SLOTS.len()],
        name: format!("Menu {position}"),
        portion: "1 mangkuk kecil".to_owned(),
        target_calories: 150.0,
        consumed: false,
        nutrition: None,
        recipe: None,
    }
}

pub fn day(plan_id: PlanId, day_index: u8, items: usize) -> DailyRecommendation {
    DailyRecommendation {
        id: DailyRecommendationId::new(),
        plan_id,
        day_index,
        date: week_start() + Duration::days(i64::from(day_index) - 1),
        status: DayStatus::BelumDimulai,
        progress_percentage: 0,
        version: 0,
        meals: (1..=items as u32).map(meal).collect(),
    }
}

/// A valid seven-day plan with `items_per_day` meals on each day
pub fn sample_plan(child_id: ChildId, items_per_day: usize) -> NutritionPlan {
    let id = PlanId::new();
    NutritionPlan {
        id,
        child_id,
        week_index: 1,
        start_date: week_start(),
        end_date: week_start() + Duration::days(6),
        completed: false,
        completed_at: None,
        targets: DailyTargets {
            calories_kcal: 1000.0,
            protein_g: 20.0,
            fat_g: 35.0,
            carbs_g: 130.0,
        },
        days: (1..=7).map(|i| day(id, i, items_per_day)).collect(),
        created_at: Utc::now(),
    }
}

/// WHO-shaped rows for boys at 24 months
pub const REFERENCE_JSON: &str = r#"[
    {"indicator": "height_for_age", "sex": "L", "index": 24,
     "median": 87.0, "minus_3sd": 81.0, "minus_2sd": 83.0, "plus_2sd": 91.0, "plus_3sd": 93.0},
    {"indicator": "weight_for_age", "sex": "L", "index": 24,
     "median": 12.2, "minus_3sd": 8.6, "minus_2sd": 9.7, "plus_2sd": 15.3, "plus_3sd": 17.1}
]"#;

pub fn reference_tables() -> Arc<ReferenceTables> {
    Arc::new(ReferenceTables::from_json_str(REFERENCE_JSON).unwrap())
}

pub fn classifier() -> GrowthClassifier {
    GrowthClassifier::with_config(reference_tables(), ClassificationConfig::default())
}

pub fn engine() -> DiagnosisEngine {
    DiagnosisEngine::default()
}

/// 24 month old boy, 80 cm and 9 kg
pub fn stunted_measurement(child_id: ChildId) -> NewGrowthMeasurement {
    NewGrowthMeasurement {
        child_id,
        birth_date: date(2023, 1, 10),
        measured_on: date(2025, 1, 10),
        sex: Sex::Male,
        weight_kg: 9.0,
        height_cm: 80.0,
        head_circumference_cm: None,
        muac_cm: None,
    }
}
