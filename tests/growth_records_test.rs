// ABOUTME: Integration tests for growth record intake and diagnosis history
// ABOUTME: End-to-end classification, append-only history, and input validation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{classifier, create_test_database, date, engine, stunted_measurement};
use std::sync::Arc;
use stunting_monitor::database::repositories::{
    GrowthRepository, InMemoryGrowthRepository, SqliteGrowthRepository,
};
use stunting_monitor::models::{
    ChildId, GrowthCategory, Indicator, Severity, StuntingStatus,
};
use stunting_monitor::services::GrowthRecordService;

async fn sqlite_service() -> (GrowthRecordService, Arc<dyn GrowthRepository>) {
    let db = create_test_database().await;
    let repo: Arc<dyn GrowthRepository> = Arc::new(SqliteGrowthRepository::new(&db));
    (
        GrowthRecordService::new(classifier(), engine(), repo.clone()),
        repo,
    )
}

#[tokio::test]
async fn test_stunted_boy_end_to_end() {
    let (service, repo) = sqlite_service().await;
    let child = ChildId::new();

    let record = service.record(stunted_measurement(child)).await.unwrap();
    assert_eq!(record.measurement.age_months, 24);

    let diagnosis = &record.diagnosis;
    let hfa = diagnosis.result(Indicator::HeightForAge);
    assert!((hfa.z_score.unwrap() - (-3.5)).abs() < 1e-9);
    assert_eq!(hfa.category, GrowthCategory::VeryShort);
    assert_eq!(diagnosis.status, Some(StuntingStatus::SeverelyStunted));
    assert_eq!(diagnosis.severity, Some(Severity::Severe));

    let wfa = diagnosis.result(Indicator::WeightForAge);
    assert_eq!(wfa.category, GrowthCategory::Underweight);

    // No weight-for-height rows and no MUAC value
    assert!(diagnosis.weight_for_height.z_score.is_none());
    assert_eq!(diagnosis.weight_for_height.category, GrowthCategory::Unknown);
    assert!(diagnosis.muac_for_age.z_score.is_none());
    assert_eq!(diagnosis.notes.len(), 2);

    assert_eq!(diagnosis.recommendations.len(), 2);
    assert!(diagnosis.recommendations[0].contains("rujuk"));
    assert!(diagnosis.recommendations[1].contains("protein"));

    let stored = repo.get_measurement(record.measurement.id).await.unwrap().unwrap();
    assert_eq!(stored, record.measurement);
    let latest = service.latest(child).await.unwrap().unwrap();
    assert_eq!(latest.id, record.diagnosis.id);
    assert_eq!(latest.measurement_id, record.measurement.id);
    assert_eq!(latest.recommendations, record.diagnosis.recommendations);
}

#[tokio::test]
async fn test_history_is_ordered_by_measurement_date() {
    let (service, _) = sqlite_service().await;
    let child = ChildId::new();

    let mut later = stunted_measurement(child);
    later.measured_on = date(2025, 2, 10);
    later.height_cm = 87.0;
    service.record(later).await.unwrap();
    service.record(stunted_measurement(child)).await.unwrap();

    let history = service.history(child).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].measured_on, date(2025, 1, 10));
    assert_eq!(history[1].measured_on, date(2025, 2, 10));

    // Month 25 has no reference rows, so the newest status is not computable
    let latest = service.latest(child).await.unwrap().unwrap();
    assert_eq!(latest.measured_on, date(2025, 2, 10));
    assert_eq!(latest.status, None);
    assert_eq!(latest.severity, None);
    assert!(latest.height_for_age.z_score.is_none());

    assert!(service.history(ChildId::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_measurement_is_not_stored() {
    let repo = Arc::new(InMemoryGrowthRepository::new());
    let service = GrowthRecordService::new(classifier(), engine(), repo.clone());
    let child = ChildId::new();

    let mut before_birth = stunted_measurement(child);
    before_birth.measured_on = date(2022, 12, 1);
    assert!(service.record(before_birth).await.unwrap_err().code.is_validation());

    let mut no_height = stunted_measurement(child);
    no_height.height_cm = f64::NAN;
    assert!(service.record(no_height).await.unwrap_err().code.is_validation());

    assert!(repo.list_measurements(child).await.unwrap().is_empty());
    assert!(service.latest(child).await.unwrap().is_none());
}

#[tokio::test]
async fn test_recompute_history_matches_stored_diagnoses() {
    let repo = Arc::new(InMemoryGrowthRepository::new());
    let service = GrowthRecordService::new(classifier(), engine(), repo);
    let child = ChildId::new();

    service.record(stunted_measurement(child)).await.unwrap();
    let mut taller = stunted_measurement(child);
    taller.measured_on = date(2025, 1, 20);
    taller.height_cm = 86.0;
    service.record(taller).await.unwrap();

    let stored = service.history(child).await.unwrap();
    let recomputed = service.recompute_history(child).await.unwrap();
    assert_eq!(recomputed.len(), stored.len());
    for (fresh, original) in recomputed.iter().zip(&stored) {
        assert_eq!(fresh.measurement_id, original.measurement_id);
        assert_eq!(fresh.status, original.status);
        assert_eq!(fresh.recommendations, original.recommendations);
    }
    assert_eq!(recomputed[1].status, Some(StuntingStatus::Normal));
}
