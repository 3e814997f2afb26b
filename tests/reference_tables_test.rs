// ABOUTME: Tests for loading WHO reference tables from a dataset file
// ABOUTME: Covers a valid file, a missing file, and a malformed dataset
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{init_test_logging, REFERENCE_JSON};
use growth_intelligence::ReferenceTables;
use std::fs;
use stunting_monitor::errors::ErrorCode;
use stunting_monitor::models::{Indicator, Sex};
use tempfile::TempDir;

#[test]
fn test_load_reference_dataset_from_file() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("who.json");
    fs::write(&path, REFERENCE_JSON).unwrap();

    let tables = ReferenceTables::from_path(&path).unwrap();
    assert_eq!(tables.len(), 2);

    let row = tables
        .lookup_by_age(Indicator::HeightForAge, Sex::Male, 24)
        .unwrap();
    assert!((row.median - 87.0).abs() < f64::EPSILON);
    assert!(tables
        .lookup_by_age(Indicator::HeightForAge, Sex::Female, 24)
        .is_none());
}

#[test]
fn test_missing_reference_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let err = ReferenceTables::from_path(dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
}

#[test]
fn test_malformed_reference_row_rejects_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"[{"indicator": "height_for_age", "sex": "P", "index": 12,
            "median": 74.0, "minus_3sd": 76.0, "minus_2sd": 70.0, "plus_2sd": 78.0, "plus_3sd": 80.0}]"#,
    )
    .unwrap();

    assert!(ReferenceTables::from_path(&path).is_err());
}
