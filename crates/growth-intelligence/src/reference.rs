// ABOUTME: WHO reference table storage keyed by indicator, sex, and age or height
// ABOUTME: Loaded once from a JSON dataset at startup and shared read-only across requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! WHO reference tables.
//!
//! Age-based indicators are keyed by age in whole months. Weight-for-height
//! is tabulated by height in 0.5 cm steps, so the measured height is rounded
//! to the nearest step before lookup. Keys are stored as integer tenths of
//! the index so that float values never need hashing.
//!
//! A missing row is not an error: lookups return `None` and the classifier
//! reports a null z-score.

use growth_core::errors::{AppError, AppResult};
use growth_core::models::{Indicator, ReferenceRow, Sex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Height step used by the weight-for-height tables (cm)
pub const HEIGHT_STEP_CM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ReferenceKey {
    indicator: Indicator,
    sex: Sex,
    index_tenths: i64,
}

impl ReferenceKey {
    fn new(indicator: Indicator, sex: Sex, index: f64) -> Self {
        Self {
            indicator,
            sex,
            index_tenths: (index * 10.0).round() as i64,
        }
    }
}

/// One row of the external dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Indicator the row belongs to
    pub indicator: Indicator,
    /// Sex the row belongs to
    pub sex: Sex,
    /// Age in months, or height in cm for weight-for-height
    pub index: f64,
    /// SD cut-offs
    #[serde(flatten)]
    pub row: ReferenceRow,
}

/// In-memory WHO reference tables
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    rows: HashMap<ReferenceKey, ReferenceRow>,
}

impl ReferenceTables {
    /// Create empty tables
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables from dataset records
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if any row is malformed or a key repeats
    pub fn from_records(records: impl IntoIterator<Item = ReferenceRecord>) -> AppResult<Self> {
        let mut tables = Self::new();
        for record in records {
            tables.insert(record.indicator, record.sex, record.index, record.row)?;
        }
        Ok(tables)
    }

    /// Parse a JSON array of [`ReferenceRecord`]s
    ///
    /// # Errors
    ///
    /// Returns `SerializationError` for invalid JSON and `InvalidFormat` for bad rows
    pub fn from_json_str(json: &str) -> AppResult<Self> {
        let records: Vec<ReferenceRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load a JSON dataset from disk
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "Failed to read reference dataset {}",
                path.display()
            ))
            .with_source(e)
        })?;
        let tables = Self::from_json_str(&json)?;
        info!(
            rows = tables.len(),
            path = %path.display(),
            "Loaded WHO reference tables"
        );
        Ok(tables)
    }

    /// Insert one row
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the index is negative or non-finite, the SD
    /// cut-offs are not strictly ascending, or the key already exists
    pub fn insert(
        &mut self,
        indicator: Indicator,
        sex: Sex,
        index: f64,
        row: ReferenceRow,
    ) -> AppResult<()> {
        if !index.is_finite() || index < 0.0 {
            return Err(AppError::invalid_format(format!(
                "Reference index for {indicator}/{sex} must be a non-negative number, got {index}"
            )));
        }
        if !row.is_well_formed() {
            return Err(AppError::invalid_format(format!(
                "Reference row {indicator}/{sex}/{index} must have ascending SD cut-offs"
            )));
        }

        let key = ReferenceKey::new(indicator, sex, index);
        if self.rows.insert(key, row).is_some() {
            return Err(AppError::invalid_format(format!(
                "Duplicate reference row {indicator}/{sex}/{index}"
            )));
        }
        Ok(())
    }

    /// Look up a row by raw index
    #[must_use]
    pub fn lookup(&self, indicator: Indicator, sex: Sex, index: f64) -> Option<&ReferenceRow> {
        let row = self.rows.get(&ReferenceKey::new(indicator, sex, index));
        if row.is_none() {
            debug!(%indicator, %sex, index, "No reference row");
        }
        row
    }

    /// Look up an age-based row; `None` for indicators keyed by height
    #[must_use]
    pub fn lookup_by_age(
        &self,
        indicator: Indicator,
        sex: Sex,
        age_months: u32,
    ) -> Option<&ReferenceRow> {
        if !indicator.is_age_based() {
            return None;
        }
        self.lookup(indicator, sex, f64::from(age_months))
    }

    /// Look up a weight-for-height row, rounding height half-up to 0.5 cm
    #[must_use]
    pub fn lookup_by_height(&self, sex: Sex, height_cm: f64) -> Option<&ReferenceRow> {
        if !height_cm.is_finite() {
            return None;
        }
        self.lookup(
            Indicator::WeightForHeight,
            sex,
            round_to_height_step(height_cm),
        )
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Round a height to the nearest table step, halves rounding up
#[must_use]
pub fn round_to_height_step(height_cm: f64) -> f64 {
    (height_cm / HEIGHT_STEP_CM + 0.5).floor() * HEIGHT_STEP_CM
}
