// ABOUTME: SQLite implementation of GrowthRepository
// ABOUTME: Delegates to GrowthManager over the shared connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::GrowthRepository;
use crate::database::{Database, GrowthManager};
use crate::errors::AppResult;
use async_trait::async_trait;
use growth_core::models::{ChildId, Diagnosis, GrowthMeasurement, MeasurementId};

/// `SQLite` implementation of `GrowthRepository`
#[derive(Clone, Debug)]
pub struct SqliteGrowthRepository {
    manager: GrowthManager,
}

impl SqliteGrowthRepository {
    /// Create a repository over the given database
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            manager: db.growth(),
        }
    }
}

#[async_trait]
impl GrowthRepository for SqliteGrowthRepository {
    async fn insert_record(
        &self,
        measurement: &GrowthMeasurement,
        diagnosis: &Diagnosis,
    ) -> AppResult<()> {
        self.manager.insert_record(measurement, diagnosis).await
    }

    async fn get_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> AppResult<Option<GrowthMeasurement>> {
        self.manager.get_measurement(measurement_id).await
    }

    async fn list_measurements(&self, child_id: ChildId) -> AppResult<Vec<GrowthMeasurement>> {
        self.manager.list_measurements(child_id).await
    }

    async fn list_diagnoses(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>> {
        self.manager.list_diagnoses(child_id).await
    }

    async fn latest_diagnosis(&self, child_id: ChildId) -> AppResult<Option<Diagnosis>> {
        self.manager.latest_diagnosis(child_id).await
    }
}
