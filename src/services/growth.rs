// ABOUTME: Growth record service turning raw measurements into stored diagnoses
// ABOUTME: Validates, classifies, diagnoses, and appends to the per-child history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::repositories::GrowthRepository;
use crate::errors::AppResult;
use growth_core::models::{ChildId, Diagnosis, GrowthMeasurement, NewGrowthMeasurement};
use growth_intelligence::{DiagnosisEngine, GrowthClassifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A stored measurement with its diagnosis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthRecord {
    /// The validated measurement
    pub measurement: GrowthMeasurement,
    /// Diagnosis derived from it
    pub diagnosis: Diagnosis,
}

/// Entry point for new growth measurements
#[derive(Clone)]
pub struct GrowthRecordService {
    classifier: GrowthClassifier,
    engine: DiagnosisEngine,
    repo: Arc<dyn GrowthRepository>,
}

impl GrowthRecordService {
    /// Create a service
    #[must_use]
    pub fn new(
        classifier: GrowthClassifier,
        engine: DiagnosisEngine,
        repo: Arc<dyn GrowthRepository>,
    ) -> Self {
        Self {
            classifier,
            engine,
            repo,
        }
    }

    /// Validate, classify, and diagnose a measurement, then append both
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid input (nothing is stored), or
    /// the repository error if the write fails
    pub async fn record(&self, input: NewGrowthMeasurement) -> AppResult<GrowthRecord> {
        let measurement = GrowthMeasurement::new(input)?;
        let classification = self.classifier.classify_measurement(&measurement)?;
        let diagnosis = self.engine.diagnose(&measurement, classification);

        self.repo.insert_record(&measurement, &diagnosis).await?;
        info!(
            child_id = %measurement.child_id,
            measurement_id = %measurement.id,
            status = ?diagnosis.status,
            "Recorded growth measurement"
        );

        Ok(GrowthRecord {
            measurement,
            diagnosis,
        })
    }

    /// Diagnosis history in measurement-date order
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn history(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>> {
        self.repo.list_diagnoses(child_id).await
    }

    /// Most recent diagnosis
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn latest(&self, child_id: ChildId) -> AppResult<Option<Diagnosis>> {
        self.repo.latest_diagnosis(child_id).await
    }

    /// Re-derive diagnoses for every stored measurement with the current tables
    ///
    /// Stored diagnoses are not modified. Measurements that no longer pass
    /// classification are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails
    pub async fn recompute_history(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>> {
        let measurements = self.repo.list_measurements(child_id).await?;
        let classifications = self.classifier.classify_batch(&measurements);

        let mut diagnoses = Vec::with_capacity(measurements.len());
        for (measurement, classification) in measurements.iter().zip(classifications) {
            match classification {
                Ok(classification) => {
                    diagnoses.push(self.engine.diagnose(measurement, classification));
                }
                Err(e) => warn!(
                    measurement_id = %measurement.id,
                    error = %e,
                    "Skipping measurement during history recomputation"
                ),
            }
        }
        Ok(diagnoses)
    }
}
