// ABOUTME: SQLite persistence for growth measurements and their diagnoses
// ABOUTME: Both are append-only; a measurement and its diagnosis are written together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::plans::{parse_id, parse_timestamp};
use super::transactions::TransactionGuard;
use crate::errors::{AppResult, DatabaseResultExt};
use growth_core::models::{ChildId, Diagnosis, GrowthMeasurement, MeasurementId, Sex};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

/// Database manager for growth records
#[derive(Clone, Debug)]
pub struct GrowthManager {
    pool: SqlitePool,
}

impl GrowthManager {
    /// Create a new growth record manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a measurement together with the diagnosis derived from it
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; nothing is stored in that case
    pub async fn insert_record(
        &self,
        measurement: &GrowthMeasurement,
        diagnosis: &Diagnosis,
    ) -> AppResult<()> {
        let mut guard = TransactionGuard::begin(&self.pool).await?;

        sqlx::query(
            r"
            INSERT INTO growth_measurements
                (id, child_id, measured_on, age_months, sex, weight_kg, height_cm,
                 head_circumference_cm, muac_cm, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(measurement.id.to_string())
        .bind(measurement.child_id.to_string())
        .bind(measurement.measured_on)
        .bind(i64::from(measurement.age_months))
        .bind(measurement.sex.code())
        .bind(measurement.weight_kg)
        .bind(measurement.height_cm)
        .bind(measurement.head_circumference_cm)
        .bind(measurement.muac_cm)
        .bind(measurement.recorded_at.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .db_context("Failed to insert growth measurement")?;

        sqlx::query(
            r"
            INSERT INTO diagnoses
                (id, measurement_id, child_id, measured_on, status, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(diagnosis.id.to_string())
        .bind(diagnosis.measurement_id.to_string())
        .bind(diagnosis.child_id.to_string())
        .bind(diagnosis.measured_on)
        .bind(diagnosis.status.map(|s| s.as_str()))
        .bind(serde_json::to_string(diagnosis)?)
        .bind(diagnosis.created_at.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .db_context("Failed to insert diagnosis")?;

        guard.commit().await?;
        debug!(
            measurement_id = %measurement.id,
            child_id = %measurement.child_id,
            "Stored growth record"
        );
        Ok(())
    }

    /// Get one measurement
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> AppResult<Option<GrowthMeasurement>> {
        let row = sqlx::query(
            r"
            SELECT id, child_id, measured_on, age_months, sex, weight_kg, height_cm,
                   head_circumference_cm, muac_cm, recorded_at
            FROM growth_measurements
            WHERE id = $1
            ",
        )
        .bind(measurement_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to get growth measurement")?;

        row.as_ref().map(row_to_measurement).transpose()
    }

    /// A child's measurements in measurement-date order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_measurements(&self, child_id: ChildId) -> AppResult<Vec<GrowthMeasurement>> {
        let rows = sqlx::query(
            r"
            SELECT id, child_id, measured_on, age_months, sex, weight_kg, height_cm,
                   head_circumference_cm, muac_cm, recorded_at
            FROM growth_measurements
            WHERE child_id = $1
            ORDER BY measured_on, recorded_at
            ",
        )
        .bind(child_id.to_string())
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to list growth measurements")?;

        rows.iter().map(row_to_measurement).collect()
    }

    /// A child's diagnoses in measurement-date order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_diagnoses(&self, child_id: ChildId) -> AppResult<Vec<Diagnosis>> {
        let rows = sqlx::query(
            r"
            SELECT payload FROM diagnoses
            WHERE child_id = $1
            ORDER BY measured_on, created_at
            ",
        )
        .bind(child_id.to_string())
        .fetch_all(&self.pool)
        .await
        .db_context("Failed to list diagnoses")?;

        rows.iter().map(row_to_diagnosis).collect()
    }

    /// The diagnosis of the child's most recent measurement
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn latest_diagnosis(&self, child_id: ChildId) -> AppResult<Option<Diagnosis>> {
        let row = sqlx::query(
            r"
            SELECT payload FROM diagnoses
            WHERE child_id = $1
            ORDER BY measured_on DESC, created_at DESC
            LIMIT 1
            ",
        )
        .bind(child_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .db_context("Failed to get latest diagnosis")?;

        row.as_ref().map(row_to_diagnosis).transpose()
    }
}

fn row_to_measurement(row: &SqliteRow) -> AppResult<GrowthMeasurement> {
    let id: String = row.get("id");
    let child_id: String = row.get("child_id");
    let sex: String = row.get("sex");
    let age_months: i64 = row.get("age_months");
    let recorded_at: String = row.get("recorded_at");

    Ok(GrowthMeasurement {
        id: parse_id(&id)?,
        child_id: parse_id(&child_id)?,
        measured_on: row.get("measured_on"),
        age_months: age_months as u32,
        sex: Sex::parse(&sex)?,
        weight_kg: row.get("weight_kg"),
        height_cm: row.get("height_cm"),
        head_circumference_cm: row.get("head_circumference_cm"),
        muac_cm: row.get("muac_cm"),
        recorded_at: parse_timestamp(&recorded_at)?,
    })
}

fn row_to_diagnosis(row: &SqliteRow) -> AppResult<Diagnosis> {
    let payload: String = row.get("payload");
    Ok(serde_json::from_str(&payload)?)
}
