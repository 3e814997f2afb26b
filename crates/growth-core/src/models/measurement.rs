// ABOUTME: Growth measurement record with age-in-months derivation and input validation
// ABOUTME: Immutable once created; newer measurements supersede older ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ids::{ChildId, MeasurementId};
use crate::constants::measurement::{MAX_CIRCUMFERENCE_CM, MAX_HEIGHT_CM, MAX_WEIGHT_KG};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biological sex as used by the WHO reference tables
///
/// Serialized with the single-letter codes used by the growth record service:
/// `L` (laki-laki) and `P` (perempuan).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sex {
    /// Boy
    #[serde(rename = "L", alias = "male")]
    Male,
    /// Girl
    #[serde(rename = "P", alias = "female")]
    Female,
}

impl Sex {
    /// Wire code for this sex
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Male => "L",
            Self::Female => "P",
        }
    }

    /// Parse from a wire code
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for anything other than `L`/`P` (case-insensitive)
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_uppercase().as_str() {
            "L" | "MALE" => Ok(Self::Male),
            "P" | "FEMALE" => Ok(Self::Female),
            other => Err(AppError::invalid_input(format!(
                "Unknown sex code '{other}', expected 'L' or 'P'"
            ))),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whole calendar months elapsed between birth and measurement
///
/// A month only counts once the day-of-month has been reached, so a child
/// born on the 20th is still 0 months old on the 19th of the next month.
///
/// # Errors
///
/// Returns `InvalidInput` when the measurement predates the birth date
pub fn age_in_months(birth_date: NaiveDate, measured_on: NaiveDate) -> AppResult<u32> {
    if measured_on < birth_date {
        return Err(AppError::invalid_input(format!(
            "Measurement date {measured_on} is before birth date {birth_date}"
        )));
    }

    let years = i64::from(measured_on.year()) - i64::from(birth_date.year());
    let mut months =
        years * 12 + i64::from(measured_on.month()) - i64::from(birth_date.month());
    if measured_on.day() < birth_date.day() {
        months -= 1;
    }

    u32::try_from(months)
        .map_err(|_| AppError::value_out_of_range(format!("Age of {months} months is invalid")))
}

/// Raw measurement as supplied by the growth record service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGrowthMeasurement {
    /// Measured child
    pub child_id: ChildId,
    /// Child's date of birth
    pub birth_date: NaiveDate,
    /// Date of the measurement
    pub measured_on: NaiveDate,
    /// Sex used for reference lookup
    pub sex: Sex,
    /// Body weight (kg)
    pub weight_kg: f64,
    /// Height or recumbent length (cm)
    pub height_cm: f64,
    /// Head circumference (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference_cm: Option<f64>,
    /// Mid-upper-arm circumference (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muac_cm: Option<f64>,
}

/// Immutable record of one measurement event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthMeasurement {
    /// Measurement id
    pub id: MeasurementId,
    /// Measured child
    pub child_id: ChildId,
    /// Date of the measurement
    pub measured_on: NaiveDate,
    /// Derived age in whole months
    pub age_months: u32,
    /// Sex used for reference lookup
    pub sex: Sex,
    /// Body weight (kg)
    pub weight_kg: f64,
    /// Height or recumbent length (cm)
    pub height_cm: f64,
    /// Head circumference (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_circumference_cm: Option<f64>,
    /// Mid-upper-arm circumference (cm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muac_cm: Option<f64>,
    /// When the record was created
    pub recorded_at: DateTime<Utc>,
}

impl GrowthMeasurement {
    /// Validate raw input and derive the age in months
    ///
    /// # Errors
    ///
    /// Returns a validation error if the measurement predates birth or any
    /// value is non-finite, non-positive, or implausibly large
    pub fn new(input: NewGrowthMeasurement) -> AppResult<Self> {
        let age_months = age_in_months(input.birth_date, input.measured_on)?;

        validate_positive("weight_kg", input.weight_kg, MAX_WEIGHT_KG)?;
        validate_positive("height_cm", input.height_cm, MAX_HEIGHT_CM)?;
        if let Some(head) = input.head_circumference_cm {
            validate_positive("head_circumference_cm", head, MAX_CIRCUMFERENCE_CM)?;
        }
        if let Some(muac) = input.muac_cm {
            validate_positive("muac_cm", muac, MAX_CIRCUMFERENCE_CM)?;
        }

        Ok(Self {
            id: MeasurementId::new(),
            child_id: input.child_id,
            measured_on: input.measured_on,
            age_months,
            sex: input.sex,
            weight_kg: input.weight_kg,
            height_cm: input.height_cm,
            head_circumference_cm: input.head_circumference_cm,
            muac_cm: input.muac_cm,
            recorded_at: Utc::now(),
        })
    }
}

fn validate_positive(field: &str, value: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::invalid_input(format!(
            "{field} must be a positive number, got {value}"
        )));
    }
    if value > max {
        return Err(AppError::value_out_of_range(format!(
            "{field} must not exceed {max}, got {value}"
        )));
    }
    Ok(())
}
