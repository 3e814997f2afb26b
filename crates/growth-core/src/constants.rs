// ABOUTME: Structural constants for plans, measurements, and percentages
// ABOUTME: Shared between the intelligence crate and the persistence layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Weekly plan structure
pub mod plan {
    /// Number of daily recommendations owned by every plan
    pub const DAYS_PER_PLAN: usize = 7;

    /// First valid day index within a plan
    pub const FIRST_DAY_INDEX: u8 = 1;

    /// Last valid day index within a plan
    pub const LAST_DAY_INDEX: u8 = 7;

    /// Percentage reported for a fully consumed day or plan
    pub const COMPLETE_PERCENTAGE: u8 = 100;

    /// Ceiling for a day or plan with anything left unconsumed
    pub const ALMOST_COMPLETE_PERCENTAGE: u8 = 99;
}

/// Plausibility limits for raw anthropometric input
pub mod measurement {
    /// Upper bound for body weight (kg)
    pub const MAX_WEIGHT_KG: f64 = 150.0;

    /// Upper bound for height or length (cm)
    pub const MAX_HEIGHT_CM: f64 = 250.0;

    /// Upper bound for head and mid-upper-arm circumference (cm)
    pub const MAX_CIRCUMFERENCE_CM: f64 = 80.0;
}
