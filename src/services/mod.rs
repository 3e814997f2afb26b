// ABOUTME: Domain service layer over the repositories and the growth intelligence engine
// ABOUTME: Plan storage, consumption toggles, and growth record intake
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services hold an `Arc<dyn …Repository>` and are cheap to clone, so one
//! instance can be shared by every request handler.

/// Meal consumption toggles with optimistic retries
pub mod consumption;

/// Growth measurement intake and diagnosis history
pub mod growth;

/// Weekly nutrition plan storage and completion
pub mod plan_store;

pub use consumption::{ConsumptionTracker, ToggleOutcome};
pub use growth::{GrowthRecord, GrowthRecordService};
pub use plan_store::NutritionPlanStore;
