// ABOUTME: Main library entry point for the stunting monitor backend core
// ABOUTME: Growth record intake, weekly nutrition plan storage, and consumption tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Stunting Monitor
//!
//! Backend core for child growth monitoring. A growth measurement is
//! classified against WHO reference tables, diagnosed, and appended to the
//! child's history. Independently, an externally generated weekly nutrition
//! plan is stored and its meal items are toggled as consumed, with day and
//! week progress always recomputed from the item flags.
//!
//! ## Architecture
//!
//! - **`growth_core`**: domain models and the error taxonomy
//! - **`growth_intelligence`**: pure classification, diagnosis, and progress
//! - **database**: `SQLite` storage behind repository traits
//! - **services**: `NutritionPlanStore`, `ConsumptionTracker`, `GrowthRecordService`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use stunting_monitor::config::ServerConfig;
//! use stunting_monitor::database::Database;
//! use stunting_monitor::database::repositories::SqlitePlanRepository;
//! use stunting_monitor::models::ChildId;
//! use stunting_monitor::services::NutritionPlanStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let db = Database::new(&config.database).await?;
//!     let store = NutritionPlanStore::new(Arc::new(SqlitePlanRepository::new(&db)), config.plans);
//!     if let Some(plan) = store.get_active_plan(ChildId::new()).await? {
//!         println!("{}", store.plan_summary(plan.id).await?.label());
//!     }
//!     Ok(())
//! }
//! ```

/// Configuration management
pub mod config;

/// Application constants and environment variable names
pub mod constants;

/// `SQLite` storage and repository implementations
pub mod database;

/// Unified error handling with storage error mapping
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Plan store, consumption tracker, and growth record services
pub mod services;

pub use growth_core::models;
