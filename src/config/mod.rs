// ABOUTME: Configuration management module for centralized service settings
// ABOUTME: Environment-driven server config; intelligence thresholds live in growth-intelligence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! - **Environment**: database location, reference dataset, tracker and
//!   plan store behaviour
//! - **Intelligence**: re-exported from `growth_intelligence::config`

/// Environment and server configuration
pub mod environment;

pub use environment::{ConsumptionConfig, DatabaseUrl, PlanStoreConfig, ServerConfig};
pub use growth_intelligence::config::GrowthIntelligenceConfig;
