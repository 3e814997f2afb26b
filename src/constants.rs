// ABOUTME: Service-wide constants and environment defaults for the growth monitoring backend
// ABOUTME: Names, default paths, and retry limits shared by config, logging, and services
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Constants Module
//!
//! Hardcoded defaults. Anything here can be overridden through the
//! environment variables read by [`crate::config::environment::ServerConfig`].

/// Service identity used in structured logs
pub mod service_names {
    /// Main service name
    pub const STUNTING_MONITOR: &str = "stunting-monitor";
    /// Command-line tool
    pub const GROWTH_CLI: &str = "growth-cli";
}

/// Environment variable defaults
pub mod defaults {
    /// Default `SQLite` database location
    pub const DATABASE_URL: &str = "sqlite:./data/growth.db";
    /// Default number of attempts for a consumption toggle under contention
    pub const CONSUMPTION_TOGGLE_RETRIES: u32 = 3;
    /// Completion does not require every meal to be eaten unless configured
    pub const PLAN_REQUIRE_FULL_PROGRESS: bool = false;
}

/// Environment variable names
pub mod env_vars {
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Path to the WHO reference JSON dataset
    pub const GROWTH_REFERENCE_PATH: &str = "GROWTH_REFERENCE_PATH";
    /// Attempts for a consumption toggle before a conflict is surfaced
    pub const CONSUMPTION_TOGGLE_RETRIES: &str = "CONSUMPTION_TOGGLE_RETRIES";
    /// Whether `mark_completed` requires a fully consumed plan
    pub const PLAN_REQUIRE_FULL_PROGRESS: &str = "PLAN_REQUIRE_FULL_PROGRESS";
}
