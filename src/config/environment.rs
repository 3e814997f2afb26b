// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses database location, reference dataset path, and tracker/store behaviour
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Environment-based configuration management

use crate::constants::{defaults, env_vars};
use anyhow::{Context, Result};
use growth_intelligence::ReferenceTables;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Type-safe database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Consumption tracker settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumptionConfig {
    /// Attempts per toggle when the day version is contended
    pub toggle_retries: u32,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self {
            toggle_retries: defaults::CONSUMPTION_TOGGLE_RETRIES,
        }
    }
}

/// Nutrition plan store settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanStoreConfig {
    /// Refuse `mark_completed` until every day is finished
    pub require_full_progress: bool,
}

impl Default for PlanStoreConfig {
    fn default() -> Self {
        Self {
            require_full_progress: defaults::PLAN_REQUIRE_FULL_PROGRESS,
        }
    }
}

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Database configuration
    pub database: DatabaseUrl,
    /// WHO reference dataset; classification runs with empty tables when unset
    pub reference_path: Option<PathBuf>,
    /// Consumption tracker settings
    pub consumption: ConsumptionConfig,
    /// Plan store settings
    pub plans: PlanStoreConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            database: DatabaseUrl::parse_url(&env_var_or(
                env_vars::DATABASE_URL,
                defaults::DATABASE_URL,
            )),
            reference_path: env::var(env_vars::GROWTH_REFERENCE_PATH)
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            consumption: ConsumptionConfig {
                toggle_retries: env_var_or(
                    env_vars::CONSUMPTION_TOGGLE_RETRIES,
                    &defaults::CONSUMPTION_TOGGLE_RETRIES.to_string(),
                )
                .parse()
                .context("Invalid CONSUMPTION_TOGGLE_RETRIES value")?,
            },
            plans: PlanStoreConfig {
                require_full_progress: parse_bool(&env_var_or(
                    env_vars::PLAN_REQUIRE_FULL_PROGRESS,
                    &defaults::PLAN_REQUIRE_FULL_PROGRESS.to_string(),
                ))
                .context("Invalid PLAN_REQUIRE_FULL_PROGRESS value")?,
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the retry count is zero
    pub fn validate(&self) -> Result<()> {
        if self.consumption.toggle_retries == 0 {
            return Err(anyhow::anyhow!(
                "CONSUMPTION_TOGGLE_RETRIES must be at least 1"
            ));
        }
        Ok(())
    }

    /// Load the configured WHO reference tables, shared read-only
    ///
    /// Without a configured dataset the tables are empty and every z-score
    /// is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be read or is malformed
    pub fn load_reference_tables(&self) -> Result<Arc<ReferenceTables>> {
        let tables = match &self.reference_path {
            Some(path) => ReferenceTables::from_path(path).with_context(|| {
                format!("Failed to load reference tables from {}", path.display())
            })?,
            None => {
                warn!("No reference dataset configured; every z-score will be unknown");
                ReferenceTables::new()
            }
        };
        Ok(Arc::new(tables))
    }

    /// Get a summary of the configuration for logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Stunting Monitor Configuration:\n\
             - Database: {}\n\
             - Reference dataset: {}\n\
             - Toggle retries: {}\n\
             - Require full progress: {}",
            self.database,
            self.reference_path
                .as_ref()
                .map_or_else(|| "(none)".to_owned(), |p| p.display().to_string()),
            self.consumption.toggle_retries,
            self.plans.require_full_progress,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(anyhow::anyhow!("expected a boolean, got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        let file = DatabaseUrl::parse_url("sqlite:./test.db");
        assert!(!file.is_memory());
        assert_eq!(file.to_connection_string(), "sqlite:./test.db");

        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        assert_eq!(
            DatabaseUrl::default().to_connection_string(),
            "sqlite:./data/growth.db"
        );
    }

    #[test]
    fn test_bool_parsing() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = ServerConfig {
            consumption: ConsumptionConfig { toggle_retries: 0 },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
