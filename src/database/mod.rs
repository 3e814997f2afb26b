// ABOUTME: SQLite database connection management and schema migrations
// ABOUTME: Owns the pool shared by the plan and growth record managers
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Database Management
//!
//! Tables:
//!
//! - `nutrition_plans`, `daily_recommendations`, `meal_items` hold the weekly
//!   plan aggregate. `daily_recommendations.version` backs optimistic
//!   concurrency for consumption toggles.
//! - `growth_measurements` and `diagnoses` are append-only per child.
//!
//! A partial unique index on `nutrition_plans(child_id) WHERE completed = 0`
//! keeps at most one active plan per child even under concurrent inserts.

/// Growth measurement and diagnosis persistence
pub mod growth;
/// Nutrition plan aggregate persistence
pub mod plans;
/// Repository traits with `SQLite` and in-memory implementations
pub mod repositories;
/// RAII transaction guard
pub mod transactions;

pub use growth::GrowthManager;
pub use plans::PlanManager;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult, DatabaseResultExt};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

const FILE_POOL_MAX_CONNECTIONS: u32 = 5;

/// Database manager for plan and growth record storage
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let connection_string = url.to_connection_string();
        if let DatabaseUrl::SQLite { path } = url {
            ensure_parent_dir(path).await?;
        }

        let options = SqliteConnectOptions::from_str(&connection_string)
            .db_context("Invalid database URL")?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection would see its own empty database
        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .db_context("Failed to connect to database")?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(db)
    }

    /// Connect using a raw connection string
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        Self::new(&DatabaseUrl::parse_url(database_url)).await
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Plan manager over this pool
    #[must_use]
    pub fn plans(&self) -> PlanManager {
        PlanManager::new(self.pool.clone())
    }

    /// Growth record manager over this pool
    #[must_use]
    pub fn growth(&self) -> GrowthManager {
        GrowthManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_plans().await?;
        self.migrate_growth().await?;
        Ok(())
    }

    async fn migrate_plans(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_plans (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                week_index INTEGER NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT false,
                completed_at TEXT,
                targets TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create nutrition_plans table")?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_nutrition_plans_active_child
            ON nutrition_plans(child_id) WHERE completed = 0
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create active plan index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_recommendations (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES nutrition_plans(id) ON DELETE CASCADE,
                day_index INTEGER NOT NULL CHECK (day_index BETWEEN 1 AND 7),
                date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'belum_dimulai',
                progress_percentage INTEGER NOT NULL DEFAULT 0,
                version INTEGER NOT NULL DEFAULT 0,
                UNIQUE (plan_id, day_index)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create daily_recommendations table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meal_items (
                id TEXT PRIMARY KEY,
                daily_recommendation_id TEXT NOT NULL
                    REFERENCES daily_recommendations(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                slot TEXT NOT NULL,
                name TEXT NOT NULL,
                portion TEXT NOT NULL,
                target_calories REAL NOT NULL,
                consumed BOOLEAN NOT NULL DEFAULT false,
                nutrition TEXT,
                recipe TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create meal_items table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_meal_items_day ON meal_items(daily_recommendation_id, position)",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create meal_items index")?;

        Ok(())
    }

    async fn migrate_growth(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS growth_measurements (
                id TEXT PRIMARY KEY,
                child_id TEXT NOT NULL,
                measured_on TEXT NOT NULL,
                age_months INTEGER NOT NULL,
                sex TEXT NOT NULL CHECK (sex IN ('L', 'P')),
                weight_kg REAL NOT NULL,
                height_cm REAL NOT NULL,
                head_circumference_cm REAL,
                muac_cm REAL,
                recorded_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create growth_measurements table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS diagnoses (
                id TEXT PRIMARY KEY,
                measurement_id TEXT NOT NULL UNIQUE
                    REFERENCES growth_measurements(id) ON DELETE CASCADE,
                child_id TEXT NOT NULL,
                measured_on TEXT NOT NULL,
                status TEXT,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create diagnoses table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_diagnoses_child ON diagnoses(child_id, measured_on)",
        )
        .execute(&self.pool)
        .await
        .db_context("Failed to create diagnoses index")?;

        Ok(())
    }
}

async fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(|e| {
            AppError::database(format!(
                "Failed to create database directory {}",
                parent.display()
            ))
            .with_source(e)
        })?;
    }
    Ok(())
}
