// ABOUTME: Unified error handling re-exported from growth-core plus storage error mapping
// ABOUTME: Converts sqlx failures into AppError with the driver error chained as source
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Unified Error Handling System
//!
//! The error types live in `growth_core::errors` so the intelligence crate
//! can share them. This module re-exports them and adds the mapping from
//! `sqlx` errors, which only the persistence layer depends on.

pub use growth_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
};

/// Attach context to a `sqlx` result
pub trait DatabaseResultExt<T> {
    /// Map a driver error to `ErrorCode::DatabaseError`, or
    /// `ErrorCode::ResourceAlreadyExists` for unique-constraint violations
    ///
    /// # Errors
    ///
    /// Returns the mapped error when `self` is `Err`
    fn db_context(self, context: &str) -> AppResult<T>;
}

impl<T> DatabaseResultExt<T> for Result<T, sqlx::Error> {
    fn db_context(self, context: &str) -> AppResult<T> {
        self.map_err(|e| map_sqlx_error(context, e))
    }
}

/// Convert a driver error into an `AppError`
#[must_use]
pub fn map_sqlx_error(context: &str, error: sqlx::Error) -> AppError {
    let unique_violation = matches!(
        &error,
        sqlx::Error::Database(db) if db.is_unique_violation()
    );
    if unique_violation {
        AppError::already_exists(format!("{context}: {error}")).with_source(error)
    } else {
        AppError::database(format!("{context}: {error}")).with_source(error)
    }
}
