// ABOUTME: RAII transaction guard for multi-statement SQLite writes
// ABOUTME: Rolls back automatically when dropped without an explicit commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction guard.
//!
//! ```text
//! let mut guard = TransactionGuard::begin(&pool).await?;
//! sqlx::query("INSERT INTO ...").execute(guard.executor()?).await?;
//! guard.commit().await?;
//! ```
//!
//! Returning early with `?` before `commit()` drops the guard and the
//! transaction is rolled back.

use crate::errors::{AppError, AppResult, DatabaseResultExt};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, warn};

/// RAII guard for a `SQLite` transaction
pub struct TransactionGuard<'c> {
    transaction: Option<Transaction<'c, Sqlite>>,
    committed: bool,
}

impl TransactionGuard<'static> {
    /// Begin a transaction on the pool
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired
    pub async fn begin(pool: &SqlitePool) -> AppResult<Self> {
        let transaction = pool.begin().await.db_context("Failed to begin transaction")?;
        Ok(Self::new(transaction))
    }
}

impl<'c> TransactionGuard<'c> {
    /// Wrap an existing transaction
    #[must_use]
    pub const fn new(transaction: Transaction<'c, Sqlite>) -> Self {
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails or the guard was already consumed
    pub async fn commit(mut self) -> AppResult<()> {
        match self.transaction.take() {
            Some(tx) => {
                tx.commit().await.db_context("Transaction commit failed")?;
                self.committed = true;
                debug!("Transaction committed");
                Ok(())
            }
            None => Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            )),
        }
    }

    /// Connection to execute statements on
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit")
        })
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("Transaction dropped without commit - rolling back");
        }
    }
}
