// ABOUTME: Core types and constants for the child growth monitoring backend
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Growth Core
//!
//! Foundation crate shared by the classification engine and the
//! persistence layer. It changes rarely, which keeps incremental builds of
//! the rest of the workspace cheap.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **models**: Measurements, diagnoses, and weekly nutrition plans
//! - **constants**: Structural constants shared across crates

/// Unified error handling system with standard error codes
pub mod errors;

/// Domain models (measurements, z-scores, diagnoses, nutrition plans)
pub mod models;

/// Structural constants shared across crates
pub mod constants;
