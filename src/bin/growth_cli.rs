// ABOUTME: Growth CLI - classify one measurement or summarize a weekly plan file
// ABOUTME: Runs the growth intelligence engine and plan validation without a database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Diagnose a 24 month old boy against a WHO reference dataset
//! growth-cli classify --age 24 --sex L --weight 9 --height 80 --reference who.json
//!
//! # Validate a generated plan and print its weekly progress
//! growth-cli summary --plan plan.json
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use growth_intelligence::{DiagnosisEngine, GrowthClassifier};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stunting_monitor::config::{PlanStoreConfig, ServerConfig};
use stunting_monitor::constants::service_names;
use stunting_monitor::database::repositories::InMemoryPlanRepository;
use stunting_monitor::logging::LoggingConfig;
use stunting_monitor::models::{
    ChildId, Diagnosis, GrowthMeasurement, MeasurementId, NutritionPlan, Sex,
};
use stunting_monitor::services::NutritionPlanStore;
use tokio::fs;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "growth-cli",
    about = "Child growth monitoring CLI",
    long_about = "Classify anthropometric measurements against WHO reference tables and summarize weekly nutrition plans."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Diagnose a single measurement and print the diagnosis as JSON
    Classify {
        /// Age in whole months
        #[arg(long)]
        age: u32,

        /// Sex code: L (boy) or P (girl)
        #[arg(long)]
        sex: String,

        /// Weight in kg
        #[arg(long)]
        weight: f64,

        /// Height or length in cm
        #[arg(long)]
        height: f64,

        /// Mid-upper-arm circumference in cm
        #[arg(long)]
        muac: Option<f64>,

        /// WHO reference dataset (defaults to `GROWTH_REFERENCE_PATH`)
        #[arg(long)]
        reference: Option<PathBuf>,
    },

    /// Validate a plan JSON file and print its progress summary
    Summary {
        /// Plan JSON file
        #[arg(long)]
        plan: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    LoggingConfig::for_cli(cli.verbose).init()?;
    info!("{} starting", service_names::GROWTH_CLI);

    match cli.command {
        Command::Classify {
            age,
            sex,
            weight,
            height,
            muac,
            reference,
        } => classify(age, &sex, weight, height, muac, reference)?,
        Command::Summary { plan } => summarize(&plan).await?,
    }

    Ok(())
}

/// Diagnosis plus the recommendations a reader sees first
#[derive(Serialize)]
struct ClassifyReport<'a> {
    diagnosis: &'a Diagnosis,
    highlights: &'a [String],
}

fn classify(
    age: u32,
    sex: &str,
    weight: f64,
    height: f64,
    muac: Option<f64>,
    reference: Option<PathBuf>,
) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if reference.is_some() {
        config.reference_path = reference;
    }
    let tables = config.load_reference_tables()?;

    let now = Utc::now();
    let measurement = GrowthMeasurement {
        id: MeasurementId::new(),
        child_id: ChildId::new(),
        measured_on: now.date_naive(),
        age_months: age,
        sex: Sex::parse(sex)?,
        weight_kg: weight,
        height_cm: height,
        head_circumference_cm: None,
        muac_cm: muac,
        recorded_at: now,
    };

    let classifier = GrowthClassifier::new(tables);
    let classification = classifier.classify_measurement(&measurement)?;
    let engine = DiagnosisEngine::new();
    let diagnosis = engine.diagnose(&measurement, classification);
    let report = ClassifyReport {
        diagnosis: &diagnosis,
        highlights: engine.display_recommendations(&diagnosis),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn summarize(path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let plan: NutritionPlan = serde_json::from_str(&json)
        .with_context(|| format!("Invalid plan JSON in {}", path.display()))?;

    let store = NutritionPlanStore::new(
        Arc::new(InMemoryPlanRepository::new()),
        PlanStoreConfig::default(),
    );
    let stored = store.store_plan(plan).await?;
    let summary = store.plan_summary(stored.id).await?;

    info!(plan_id = %summary.plan_id, "{}", summary.label());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
