// ABOUTME: Weekly nutrition plan aggregate with daily recommendations and meal items
// ABOUTME: Progress and status fields are caches of what the meal flags imply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::ids::{ChildId, DailyRecommendationId, MealItemId, PlanId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Completion state of one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// No meal consumed yet
    #[default]
    BelumDimulai,
    /// Some meals consumed
    SedangBerjalan,
    /// Every meal consumed
    Selesai,
}

impl DayStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BelumDimulai => "belum_dimulai",
            Self::SedangBerjalan => "sedang_berjalan",
            Self::Selesai => "selesai",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "sedang_berjalan" => Self::SedangBerjalan,
            "selesai" => Self::Selesai,
            // Stored values are caches; anything unrecognized is recomputed anyway
            _ => Self::BelumDimulai,
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    /// Breakfast
    #[serde(alias = "pagi")]
    Morning,
    /// Mid-morning snack
    #[serde(alias = "selingan_pagi")]
    MorningSnack,
    /// Lunch
    #[serde(alias = "siang")]
    Noon,
    /// Afternoon snack
    #[serde(alias = "selingan_sore")]
    AfternoonSnack,
    /// Dinner
    #[serde(alias = "malam")]
    Night,
    /// Unspecified slot
    Other,
}

impl MealSlot {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::MorningSnack => "morning_snack",
            Self::Noon => "noon",
            Self::AfternoonSnack => "afternoon_snack",
            Self::Night => "night",
            Self::Other => "other",
        }
    }

    /// Parse meal slot from string, accepting Indonesian slot names
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "morning" | "pagi" => Self::Morning,
            "morning_snack" | "selingan_pagi" => Self::MorningSnack,
            "noon" | "siang" => Self::Noon,
            "afternoon_snack" | "selingan_sore" => Self::AfternoonSnack,
            "night" | "malam" => Self::Night,
            _ => Self::Other,
        }
    }
}

/// Nutrition facts for one meal item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NutritionFacts {
    /// Energy (kcal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_kcal: Option<f64>,
    /// Protein (g)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    /// Fat (g)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    /// Carbohydrates (g)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    /// Micronutrients by name (e.g. `iron_mg`, `zinc_mg`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub micronutrients: BTreeMap<String, f64>,
}

/// Recipe content attached to a meal item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Ingredient lines
    pub ingredients: Vec<String>,
    /// Preparation steps
    pub steps: Vec<String>,
}

/// One scheduled food entry
///
/// Only `consumed` changes after generation; everything else is read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealItem {
    /// Meal item id
    pub id: MealItemId,
    /// Ordinal position within the day
    pub position: u32,
    /// Meal slot
    pub slot: MealSlot,
    /// Dish name
    pub name: String,
    /// Portion description (e.g. "1 mangkuk kecil")
    pub portion: String,
    /// Target energy (kcal)
    pub target_calories: f64,
    /// Whether the child ate this item
    #[serde(default)]
    pub consumed: bool,
    /// Nutrition facts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionFacts>,
    /// Recipe content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

/// One day of a weekly plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRecommendation {
    /// Day id
    pub id: DailyRecommendationId,
    /// Owning plan
    pub plan_id: PlanId,
    /// Day index within the plan (1-7)
    pub day_index: u8,
    /// Calendar date
    pub date: NaiveDate,
    /// Cached status, recomputed on every write
    #[serde(default)]
    pub status: DayStatus,
    /// Cached progress percentage (0-100), recomputed on every write
    #[serde(default)]
    pub progress_percentage: u8,
    /// Optimistic concurrency version
    #[serde(default)]
    pub version: u64,
    /// Meal items in position order
    pub meals: Vec<MealItem>,
}

impl DailyRecommendation {
    /// Find a meal item by id for mutation
    pub fn meal_mut(&mut self, meal_id: MealItemId) -> Option<&mut MealItem> {
        self.meals.iter_mut().find(|m| m.id == meal_id)
    }

    /// Number of consumed items
    #[must_use]
    pub fn consumed_count(&self) -> usize {
        self.meals.iter().filter(|m| m.consumed).count()
    }

    /// Sum of target calories over consumed items
    #[must_use]
    pub fn consumed_calories(&self) -> f64 {
        self.meals
            .iter()
            .filter(|m| m.consumed)
            .map(|m| m.target_calories)
            .sum()
    }
}

/// Daily caloric and macronutrient targets
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyTargets {
    /// Energy (kcal)
    pub calories_kcal: f64,
    /// Protein (g)
    pub protein_g: f64,
    /// Fat (g)
    pub fat_g: f64,
    /// Carbohydrates (g)
    pub carbs_g: f64,
}

/// Weekly nutrition plan aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionPlan {
    /// Plan id
    pub id: PlanId,
    /// Owning child
    pub child_id: ChildId,
    /// Week number in the child's programme
    pub week_index: u32,
    /// First day of the plan
    pub start_date: NaiveDate,
    /// Last day of the plan
    pub end_date: NaiveDate,
    /// Whether the plan has been completed
    #[serde(default)]
    pub completed: bool,
    /// When the plan was completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Daily targets
    pub targets: DailyTargets,
    /// Exactly seven days, ordered by index
    pub days: Vec<DailyRecommendation>,
    /// When the plan was generated
    pub created_at: DateTime<Utc>,
}

impl NutritionPlan {
    /// A plan is active until it is completed
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.completed
    }

    /// Find a day by id
    #[must_use]
    pub fn day(&self, day_id: DailyRecommendationId) -> Option<&DailyRecommendation> {
        self.days.iter().find(|d| d.id == day_id)
    }

    /// Find a day by id for mutation
    pub fn day_mut(&mut self, day_id: DailyRecommendationId) -> Option<&mut DailyRecommendation> {
        self.days.iter_mut().find(|d| d.id == day_id)
    }
}
