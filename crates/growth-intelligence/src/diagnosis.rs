// ABOUTME: Derives stunting status, severity, and recommendations from classifier output
// ABOUTME: Recommendations come from an ordered list of independent predicate/message rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Diagnosis engine.
//!
//! Status precedence (first match wins) on the height-for-age z-score:
//!
//! | z-score                | status             |
//! |------------------------|--------------------|
//! | z <= -3                | `severely_stunted` |
//! | -3 < z < -2            | `stunting`         |
//! | -2 <= z <= -1          | `berisiko`         |
//! | otherwise              | `normal`           |
//!
//! Every rule in [`RULES`] is evaluated independently. All matching messages
//! are returned in declaration order; the engine only truncates when a
//! `recommendation_limit` is configured.

use crate::classifier::GrowthClassification;
use crate::config::{ClassificationConfig, DiagnosisConfig, GrowthIntelligenceConfig};
use chrono::Utc;
use growth_core::models::{
    Diagnosis, DiagnosisId, GrowthCategory, GrowthMeasurement, Indicator, StuntingStatus,
};
use tracing::debug;

/// Facts a recommendation rule can inspect
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Derived status, `None` when height-for-age is not computable
    pub status: Option<StuntingStatus>,
    /// Per-indicator results
    pub classification: &'a GrowthClassification,
}

impl RuleContext<'_> {
    /// Category for an indicator (`Unknown` when not computable)
    #[must_use]
    pub const fn category(&self, indicator: Indicator) -> GrowthCategory {
        self.classification.result(indicator).category
    }

    fn any_of(&self, indicator: Indicator, categories: &[GrowthCategory]) -> bool {
        categories.contains(&self.category(indicator))
    }
}

/// One (predicate, message) recommendation rule
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    /// Stable rule identifier
    pub id: &'static str,
    /// Recommendation text shown to caregivers
    pub message: &'static str,
    predicate: fn(&RuleContext<'_>) -> bool,
}

impl RecommendationRule {
    /// Whether this rule fires for the given context
    #[must_use]
    pub fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        (self.predicate)(ctx)
    }
}

const CONCERN_CATEGORIES: [GrowthCategory; 10] = [
    GrowthCategory::VeryShort,
    GrowthCategory::Short,
    GrowthCategory::SeverelyUnderweight,
    GrowthCategory::Underweight,
    GrowthCategory::Overweight,
    GrowthCategory::Obese,
    GrowthCategory::SeverelyWasted,
    GrowthCategory::Wasted,
    GrowthCategory::SeverelyLow,
    GrowthCategory::Low,
];

/// Recommendation rules in evaluation order
pub const RULES: &[RecommendationRule] = &[
    RecommendationRule {
        id: "severe_stunting_referral",
        message: "Segera rujuk anak ke puskesmas atau dokter spesialis anak untuk penanganan stunting berat.",
        predicate: |ctx| ctx.status == Some(StuntingStatus::SeverelyStunted),
    },
    RecommendationRule {
        id: "stunting_monitoring",
        message: "Lakukan pemantauan pertumbuhan setiap bulan dan konsultasikan pola makan dengan tenaga kesehatan.",
        predicate: |ctx| ctx.status == Some(StuntingStatus::Stunting),
    },
    RecommendationRule {
        id: "at_risk_monitoring",
        message: "Anak berisiko stunting, pantau tinggi badan secara rutin dan perbaiki asupan gizi harian.",
        predicate: |ctx| ctx.status == Some(StuntingStatus::Berisiko),
    },
    RecommendationRule {
        id: "underweight_protein",
        message: "Tingkatkan asupan protein hewani seperti telur, ikan, ayam, dan daging setiap hari.",
        predicate: |ctx| {
            ctx.any_of(
                Indicator::WeightForAge,
                &[
                    GrowthCategory::Underweight,
                    GrowthCategory::SeverelyUnderweight,
                ],
            )
        },
    },
    RecommendationRule {
        id: "short_stature_stimulation",
        message: "Berikan stimulasi tumbuh kembang dan pastikan anak tidur cukup 11-14 jam per hari.",
        predicate: |ctx| {
            ctx.any_of(
                Indicator::HeightForAge,
                &[GrowthCategory::Short, GrowthCategory::VeryShort],
            ) && ctx.category(Indicator::WeightForAge) == GrowthCategory::Normal
        },
    },
    RecommendationRule {
        id: "wasting_energy_dense",
        message: "Berikan makanan padat energi dan porsi kecil namun sering untuk mengejar berat badan ideal.",
        predicate: |ctx| {
            ctx.any_of(
                Indicator::WeightForHeight,
                &[GrowthCategory::Wasted, GrowthCategory::SeverelyWasted],
            )
        },
    },
    RecommendationRule {
        id: "overweight_limit_sugar_fat",
        message: "Batasi makanan tinggi gula dan lemak serta ajak anak lebih aktif bergerak.",
        predicate: |ctx| {
            let over = [GrowthCategory::Overweight, GrowthCategory::Obese];
            ctx.any_of(Indicator::WeightForAge, &over)
                || ctx.any_of(Indicator::WeightForHeight, &over)
        },
    },
    RecommendationRule {
        id: "low_muac_check",
        message: "Lingkar lengan atas rendah, periksakan anak untuk kemungkinan gizi buruk akut.",
        predicate: |ctx| {
            ctx.any_of(
                Indicator::MuacForAge,
                &[GrowthCategory::Low, GrowthCategory::SeverelyLow],
            )
        },
    },
    RecommendationRule {
        id: "maintain_balanced_diet",
        message: "Pertumbuhan anak baik, pertahankan pola makan gizi seimbang dan pemantauan rutin.",
        predicate: |ctx| {
            ctx.status == Some(StuntingStatus::Normal)
                && Indicator::ALL
                    .into_iter()
                    .all(|i| !CONCERN_CATEGORIES.contains(&ctx.category(i)))
        },
    },
];

/// Stunting status for a height-for-age z-score
#[must_use]
pub fn derive_status(z: f64, thresholds: &ClassificationConfig) -> StuntingStatus {
    if z <= thresholds.severe_threshold {
        StuntingStatus::SeverelyStunted
    } else if z < thresholds.moderate_threshold {
        StuntingStatus::Stunting
    } else if z <= thresholds.at_risk_threshold {
        StuntingStatus::Berisiko
    } else {
        StuntingStatus::Normal
    }
}

/// Messages of every matching rule, in declaration order
#[must_use]
pub fn collect_recommendations(ctx: &RuleContext<'_>) -> Vec<String> {
    RULES
        .iter()
        .filter(|rule| rule.matches(ctx))
        .map(|rule| rule.message.to_owned())
        .collect()
}

/// Stateless diagnosis engine
#[derive(Debug, Clone, Default)]
pub struct DiagnosisEngine {
    config: DiagnosisConfig,
    thresholds: ClassificationConfig,
}

impl DiagnosisEngine {
    /// Create an engine using the global configuration
    #[must_use]
    pub fn new() -> Self {
        let global = GrowthIntelligenceConfig::global();
        Self::with_config(global.diagnosis.clone(), global.classification.clone())
    }

    /// Create an engine with explicit settings
    #[must_use]
    pub const fn with_config(config: DiagnosisConfig, thresholds: ClassificationConfig) -> Self {
        Self { config, thresholds }
    }

    /// Diagnosis settings in use
    #[must_use]
    pub const fn config(&self) -> &DiagnosisConfig {
        &self.config
    }

    /// The leading recommendations a presentation layer should show
    #[must_use]
    pub fn display_recommendations<'a>(&self, diagnosis: &'a Diagnosis) -> &'a [String] {
        diagnosis.display_recommendations(self.config.display_limit)
    }

    /// Produce the diagnosis for one measurement
    #[must_use]
    pub fn diagnose(
        &self,
        measurement: &GrowthMeasurement,
        classification: GrowthClassification,
    ) -> Diagnosis {
        let status = classification
            .height_for_age
            .z_score
            .map(|z| derive_status(z, &self.thresholds));

        let ctx = RuleContext {
            status,
            classification: &classification,
        };
        let mut recommendations = collect_recommendations(&ctx);
        if let Some(limit) = self.config.recommendation_limit {
            recommendations.truncate(limit);
        }

        let mut notes: Vec<String> = classification
            .missing_indicators()
            .into_iter()
            .map(|indicator| {
                format!("Z-score {indicator} tidak dapat dihitung: data pengukuran atau referensi tidak tersedia")
            })
            .collect();
        if status.is_none() {
            notes.push(
                "Status stunting tidak dapat ditentukan tanpa z-score tinggi badan menurut umur"
                    .to_owned(),
            );
        }

        debug!(
            measurement_id = %measurement.id,
            child_id = %measurement.child_id,
            status = ?status,
            recommendations = recommendations.len(),
            "Diagnosis produced"
        );

        Diagnosis {
            id: DiagnosisId::new(),
            measurement_id: measurement.id,
            child_id: measurement.child_id,
            measured_on: measurement.measured_on,
            age_months: measurement.age_months,
            status,
            severity: status.map(|s| s.severity()),
            height_for_age: classification.height_for_age,
            weight_for_age: classification.weight_for_age,
            weight_for_height: classification.weight_for_height,
            muac_for_age: classification.muac_for_age,
            recommendations,
            notes,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::categorize;
    use chrono::NaiveDate;
    use growth_core::models::{ChildId, MeasurementId, Severity, Sex, ZScoreResult};

    fn result(indicator: Indicator, z: Option<f64>) -> ZScoreResult {
        let cfg = ClassificationConfig::default();
        ZScoreResult {
            indicator,
            z_score: z,
            reference: None,
            category: categorize(indicator, z, &cfg),
        }
    }

    fn classification(
        hfa: Option<f64>,
        wfa: Option<f64>,
        wfh: Option<f64>,
        muac: Option<f64>,
    ) -> GrowthClassification {
        GrowthClassification {
            height_for_age: result(Indicator::HeightForAge, hfa),
            weight_for_age: result(Indicator::WeightForAge, wfa),
            weight_for_height: result(Indicator::WeightForHeight, wfh),
            muac_for_age: result(Indicator::MuacForAge, muac),
        }
    }

    fn measurement() -> GrowthMeasurement {
        GrowthMeasurement {
            id: MeasurementId::new(),
            child_id: ChildId::new(),
            measured_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            age_months: 24,
            sex: Sex::Male,
            weight_kg: 9.0,
            height_cm: 80.0,
            head_circumference_cm: None,
            muac_cm: None,
            recorded_at: Utc::now(),
        }
    }

    fn engine() -> DiagnosisEngine {
        DiagnosisEngine::with_config(DiagnosisConfig::default(), ClassificationConfig::default())
    }

    #[test]
    fn test_status_boundaries() {
        let cfg = ClassificationConfig::default();
        assert_eq!(derive_status(-3.0, &cfg), StuntingStatus::SeverelyStunted);
        assert_eq!(derive_status(-2.5, &cfg), StuntingStatus::Stunting);
        assert_eq!(derive_status(-2.0, &cfg), StuntingStatus::Berisiko);
        assert_eq!(derive_status(-1.0, &cfg), StuntingStatus::Berisiko);
        assert_eq!(derive_status(-0.99, &cfg), StuntingStatus::Normal);
        assert_eq!(derive_status(2.5, &cfg), StuntingStatus::Normal);
    }

    #[test]
    fn test_severely_stunted_diagnosis() {
        let diagnosis = engine().diagnose(
            &measurement(),
            classification(Some(-3.5), Some(-1.0), Some(0.2), None),
        );
        assert_eq!(diagnosis.status, Some(StuntingStatus::SeverelyStunted));
        assert_eq!(diagnosis.severity, Some(Severity::Severe));
        assert_eq!(diagnosis.height_for_age.category, GrowthCategory::VeryShort);
        assert!(diagnosis.is_stunted());

        // Referral first, then stimulation for short stature with normal weight
        assert_eq!(diagnosis.recommendations.len(), 2);
        assert_eq!(diagnosis.recommendations[0], RULES[0].message);
        assert_eq!(diagnosis.recommendations[1], RULES[4].message);
        assert_eq!(diagnosis.notes.len(), 1);
    }

    #[test]
    fn test_multiple_rules_fire_in_declaration_order() {
        let diagnosis = engine().diagnose(
            &measurement(),
            classification(Some(-2.5), Some(-2.5), Some(-2.5), Some(-2.5)),
        );
        let fired: Vec<&str> = RULES
            .iter()
            .filter(|r| diagnosis.recommendations.iter().any(|m| m == r.message))
            .map(|r| r.id)
            .collect();
        assert_eq!(
            fired,
            vec![
                "stunting_monitoring",
                "underweight_protein",
                "wasting_energy_dense",
                "low_muac_check"
            ]
        );
        assert_eq!(diagnosis.recommendations.len(), 4);
        assert_eq!(diagnosis.display_recommendations(3).len(), 3);

        let narrow = DiagnosisEngine::with_config(
            DiagnosisConfig {
                recommendation_limit: None,
                display_limit: 2,
            },
            ClassificationConfig::default(),
        );
        let shown = narrow.display_recommendations(&diagnosis);
        assert_eq!(shown, &diagnosis.recommendations[..2]);
    }

    #[test]
    fn test_recommendation_limit_truncates() {
        let engine = DiagnosisEngine::with_config(
            DiagnosisConfig {
                recommendation_limit: Some(1),
                display_limit: 3,
            },
            ClassificationConfig::default(),
        );
        let diagnosis = engine.diagnose(
            &measurement(),
            classification(Some(-2.5), Some(-2.5), Some(-2.5), Some(-2.5)),
        );
        assert_eq!(diagnosis.recommendations, vec![RULES[1].message.to_owned()]);
    }

    #[test]
    fn test_missing_height_for_age_leaves_status_unset() {
        let diagnosis = engine().diagnose(
            &measurement(),
            classification(None, Some(-2.5), None, None),
        );
        assert!(diagnosis.status.is_none());
        assert!(diagnosis.severity.is_none());
        assert_eq!(diagnosis.recommendations, vec![RULES[3].message.to_owned()]);
        assert_eq!(diagnosis.notes.len(), 4);
        assert_eq!(diagnosis.height_for_age.formatted(), "-");
    }

    #[test]
    fn test_healthy_child_gets_maintenance_advice() {
        let diagnosis = engine().diagnose(
            &measurement(),
            classification(Some(0.3), Some(0.1), Some(-0.4), None),
        );
        assert_eq!(diagnosis.status, Some(StuntingStatus::Normal));
        assert_eq!(diagnosis.severity, Some(Severity::None));
        assert_eq!(diagnosis.recommendations, vec![RULES[8].message.to_owned()]);
    }
}
