//! Decision Fuser
//!
//! Blends the leaf disease classifier confidence with the soil/environment
//! suitability score into a single crop health verdict.
//!
//! **Weighting:** 60% disease confidence + 40% suitability
//!
//! **Thresholds:**
//! - Healthy: ≥0.75
//! - At Risk: 0.50-0.75
//! - Critical: <0.50
//!
//! Inputs are expected in [0, 1] but are not clamped or rejected. Values
//! outside that range skew the score proportionally.

use serde::{Deserialize, Serialize};

/// Weight applied to the disease classifier confidence
pub const DISEASE_WEIGHT: f64 = 0.6;

/// Weight applied to the suitability score
pub const SUITABILITY_WEIGHT: f64 = 0.4;

/// Lowest score classified as Healthy
pub const HEALTHY_THRESHOLD: f64 = 0.75;

/// Lowest score classified as At Risk
pub const AT_RISK_THRESHOLD: f64 = 0.5;

/// Crop health verdict derived from the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// final_score >= 0.75
    #[serde(rename = "Healthy")]
    Healthy,
    /// 0.5 <= final_score < 0.75
    #[serde(rename = "At Risk")]
    AtRisk,
    /// final_score < 0.5
    #[serde(rename = "Critical")]
    Critical,
}

impl HealthStatus {
    /// Classify a blended score
    ///
    /// Lower bounds are inclusive. NaN compares false against both
    /// thresholds and lands in Critical.
    pub fn from_score(score: f64) -> Self {
        if score >= HEALTHY_THRESHOLD {
            HealthStatus::Healthy
        } else if score >= AT_RISK_THRESHOLD {
            HealthStatus::AtRisk
        } else {
            HealthStatus::Critical
        }
    }

    /// Display string for the verdict
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::AtRisk => "At Risk",
            HealthStatus::Critical => "Critical",
        }
    }

    /// Fixed advisory text paired with the verdict
    pub fn recommendation(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Crop conditions are stable. Maintain current practices.",
            HealthStatus::AtRisk => {
                "Monitor crop closely. Consider improving nutrition or disease control."
            }
            HealthStatus::Critical => {
                "Immediate intervention required. Improve soil conditions and treat disease."
            }
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fusion result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionResult {
    /// Blended score rounded to 2 decimal places
    pub final_score: f64,

    /// Verdict derived from the unrounded blended score
    pub status: HealthStatus,

    /// Advisory text for `status`
    pub recommendation: &'static str,
}

impl FusionResult {
    /// Final score with exactly two decimal places (e.g. "0.60")
    pub fn formatted_score(&self) -> String {
        format!("{:.2}", self.final_score)
    }
}

/// Combine classifier outputs into a crop health verdict
///
/// # Arguments
/// * `disease_confidence` - Top-class probability from the leaf image classifier
/// * `suitability_score` - Top-class probability from the soil/environment classifier
///
/// # Returns
/// Rounded blended score, verdict and recommendation. Never fails.
pub fn fuse_predictions(disease_confidence: f64, suitability_score: f64) -> FusionResult {
    let final_score =
        (DISEASE_WEIGHT * disease_confidence) + (SUITABILITY_WEIGHT * suitability_score);

    let status = HealthStatus::from_score(final_score);

    FusionResult {
        final_score: round_to_hundredths(final_score),
        status,
        recommendation: status.recommendation(),
    }
}

/// Round to 2 decimal places, exact binary ties go to the even hundredth
///
/// 0.125 → 0.12 and 0.375 → 0.38. Every other value rounds to nearest.
pub fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    if (scaled - scaled.trunc()).abs() == 0.5 {
        scaled.round_ties_even() / 100.0
    } else {
        scaled.round() / 100.0
    }
}
