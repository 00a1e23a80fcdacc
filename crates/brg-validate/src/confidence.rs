//! Confidence metrics and operator recommendations.

use brg_schemas::CorrectionStatistics;
use serde::{Deserialize, Serialize};

/// Ceiling on the overall score.
pub const MAX_CONFIDENCE: f64 = 95.0;

/// All values are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceMetrics {
    pub hardware_verification_rate: f64,
    pub bit_analysis_completion_rate: f64,
    pub clock_gating_detection_rate: f64,
    pub duplicate_removal_efficiency: f64,
    pub overall_confidence: f64,
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round2(part as f64 / whole as f64 * 100.0)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl ConfidenceMetrics {
    /// `overall = min(95, hardware_verified_ratio * 80 + 20)`.
    pub fn from_statistics(stats: &CorrectionStatistics) -> Self {
        let total = stats.total_entries;
        let ratio = if total == 0 {
            0.0
        } else {
            stats.hardware_verified as f64 / total as f64
        };
        let duplicate_removal_efficiency = if stats.duplicates_removed == 0 {
            100.0
        } else {
            pct(stats.duplicates_removed, total + stats.duplicates_removed)
        };

        ConfidenceMetrics {
            hardware_verification_rate: pct(stats.hardware_verified, total),
            bit_analysis_completion_rate: pct(stats.bit_changes_populated, total),
            clock_gating_detection_rate: pct(stats.clock_gated_registers, total),
            duplicate_removal_efficiency,
            overall_confidence: round2((ratio * 80.0 + 20.0).min(MAX_CONFIDENCE)),
        }
    }
}

/// Thresholds for the recommendation list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationPolicy {
    /// Recommend more capture coverage below this verified ratio.
    pub min_hardware_ratio: f64,
    /// Recommend reviewing duplicate detection above this ratio.
    pub max_duplicate_ratio: f64,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        RecommendationPolicy {
            min_hardware_ratio: 0.5,
            max_duplicate_ratio: 0.1,
        }
    }
}

pub const REC_HARDWARE_COVERAGE: &str =
    "Capture more registers on hardware to raise the verified share of the sequence";
pub const REC_ENABLE_CLOCKS: &str =
    "Enable clocks for gated peripherals to improve register accessibility";
pub const REC_REVIEW_ISSUES: &str =
    "Review validation issues for potential firmware or analysis improvements";
pub const REC_REVIEW_DUPLICATES: &str =
    "Review static analysis output for duplicate access reports";

pub fn recommendations(
    stats: &CorrectionStatistics,
    issue_count: usize,
    policy: &RecommendationPolicy,
) -> Vec<String> {
    let total = stats.total_entries as f64;
    let mut out = Vec::new();
    if (stats.hardware_verified as f64) < total * policy.min_hardware_ratio {
        out.push(REC_HARDWARE_COVERAGE.to_string());
    }
    if stats.clock_gated_registers > 0 {
        out.push(REC_ENABLE_CLOCKS.to_string());
    }
    if issue_count > 0 {
        out.push(REC_REVIEW_ISSUES.to_string());
    }
    if (stats.duplicates_removed as f64) > total * policy.max_duplicate_ratio {
        out.push(REC_REVIEW_DUPLICATES.to_string());
    }
    out
}
