use std::collections::BTreeMap;

use brg_catalog::RegisterValueTable;
use brg_ingest::RejectedRecord;
use brg_schemas::{CanonicalAccessEntry, CorrectionStatistics};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::checks;
use crate::confidence::{recommendations, ConfidenceMetrics, RecommendationPolicy};
use crate::issues::{issue_summary, CheckKind, CheckResult, ValidationIssue};
use crate::mpu::{mpu_sequence_coverage, MpuSequenceCoverage};

#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub entries: &'a [CanonicalAccessEntry],
    pub statistics: &'a CorrectionStatistics,
    /// Address -> expected final value.
    pub expected_final_values: &'a RegisterValueTable,
    pub rejected: &'a [RejectedRecord],
    pub policy: RecommendationPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub total_entries_processed: usize,
    pub correction_statistics: CorrectionStatistics,
    pub checks: Vec<CheckResult>,
    pub validation_issues: Vec<ValidationIssue>,
    pub issue_summary: BTreeMap<String, usize>,
    pub confidence_metrics: ConfidenceMetrics,
    pub recommendations: Vec<String>,
    pub mpu_sequence: MpuSequenceCoverage,
    pub all_checks_passed: bool,
}

impl ValidationReport {
    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.check == kind)
    }

    pub fn issues_of(&self, kind: CheckKind) -> impl Iterator<Item = &ValidationIssue> + '_ {
        self.validation_issues
            .iter()
            .filter(move |i| i.check() == Some(kind))
    }
}

fn run_check(kind: CheckKind, input: &ValidationInput<'_>) -> Vec<ValidationIssue> {
    match kind {
        CheckKind::SequenceIntegrity => checks::sequence_integrity(input.entries),
        CheckKind::HardwareCorrelation => checks::hardware_correlation(input.entries),
        CheckKind::PhaseOrdering => checks::phase_ordering(input.entries),
        CheckKind::RegisterAccessibility => checks::register_accessibility(input.entries),
        CheckKind::BitChangeConsistency => checks::bit_change_consistency(input.entries),
        CheckKind::KnownValueCrossCheck => {
            checks::known_value_cross_check(input.entries, input.expected_final_values)
        }
    }
}

/// Run every check and collect every issue. Never fails; the caller decides
/// what a failed check means for the process.
pub fn validate(input: ValidationInput<'_>) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();
    let mut results = Vec::with_capacity(CheckKind::ALL.len());

    for kind in CheckKind::ALL {
        let found = run_check(kind, &input);
        if !found.is_empty() {
            warn!(check = %kind, issues = found.len(), "validation check failed");
        }
        results.push(CheckResult {
            check: kind,
            passed: found.is_empty(),
            issues: found.len(),
        });
        issues.extend(found);
    }

    issues.extend(input.rejected.iter().map(|r| ValidationIssue::InputRejected {
        location: r.location.clone(),
        reason: r.error.to_string(),
    }));

    let all_checks_passed = results.iter().all(|r| r.passed);
    let confidence_metrics = ConfidenceMetrics::from_statistics(input.statistics);
    info!(
        all_checks_passed,
        issues = issues.len(),
        overall_confidence = confidence_metrics.overall_confidence,
        "validation complete"
    );

    ValidationReport {
        total_entries_processed: input.entries.len(),
        correction_statistics: input.statistics.clone(),
        checks: results,
        issue_summary: issue_summary(&issues),
        confidence_metrics,
        recommendations: recommendations(input.statistics, issues.len(), &input.policy),
        mpu_sequence: mpu_sequence_coverage(input.entries),
        validation_issues: issues,
        all_checks_passed,
    }
}
