use std::collections::BTreeMap;
use std::fmt;

use brg_catalog::{hex32, RegAddr};
use brg_schemas::{AccessKind, ExecutionPhase};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    SequenceIntegrity,
    HardwareCorrelation,
    PhaseOrdering,
    RegisterAccessibility,
    BitChangeConsistency,
    KnownValueCrossCheck,
}

impl CheckKind {
    pub const ALL: [CheckKind; 6] = [
        CheckKind::SequenceIntegrity,
        CheckKind::HardwareCorrelation,
        CheckKind::PhaseOrdering,
        CheckKind::RegisterAccessibility,
        CheckKind::BitChangeConsistency,
        CheckKind::KnownValueCrossCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::SequenceIntegrity => "sequence_integrity",
            CheckKind::HardwareCorrelation => "hardware_correlation",
            CheckKind::PhaseOrdering => "phase_ordering",
            CheckKind::RegisterAccessibility => "register_accessibility",
            CheckKind::BitChangeConsistency => "bit_change_consistency",
            CheckKind::KnownValueCrossCheck => "known_value_cross_check",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CheckKind::SequenceIntegrity => "Sequence integrity",
            CheckKind::HardwareCorrelation => "Hardware correlation",
            CheckKind::PhaseOrdering => "Phase ordering",
            CheckKind::RegisterAccessibility => "Register accessibility",
            CheckKind::BitChangeConsistency => "Bit-change consistency",
            CheckKind::KnownValueCrossCheck => "Known-value cross-check",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub passed: bool,
    pub issues: usize,
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// One finding. Serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationIssue {
    SequenceGap {
        /// 0-based position in the sequence.
        position: usize,
        expected: u32,
        found: u32,
    },
    HardwareMismatch {
        sequence_number: u32,
        address: RegAddr,
        register: String,
        #[serde(with = "hex32")]
        expected: u32,
        #[serde(with = "hex32::option")]
        captured: Option<u32>,
    },
    PhaseRegression {
        sequence_number: u32,
        previous_phase: ExecutionPhase,
        phase: ExecutionPhase,
    },
    ClockGatedAccess {
        sequence_number: u32,
        address: RegAddr,
        register: String,
        access_type: AccessKind,
    },
    BitChangeMismatch {
        sequence_number: u32,
        address: RegAddr,
        #[serde(with = "hex32")]
        expected_mask: u32,
        #[serde(with = "hex32")]
        reported_mask: u32,
    },
    KnownValueMismatch {
        sequence_number: u32,
        address: RegAddr,
        register: String,
        #[serde(with = "hex32")]
        expected: u32,
        #[serde(with = "hex32")]
        actual: u32,
    },
    InputRejected {
        location: String,
        reason: String,
    },
}

impl ValidationIssue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValidationIssue::SequenceGap { .. } => "sequence_gap",
            ValidationIssue::HardwareMismatch { .. } => "hardware_mismatch",
            ValidationIssue::PhaseRegression { .. } => "phase_regression",
            ValidationIssue::ClockGatedAccess { .. } => "clock_gated_access",
            ValidationIssue::BitChangeMismatch { .. } => "bit_change_mismatch",
            ValidationIssue::KnownValueMismatch { .. } => "known_value_mismatch",
            ValidationIssue::InputRejected { .. } => "input_rejected",
        }
    }

    /// The check that raised this issue; `None` for ingest rejections.
    pub fn check(&self) -> Option<CheckKind> {
        match self {
            ValidationIssue::SequenceGap { .. } => Some(CheckKind::SequenceIntegrity),
            ValidationIssue::HardwareMismatch { .. } => Some(CheckKind::HardwareCorrelation),
            ValidationIssue::PhaseRegression { .. } => Some(CheckKind::PhaseOrdering),
            ValidationIssue::ClockGatedAccess { .. } => Some(CheckKind::RegisterAccessibility),
            ValidationIssue::BitChangeMismatch { .. } => Some(CheckKind::BitChangeConsistency),
            ValidationIssue::KnownValueMismatch { .. } => Some(CheckKind::KnownValueCrossCheck),
            ValidationIssue::InputRejected { .. } => None,
        }
    }
}

/// Issue count by `type`.
pub fn issue_summary(issues: &[ValidationIssue]) -> BTreeMap<String, usize> {
    let mut out = BTreeMap::new();
    for i in issues {
        *out.entry(i.type_name().to_string()).or_insert(0) += 1;
    }
    out
}
