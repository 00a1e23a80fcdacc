//! The six sequence checks.
//!
//! Each check is a pure function over the finished sequence. Checks never
//! modify or drop entries; they only report.

use brg_catalog::{ClockGateStatus, RegisterValueTable};
use brg_schemas::CanonicalAccessEntry;

use crate::issues::ValidationIssue;

fn register_label(e: &CanonicalAccessEntry) -> String {
    format!("{}.{}", e.peripheral_name, e.register_name)
}

/// Sequence numbers are exactly 1..N in order.
pub fn sequence_integrity(entries: &[CanonicalAccessEntry]) -> Vec<ValidationIssue> {
    entries
        .iter()
        .zip(1u32..)
        .enumerate()
        .filter(|(_, (e, expected))| e.sequence_number != *expected)
        .map(|(position, (e, expected))| ValidationIssue::SequenceGap {
            position,
            expected,
            found: e.sequence_number,
        })
        .collect()
}

/// A verified entry carries a captured value equal to its value-after.
pub fn hardware_correlation(entries: &[CanonicalAccessEntry]) -> Vec<ValidationIssue> {
    entries
        .iter()
        .filter(|e| e.hardware_verified && e.j_link_captured_value != Some(e.value_after))
        .map(|e| ValidationIssue::HardwareMismatch {
            sequence_number: e.sequence_number,
            address: e.address,
            register: register_label(e),
            expected: e.value_after,
            captured: e.j_link_captured_value,
        })
        .collect()
}

/// Phase rank never decreases.
pub fn phase_ordering(entries: &[CanonicalAccessEntry]) -> Vec<ValidationIssue> {
    entries
        .windows(2)
        .filter(|w| w[1].execution_phase.rank() < w[0].execution_phase.rank())
        .map(|w| ValidationIssue::PhaseRegression {
            sequence_number: w[1].sequence_number,
            previous_phase: w[0].execution_phase,
            phase: w[1].execution_phase,
        })
        .collect()
}

/// No volatile access to a register whose peripheral clock is off.
/// SDK function-call writes are exempt.
pub fn register_accessibility(entries: &[CanonicalAccessEntry]) -> Vec<ValidationIssue> {
    entries
        .iter()
        .filter(|e| e.clock_gate_status == ClockGateStatus::Disabled && e.access_type.is_volatile())
        .map(|e| ValidationIssue::ClockGatedAccess {
            sequence_number: e.sequence_number,
            address: e.address,
            register: register_label(e),
            access_type: e.access_type,
        })
        .collect()
}

/// Changed bits implied by the reported field changes.
pub fn reported_change_mask(entry: &CanonicalAccessEntry) -> u32 {
    entry.bits_modified.iter().fold(0u32, |acc, c| {
        let width_mask = match c.bit_width {
            0 => 0,
            w if w >= 32 => u32::MAX,
            w => (1u32 << w) - 1,
        };
        let changed = (c.value_before ^ c.value_after) & width_mask;
        acc | changed.checked_shl(u32::from(c.bit_position)).unwrap_or(0)
    })
}

/// Reported bit changes cover exactly `value_before ^ value_after`, and are
/// empty iff the value did not change.
pub fn bit_change_consistency(entries: &[CanonicalAccessEntry]) -> Vec<ValidationIssue> {
    entries
        .iter()
        .filter_map(|e| {
            let expected = e.value_before ^ e.value_after;
            let reported = reported_change_mask(e);
            let empty_mismatch = e.bits_modified.is_empty() != (expected == 0);
            (reported != expected || empty_mismatch).then(|| ValidationIssue::BitChangeMismatch {
                sequence_number: e.sequence_number,
                address: e.address,
                expected_mask: expected,
                reported_mask: reported,
            })
        })
        .collect()
}

/// The last access to each oracle register ends on the expected value.
/// Registers the sequence never touches are skipped.
pub fn known_value_cross_check(
    entries: &[CanonicalAccessEntry],
    expected: &RegisterValueTable,
) -> Vec<ValidationIssue> {
    expected
        .iter()
        .filter_map(|(address, want)| {
            let last = entries.iter().rev().find(|e| e.address == address)?;
            (last.value_after != want).then(|| ValidationIssue::KnownValueMismatch {
                sequence_number: last.sequence_number,
                address,
                register: register_label(last),
                expected: want,
                actual: last.value_after,
            })
        })
        .collect()
}
