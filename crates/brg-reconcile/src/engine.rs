use brg_catalog::{RegisterCatalog, RegisterValueTable};
use brg_schemas::{CanonicalAccessEntry, CorrectionStatistics, HardwareSnapshot, RawAccessRecord};
use tracing::info;

use crate::bits::analyze_all;
use crate::gating::classify_all;
use crate::resolver::{resolve, RegisterState, ResolveOptions};
use crate::sequencer::order;

/// Everything the reconcile pass reads besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub hardware: &'a HardwareSnapshot,
    pub known_values: &'a RegisterValueTable,
    pub catalog: &'a RegisterCatalog,
    pub options: ResolveOptions,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub entries: Vec<CanonicalAccessEntry>,
    pub known_value_fallbacks: usize,
    pub hardware_data_gaps: usize,
    pub clock_gated: usize,
    pub bit_changes_populated: usize,
}

/// order -> resolve -> analyze bits -> classify clock gating.
pub fn reconcile(records: Vec<RawAccessRecord>, input: ReconcileInput<'_>) -> ReconcileOutcome {
    let ordered = order(records);
    let mut state = RegisterState::new();
    let resolved = resolve(
        &ordered,
        input.hardware,
        input.known_values,
        input.catalog,
        &mut state,
        input.options,
    );

    let mut entries = resolved.entries;
    let bit_changes_populated = analyze_all(&mut entries, input.catalog);
    let clock_gated = classify_all(
        &mut entries,
        input.hardware.clock_status.as_ref(),
        input.catalog,
    );

    info!(
        entries = entries.len(),
        registers = state.len(),
        known_value_fallbacks = resolved.known_value_fallbacks,
        hardware_data_gaps = resolved.hardware_data_gaps,
        clock_gated,
        "sequence reconciled"
    );

    ReconcileOutcome {
        entries,
        known_value_fallbacks: resolved.known_value_fallbacks,
        hardware_data_gaps: resolved.hardware_data_gaps,
        clock_gated,
        bit_changes_populated,
    }
}

pub fn correction_statistics(
    outcome: &ReconcileOutcome,
    duplicates_removed: usize,
    rejected_records: usize,
) -> CorrectionStatistics {
    CorrectionStatistics {
        total_entries: outcome.entries.len(),
        duplicates_removed,
        hardware_verified: outcome
            .entries
            .iter()
            .filter(|e| e.hardware_verified)
            .count(),
        clock_gated_registers: outcome.clock_gated,
        bit_changes_populated: outcome.bit_changes_populated,
        known_value_fallbacks: outcome.known_value_fallbacks,
        hardware_data_gaps: outcome.hardware_data_gaps,
        rejected_records,
    }
}
