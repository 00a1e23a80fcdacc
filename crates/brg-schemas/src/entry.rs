use brg_catalog::{hex32, BitChange, ClockGateStatus, RegAddr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{AccessKind, AccessPurpose, ExecutionPhase};

/// One reconciled register access in the final boot sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAccessEntry {
    /// 1-based, contiguous.
    pub sequence_number: u32,
    /// Estimated from phase and instruction index; not a measured time.
    pub relative_timestamp_estimate_ms: Option<f64>,
    pub address: RegAddr,
    pub peripheral_name: String,
    pub register_name: String,
    /// Offset from the peripheral base, `null` for uncatalogued addresses.
    pub register_offset_from_base: Option<String>,
    pub access_type: AccessKind,
    pub data_width: u32,
    #[serde(with = "hex32")]
    pub value_before: u32,
    #[serde(with = "hex32")]
    pub value_after: u32,
    #[serde(with = "hex32::option")]
    pub value_written: Option<u32>,
    #[serde(
        default,
        with = "hex32::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub mask_applied: Option<u32>,
    pub bits_modified: Vec<BitChange>,
    pub execution_phase: ExecutionPhase,
    pub source_file_path: String,
    pub function_name: String,
    pub line_number: u32,
    pub call_stack_depth: u32,
    pub hardware_verified: bool,
    #[serde(with = "hex32::option")]
    pub j_link_captured_value: Option<u32>,
    pub clock_gate_status: ClockGateStatus,
    #[serde(default, skip_serializing_if = "AccessPurpose::is_unspecified")]
    pub purpose: AccessPurpose,
}

/// Counters describing how the sequence was assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionStatistics {
    pub total_entries: usize,
    pub duplicates_removed: usize,
    pub hardware_verified: usize,
    pub clock_gated_registers: usize,
    pub bit_changes_populated: usize,
    /// Writes whose value came from the known-value table.
    pub known_value_fallbacks: usize,
    /// Entries with no hardware capture at all.
    pub hardware_data_gaps: usize,
    pub rejected_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedSequenceDocument {
    pub total_accesses: usize,
    pub correction_timestamp: DateTime<Utc>,
    pub config_hash: String,
    pub statistics: CorrectionStatistics,
    pub chronological_sequence: Vec<CanonicalAccessEntry>,
}
