use brg_catalog::RegAddr;
use serde::{Deserialize, Serialize};

use crate::access::{AccessKind, AccessPurpose, ExecutionPhase};

pub const UNKNOWN_CALL_STACK: &str = "UNKNOWN";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub function: Option<String>,
    pub line: Option<u32>,
}

/// One statically-derived register access after normalization.
///
/// Optional fields stay `None` when the producer omitted them so the
/// deduplicator can score completeness; sentinel fields (`call_stack`,
/// `instruction_index`, `phase`) are already filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccessRecord {
    pub address: RegAddr,
    pub peripheral_name: Option<String>,
    pub register_name: Option<String>,
    pub access_kind: AccessKind,
    pub source: SourceLocation,
    /// `"UNKNOWN"` when absent.
    pub call_stack: String,
    pub phase: ExecutionPhase,
    pub execution_context: Option<String>,
    /// `0` when absent.
    pub instruction_index: u64,
    /// Access width in bits.
    pub data_width: Option<u32>,
    pub bits_modified_present: bool,
    pub mask: Option<u32>,
    pub purpose: AccessPurpose,
    /// Static-analysis module the record came from.
    pub module: Option<String>,
}

impl RawAccessRecord {
    /// A record with only the mandatory fields set.
    pub fn new(address: RegAddr, access_kind: AccessKind) -> Self {
        RawAccessRecord {
            address,
            peripheral_name: None,
            register_name: None,
            access_kind,
            source: SourceLocation::default(),
            call_stack: UNKNOWN_CALL_STACK.to_string(),
            phase: ExecutionPhase::Unknown,
            execution_context: None,
            instruction_index: 0,
            data_width: None,
            bits_modified_present: false,
            mask: None,
            purpose: AccessPurpose::Unspecified,
            module: None,
        }
    }

    pub fn function_name(&self) -> &str {
        self.source.function.as_deref().unwrap_or("")
    }

    pub fn source_line(&self) -> u32 {
        self.source.line.unwrap_or(0)
    }

    /// Number of `->`-separated frames; 1 when no call stack was recorded.
    pub fn call_stack_depth(&self) -> u32 {
        if self.call_stack.trim().is_empty() || self.call_stack == UNKNOWN_CALL_STACK {
            return 1;
        }
        self.call_stack.split("->").count() as u32
    }
}
