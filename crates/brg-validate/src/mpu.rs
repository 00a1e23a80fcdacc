//! MPU configuration sequence coverage.
//!
//! Informational; not one of the pass/fail checks. Looks for the cache and
//! MPU steps of a board MPU setup by access purpose and whether the
//! critical steps (cache off, MPU on, cache on) occur in that order.

use brg_schemas::{AccessPurpose, CanonicalAccessEntry};
use serde::{Deserialize, Serialize};

pub const MPU_STEPS: [(&str, AccessPurpose); 6] = [
    ("XCACHE_DisableCache", AccessPurpose::CacheDisable),
    ("ARM_MPU_Disable", AccessPurpose::MpuDisable),
    ("ARM_MPU_SetMemAttr", AccessPurpose::MpuMemoryAttribute),
    ("ARM_MPU_SetRegion", AccessPurpose::MpuRegion),
    ("ARM_MPU_Enable", AccessPurpose::MpuEnable),
    ("XCACHE_EnableCache", AccessPurpose::CacheEnable),
];

const CRITICAL: [AccessPurpose; 3] = [
    AccessPurpose::CacheDisable,
    AccessPurpose::MpuEnable,
    AccessPurpose::CacheEnable,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpuStep {
    pub step: String,
    pub purpose: AccessPurpose,
    pub occurrences: usize,
    pub first_sequence_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MpuSequenceCoverage {
    pub steps: Vec<MpuStep>,
    pub coverage_percent: f64,
    pub critical_steps_present: bool,
    pub critical_steps_in_order: bool,
}

pub fn mpu_sequence_coverage(entries: &[CanonicalAccessEntry]) -> MpuSequenceCoverage {
    let steps: Vec<MpuStep> = MPU_STEPS
        .iter()
        .map(|(name, purpose)| {
            let mut matching = entries.iter().filter(|e| e.purpose == *purpose);
            let first = matching.next().map(|e| e.sequence_number);
            MpuStep {
                step: name.to_string(),
                purpose: *purpose,
                occurrences: first.map_or(0, |_| 1 + matching.count()),
                first_sequence_number: first,
            }
        })
        .collect();

    let found = steps.iter().filter(|s| s.occurrences > 0).count();
    let critical_steps_present = CRITICAL
        .iter()
        .all(|p| entries.iter().any(|e| e.purpose == *p));

    MpuSequenceCoverage {
        coverage_percent: (found as f64 / MPU_STEPS.len() as f64 * 10000.0).round() / 100.0,
        critical_steps_present,
        critical_steps_in_order: critical_steps_present && in_order(entries),
        steps,
    }
}

/// The critical purposes occur as a subsequence, in order.
fn in_order(entries: &[CanonicalAccessEntry]) -> bool {
    let mut want = CRITICAL.iter().peekable();
    for e in entries {
        if want.peek().is_some_and(|p| **p == e.purpose) {
            want.next();
        }
    }
    want.peek().is_none()
}
