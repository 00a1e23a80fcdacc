//! Duplicate collapse for normalized access records.
//!
//! Two records are the same access when they share
//! `(address, access kind, phase, function, source line)`. The first
//! occurrence keeps its position; a later duplicate replaces it in place only
//! when its completeness score is strictly higher. Running the pass on its
//! own output removes nothing.

use std::collections::HashMap;

use brg_catalog::RegAddr;
use brg_schemas::{AccessKind, ExecutionPhase, RawAccessRecord};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub address: RegAddr,
    pub access_kind: AccessKind,
    pub phase: ExecutionPhase,
    pub function: String,
    pub line: u32,
}

impl DedupeKey {
    pub fn of(r: &RawAccessRecord) -> Self {
        DedupeKey {
            address: r.address,
            access_kind: r.access_kind,
            phase: r.phase,
            function: r.function_name().to_string(),
            line: r.source_line(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupeOutcome {
    pub records: Vec<RawAccessRecord>,
    pub duplicates_removed: usize,
}

/// One point per populated field (max 11).
pub fn completeness_score(r: &RawAccessRecord) -> u8 {
    let present = |o: &Option<String>| o.as_deref().is_some_and(|s| !s.trim().is_empty());
    [
        true, // address is mandatory
        present(&r.peripheral_name),
        present(&r.register_name),
        true, // access kind is mandatory
        present(&r.source.file),
        present(&r.source.function),
        r.source.line.is_some(),
        r.phase != ExecutionPhase::Unknown,
        present(&r.execution_context),
        r.data_width.is_some(),
        r.bits_modified_present,
    ]
    .into_iter()
    .filter(|b| *b)
    .count() as u8
}

pub fn dedupe(records: Vec<RawAccessRecord>) -> DedupeOutcome {
    let mut out: Vec<RawAccessRecord> = Vec::with_capacity(records.len());
    let mut seen: HashMap<DedupeKey, usize> = HashMap::new();
    let mut duplicates_removed = 0usize;

    for r in records {
        let key = DedupeKey::of(&r);
        match seen.get(&key) {
            Some(&idx) => {
                duplicates_removed += 1;
                if completeness_score(&r) > completeness_score(&out[idx]) {
                    debug!(address = %r.address, function = %key.function, line = key.line,
                        "duplicate access replaced by more complete record");
                    out[idx] = r;
                }
            }
            None => {
                seen.insert(key, out.len());
                out.push(r);
            }
        }
    }

    DedupeOutcome {
        records: out,
        duplicates_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brg_schemas::SourceLocation;

    fn rec(addr: u32, func: &str, line: u32) -> RawAccessRecord {
        let mut r = RawAccessRecord::new(RegAddr(addr), AccessKind::VolatileWrite);
        r.phase = ExecutionPhase::BoardInit;
        r.source = SourceLocation {
            file: None,
            function: Some(func.to_string()),
            line: Some(line),
        };
        r
    }

    #[test]
    fn score_counts_populated_fields() {
        let mut r = RawAccessRecord::new(RegAddr(1), AccessKind::VolatileRead);
        assert_eq!(completeness_score(&r), 2);
        r.peripheral_name = Some("CLKCTL0".to_string());
        r.register_name = Some("  ".to_string());
        r.data_width = Some(32);
        assert_eq!(completeness_score(&r), 4);
    }

    #[test]
    fn keeps_first_when_not_strictly_better() {
        let mut a = rec(0x4000_1434, "f", 10);
        a.execution_context = Some("first".to_string());
        let mut b = rec(0x4000_1434, "f", 10);
        b.execution_context = Some("second".to_string());

        let out = dedupe(vec![a, b]);
        assert_eq!(out.duplicates_removed, 1);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].execution_context.as_deref(), Some("first"));
    }

    #[test]
    fn strictly_more_complete_duplicate_replaces_in_place() {
        let first = rec(0x4000_1434, "f", 10);
        let other = rec(0x4002_0030, "g", 11);
        let mut richer = rec(0x4000_1434, "f", 10);
        richer.register_name = Some("CLKSEL".to_string());
        richer.data_width = Some(32);

        let out = dedupe(vec![first, other, richer]);
        assert_eq!(out.duplicates_removed, 1);
        assert_eq!(out.records[0].register_name.as_deref(), Some("CLKSEL"));
        assert_eq!(out.records[1].address, RegAddr(0x4002_0030));
    }

    #[test]
    fn different_line_or_kind_is_not_a_duplicate() {
        let a = rec(0x4000_1434, "f", 10);
        let b = rec(0x4000_1434, "f", 11);
        let mut c = rec(0x4000_1434, "f", 10);
        c.access_kind = AccessKind::VolatileRead;
        let out = dedupe(vec![a, b, c]);
        assert_eq!(out.duplicates_removed, 0);
        assert_eq!(out.records.len(), 3);
    }
}
