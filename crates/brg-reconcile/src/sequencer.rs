//! Deterministic ordering of deduplicated records.
//!
//! Sort key is `(phase rank, instruction index, source line)`. The sort is
//! stable, so ties keep input order (module execution order first, then
//! position inside the module document). Sequence numbers are assigned here
//! and nowhere else.

use brg_schemas::RawAccessRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedRecord {
    /// 1-based position in the reconstructed boot order.
    pub sequence_number: u32,
    pub record: RawAccessRecord,
}

pub fn order(records: Vec<RawAccessRecord>) -> Vec<SequencedRecord> {
    let mut records = records;
    records.sort_by_key(|r| (r.phase.rank(), r.instruction_index, r.source_line()));

    records
        .into_iter()
        .zip(1u32..)
        .map(|(record, sequence_number)| SequencedRecord {
            sequence_number,
            record,
        })
        .collect()
}
