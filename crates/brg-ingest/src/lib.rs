//! brg-ingest
//!
//! Boundary between producer documents and the reconciliation core.
//!
//! - `normalizer`: static-analysis documents -> `RawAccessRecord`
//! - `snapshot`: probe capture document -> `HardwareSnapshot`
//! - `dedupe`: collapse duplicate records by completeness
//!
//! No file IO here; callers hand in parsed `serde_json::Value`s.

pub mod dedupe;
pub mod normalizer;
pub mod snapshot;

pub use dedupe::{completeness_score, dedupe, DedupeKey, DedupeOutcome};
pub use normalizer::{normalize, InputFormatError, NormalizeOutcome, RejectedRecord};
pub use snapshot::{parse_hardware_snapshot, SnapshotOutcome};
