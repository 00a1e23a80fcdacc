mod access;
mod entry;
mod record;
mod snapshot;

pub use access::{AccessKind, AccessPurpose, ExecutionPhase};
pub use entry::{CanonicalAccessEntry, CorrectedSequenceDocument, CorrectionStatistics};
pub use record::{RawAccessRecord, SourceLocation, UNKNOWN_CALL_STACK};
pub use snapshot::HardwareSnapshot;
