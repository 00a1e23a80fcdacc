//! brg-reconcile
//!
//! Turns deduplicated access records into the canonical boot sequence.
//!
//! Architectural decisions:
//! - Sequence numbers are assigned once, by the sequencer
//! - Running register state is an explicit value folded through the resolver
//! - Hardware captures outrank the known-value table; nothing is invented
//! - Bit changes are computed only after values are final
//!
//! Deterministic, pure logic. No IO.

mod engine;

pub mod bits;
pub mod gating;
pub mod resolver;
pub mod sequencer;

pub use bits::{analyze, analyze_all};
pub use engine::{correction_statistics, reconcile, ReconcileInput, ReconcileOutcome};
pub use gating::{classify, classify_all};
pub use resolver::{
    estimate_timestamp_ms, resolve, resolve_values, RegisterState, ResolveOptions, ResolveOutcome,
    ResolvedValues, ValueSource,
};
pub use sequencer::{order, SequencedRecord};
