//! brg-validate
//!
//! Confidence and validation over a reconciled boot sequence.
//!
//! Architectural decisions:
//! - Six independent checks, all always run
//! - Every issue is collected; nothing is removed from the sequence
//! - Ingest rejections are surfaced as `input_rejected` issues but do not
//!   fail a check
//! - Pass/fail is data; only the binary turns it into an exit status
//!
//! This module does **not**:
//! - modify entries
//! - read or write files

pub mod checks;
pub mod confidence;
pub mod issues;
pub mod mpu;
mod report;

pub use confidence::{recommendations, ConfidenceMetrics, RecommendationPolicy, MAX_CONFIDENCE};
pub use issues::{issue_summary, CheckKind, CheckResult, ValidationIssue};
pub use mpu::{mpu_sequence_coverage, MpuSequenceCoverage, MpuStep, MPU_STEPS};
pub use report::{validate, ValidationInput, ValidationReport};
