//! brg-runtime
//!
//! One correction run over a results directory:
//! sources -> normalize -> dedupe -> reconcile -> validate -> artifacts.
//!
//! Run-level failures (missing inputs, zero records) stop the run before
//! anything is written. Record-level failures are isolated and reported.

mod pipeline;
mod sources;

pub use pipeline::{catalog_for, run_correction, CorrectionRequest, CorrectionRun};
pub use sources::{read_json, resolve_sources, MissingSourceError, ModuleInput, RunSources};
