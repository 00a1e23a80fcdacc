use std::path::Path;

use anyhow::{bail, Result};
use brg_artifacts::{
    write_artifacts, ArtifactPaths, KeyRegister, SummaryInput, ValidationReportDocument,
    WriteArtifactsArgs,
};
use brg_catalog::RegisterCatalog;
use brg_config::EngineConfig;
use brg_ingest::{dedupe, normalize, parse_hardware_snapshot, RejectedRecord};
use brg_reconcile::{correction_statistics, reconcile, ReconcileInput, ResolveOptions};
use brg_schemas::{CorrectedSequenceDocument, HardwareSnapshot, RawAccessRecord};
use brg_validate::{validate, RecommendationPolicy, ValidationInput, ValidationReport};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::sources::{read_json, resolve_sources, RunSources};

pub struct CorrectionRequest<'a> {
    pub results_dir: &'a Path,
    pub config: &'a EngineConfig,
    pub config_hash: &'a str,
    /// Stamped on every output document. Injected so reruns are
    /// reproducible.
    pub correction_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CorrectionRun {
    pub sequence: CorrectedSequenceDocument,
    pub report: ValidationReport,
    pub paths: ArtifactPaths,
}

impl CorrectionRun {
    pub fn all_checks_passed(&self) -> bool {
        self.report.all_checks_passed
    }
}

/// Catalog with the configured clock-gating rules.
pub fn catalog_for(cfg: &EngineConfig) -> RegisterCatalog {
    RegisterCatalog::mimxrt798s().with_clock_gate_rules(cfg.clock_gating.clone())
}

struct Ingested {
    records: Vec<RawAccessRecord>,
    snapshot: HardwareSnapshot,
    rejected: Vec<RejectedRecord>,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn ingest(sources: &RunSources, catalog: &RegisterCatalog) -> Result<Ingested> {
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for m in &sources.modules {
        let file = file_label(&m.path);
        let doc = read_json(&m.path)?;
        match normalize(&doc, catalog, Some(&m.module)) {
            Ok(out) => {
                info!(module = %m.module, %file, records = out.records.len(),
                    rejected = out.rejected.len(), "static analysis loaded");
                records.extend(out.records);
                rejected.extend(out.rejected.into_iter().map(|r| RejectedRecord {
                    location: format!("{file}:{}", r.location),
                    error: r.error,
                }));
            }
            Err(error) => {
                warn!(module = %m.module, %file, %error, "skipping static analysis document");
                rejected.push(RejectedRecord {
                    location: file,
                    error,
                });
            }
        }
    }

    let snapshot = match &sources.hardware_snapshot {
        None => HardwareSnapshot::empty(),
        Some(path) => {
            let file = file_label(path);
            match parse_hardware_snapshot(&read_json(path)?, catalog) {
                Ok(out) => {
                    info!(%file, initial = out.snapshot.initial.len(),
                        final_values = out.snapshot.final_values.len(),
                        clock_status = out.snapshot.clock_status.is_some(),
                        "hardware snapshot loaded");
                    rejected.extend(out.rejected.into_iter().map(|r| RejectedRecord {
                        location: format!("{file}:{}", r.location),
                        error: r.error,
                    }));
                    out.snapshot
                }
                Err(error) => {
                    warn!(%file, %error, "hardware snapshot unusable; continuing without captures");
                    rejected.push(RejectedRecord {
                        location: file,
                        error,
                    });
                    HardwareSnapshot::empty()
                }
            }
        }
    };

    Ok(Ingested {
        records,
        snapshot,
        rejected,
    })
}

/// Load, reconcile and validate one results directory, then write the three
/// output files.
///
/// Errors only for run-level problems: a missing input, unreadable JSON,
/// zero records, or a write failure. Failed checks are reported in the
/// returned run, not as an error.
pub fn run_correction(req: CorrectionRequest<'_>) -> Result<CorrectionRun> {
    let cfg = req.config;
    let sources = resolve_sources(req.results_dir, cfg)?;
    let catalog = catalog_for(cfg);

    let ingested = ingest(&sources, &catalog)?;
    if ingested.records.is_empty() {
        bail!(
            "no register access records in {} static analysis module(s) under {}",
            sources.modules.len(),
            req.results_dir.display()
        );
    }

    let deduped = dedupe(ingested.records);
    let outcome = reconcile(
        deduped.records,
        ReconcileInput {
            hardware: &ingested.snapshot,
            known_values: &cfg.known_values,
            catalog: &catalog,
            options: ResolveOptions {
                estimate_timestamps: cfg.timestamps.estimate,
            },
        },
    );
    let statistics =
        correction_statistics(&outcome, deduped.duplicates_removed, ingested.rejected.len());

    let report = validate(ValidationInput {
        entries: &outcome.entries,
        statistics: &statistics,
        expected_final_values: &cfg.expected_final_values,
        rejected: &ingested.rejected,
        policy: RecommendationPolicy {
            min_hardware_ratio: cfg.recommendations.min_hardware_ratio,
            max_duplicate_ratio: cfg.recommendations.max_duplicate_ratio,
        },
    });

    let key_registers =
        KeyRegister::collect(&outcome.entries, &cfg.expected_final_values, &catalog);
    let sequence = CorrectedSequenceDocument {
        total_accesses: outcome.entries.len(),
        correction_timestamp: req.correction_timestamp,
        config_hash: req.config_hash.to_string(),
        statistics,
        chronological_sequence: outcome.entries,
    };
    let report_doc = ValidationReportDocument {
        validation_timestamp: req.correction_timestamp,
        config_hash: req.config_hash.to_string(),
        report,
    };

    let paths = ArtifactPaths::in_dir(
        req.results_dir,
        &cfg.outputs.corrected_sequence,
        &cfg.outputs.validation_report,
        &cfg.outputs.summary,
    );
    let files = paths.file_names();
    write_artifacts(WriteArtifactsArgs {
        paths: &paths,
        sequence: &sequence,
        report: &report_doc,
        summary: &SummaryInput {
            correction_timestamp: req.correction_timestamp,
            report: &report_doc.report,
            key_registers: &key_registers,
            files: &files,
        },
    })?;

    info!(
        entries = sequence.total_accesses,
        all_checks_passed = report_doc.report.all_checks_passed,
        output = %paths.corrected_sequence.display(),
        "correction run complete"
    );

    Ok(CorrectionRun {
        sequence,
        report: report_doc.report,
        paths,
    })
}
