//! Output writers for a correction run: the corrected sequence JSON, the
//! validation report JSON and the Markdown summary.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use brg_schemas::CorrectedSequenceDocument;
use brg_validate::ValidationReport;

mod summary;

pub use summary::{render_summary, KeyRegister, SummaryInput};

/// Validation report as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReportDocument {
    pub validation_timestamp: DateTime<Utc>,
    pub config_hash: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub corrected_sequence: PathBuf,
    pub validation_report: PathBuf,
    pub summary: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path, sequence: &str, report: &str, summary: &str) -> Self {
        ArtifactPaths {
            corrected_sequence: dir.join(sequence),
            validation_report: dir.join(report),
            summary: dir.join(summary),
        }
    }

    pub fn file_names(&self) -> Vec<String> {
        [&self.corrected_sequence, &self.validation_report, &self.summary]
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

pub struct WriteArtifactsArgs<'a> {
    pub paths: &'a ArtifactPaths,
    pub sequence: &'a CorrectedSequenceDocument,
    pub report: &'a ValidationReportDocument,
    pub summary: &'a SummaryInput<'a>,
}

/// Pretty JSON with a trailing newline. Parent directories are created.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize failed: {}", path.display()))?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("write failed: {}", path.display()))?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, text).with_context(|| format!("write failed: {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir failed: {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_artifacts(args: WriteArtifactsArgs<'_>) -> Result<()> {
    write_json(&args.paths.corrected_sequence, args.sequence)?;
    write_json(&args.paths.validation_report, args.report)?;
    write_text(&args.paths.summary, &render_summary(args.summary))?;
    Ok(())
}

pub fn read_corrected_sequence(path: &Path) -> Result<CorrectedSequenceDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read failed: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("not a corrected sequence document: {}", path.display()))
}
