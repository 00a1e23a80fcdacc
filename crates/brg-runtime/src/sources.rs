use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use brg_config::EngineConfig;
use serde_json::Value;

/// A configured input file is not present. Fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSourceError {
    pub path: PathBuf,
}

impl fmt::Display for MissingSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing input file: {}", self.path.display())
    }
}

impl std::error::Error for MissingSourceError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInput {
    pub module: String,
    pub path: PathBuf,
}

/// Every input of a run, resolved against the results directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSources {
    /// In execution order.
    pub modules: Vec<ModuleInput>,
    pub hardware_snapshot: Option<PathBuf>,
}

/// Resolve configured inputs and check that every one exists.
///
/// The first absent file is returned as a [`MissingSourceError`] inside
/// the `anyhow::Error`.
pub fn resolve_sources(results_dir: &Path, cfg: &EngineConfig) -> Result<RunSources> {
    if !results_dir.is_dir() {
        return Err(MissingSourceError {
            path: results_dir.to_path_buf(),
        }
        .into());
    }

    let modules: Vec<ModuleInput> = cfg
        .modules_in_order()
        .into_iter()
        .map(|m| ModuleInput {
            module: m.module.clone(),
            path: results_dir.join(&m.file),
        })
        .collect();
    let hardware_snapshot = cfg
        .inputs
        .hardware_snapshot
        .as_ref()
        .map(|f| results_dir.join(f));

    let all = modules
        .iter()
        .map(|m| &m.path)
        .chain(hardware_snapshot.iter());
    for path in all {
        if !path.is_file() {
            return Err(MissingSourceError { path: path.clone() }.into());
        }
    }

    Ok(RunSources {
        modules,
        hardware_snapshot,
    })
}

pub fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read failed: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON: {}", path.display()))
}
