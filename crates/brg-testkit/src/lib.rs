//! Shared fixtures for end-to-end scenarios: realistic producer documents,
//! temp results directories, and a one-call pipeline runner.

use anyhow::{Context, Result};
use brg_config::{load_engine_config_from_strings, EngineConfig, LoadedConfig};
use brg_runtime::{run_correction, CorrectionRequest, CorrectionRun};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const STATIC_ANALYSIS_FILE: &str = "complete_enhanced_peripheral_analysis.json";
pub const HARDWARE_SNAPSHOT_FILE: &str = "hardware_snapshot.json";
pub const FIXED_TIMESTAMP_RFC3339: &str = "2025-06-01T12:00:00Z";

pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Producer documents
// ---------------------------------------------------------------------------

fn access(
    address: &str,
    kind: &str,
    phase: &str,
    index: u64,
    (file, function, line): (&str, &str, u32),
) -> Value {
    json!({
        "address": address,
        "access_type": kind,
        "execution_phase": phase,
        "instruction_index": index,
        "data_size": 32,
        "call_stack": format!("main->BOARD_InitHardware->{function}"),
        "source_location": {"file": file, "function": function, "line": line}
    })
}

/// `BOARD_InitHardware` in the flat chronological shape. Every check passes
/// against [`hardware_snapshot_document`] with the default configuration.
///
/// Contains one duplicate (CLKSEL), one uncatalogued address and one
/// malformed record.
pub fn board_init_document() -> Value {
    let mut seq = vec![
        access(
            "0x40033000",
            "volatile_write",
            "board_init",
            1,
            ("board.c", "XCACHE_DisableCache", 210),
        ),
        access(
            "0xE000ED94",
            "volatile_write",
            "board_init",
            2,
            ("board.c", "ARM_MPU_Disable", 212),
        ),
        access(
            "0xE000EDC0",
            "volatile_write",
            "board_init",
            3,
            ("board.c", "ARM_MPU_SetMemAttr", 214),
        ),
        access(
            "0xE000ED9C",
            "volatile_write",
            "board_init",
            4,
            ("board.c", "ARM_MPU_SetRegion", 216),
        ),
        access(
            "0xE000ED94",
            "volatile_write",
            "board_init",
            5,
            ("board.c", "ARM_MPU_Enable", 220),
        ),
        access(
            "0x40033000",
            "volatile_write",
            "board_init",
            6,
            ("board.c", "XCACHE_EnableCache", 222),
        ),
        access(
            "0x40001434",
            "function_call_write",
            "board_init",
            10,
            ("clock_config.c", "BOARD_BootClockRUN", 88),
        ),
        access(
            "0x40020030",
            "volatile_write",
            "board_init",
            11,
            ("clock_config.c", "BOARD_BootClockRUN", 95),
        ),
        access(
            "0x4000407C",
            "function_call_write",
            "board_init",
            20,
            ("pin_mux.c", "IOPCTL_PinMuxSet", 60),
        ),
        access(
            "0x400A5080",
            "function_call_write",
            "board_init",
            21,
            ("pin_mux.c", "IOPCTL_PinMuxSet", 64),
        ),
        access(
            "0x40411000",
            "volatile_write",
            "driver_init",
            3,
            ("fsl_xspi.c", "XSPI_Init", 300),
        ),
        access(
            "0x40411000",
            "volatile_read",
            "driver_init",
            4,
            ("fsl_xspi.c", "XSPI_Init", 305),
        ),
        access(
            "0x5FFF0010",
            "volatile_write",
            "runtime",
            1,
            ("app.c", "APP_Poke", 12),
        ),
    ];
    // Sparse duplicate of the CLKSEL write, as a second analysis pass emits it.
    seq.push(json!({
        "address": "0x40001434",
        "access_type": "function_call_write",
        "execution_phase": "board_init",
        "source_location": {"function": "BOARD_BootClockRUN", "line": 88}
    }));
    seq.push(json!({"address": "not-an-address", "access_type": "volatile_write"}));

    json!({ "chronological_sequence": seq })
}

/// A volatile read of IOPCTL2 while its clock (PSCCTL2) is off.
pub fn gated_read_document() -> Value {
    let read = access(
        "0x400A5080",
        "volatile_read",
        "board_init",
        30,
        ("pin_mux.c", "BOARD_InitPins", 70),
    );
    json!({ "chronological_sequence": [read] })
}

/// `BOARD_InitPins` in the peripheral-grouped shape.
pub fn pin_mux_document() -> Value {
    json!({ "peripheral_accesses": [
        {
            "peripheral_name": "IOPCTL0",
            "accesses": [
                {
                    "address": "0x40004080",
                    "access_type": "function_call_write",
                    "execution_phase": "board_init",
                    "instruction_index": 25,
                    "file_name": "pin_mux.c",
                    "function_name": "IOPCTL_PinMuxSet",
                    "line_number": 80
                }
            ]
        }
    ]})
}

pub fn hardware_snapshot_document() -> Value {
    json!({
        "initial": {
            "0x40001434": "0x00000000"
        },
        "final": {
            "0x40001434": {"value": "0x00000002", "success": true},
            "1073872944": "0x0000001C",
            "0x40411000": {"value": "0x00000000", "success": false}
        },
        "clock_status": {
            "PSCCTL2": "0x00000000",
            "PSCCTL4": {"value": "0x00000001"},
            "PSCCTL5": "0x00000004"
        }
    })
}

// ---------------------------------------------------------------------------
// Results directory
// ---------------------------------------------------------------------------

/// Temp directory laid out like a producer results directory.
pub struct ResultsDir {
    dir: TempDir,
}

impl ResultsDir {
    pub fn new() -> Result<Self> {
        Ok(ResultsDir {
            dir: tempfile::tempdir().context("create temp results dir")?,
        })
    }

    /// Default inputs: [`board_init_document`] + [`hardware_snapshot_document`].
    pub fn with_default_inputs() -> Result<Self> {
        let d = Self::new()?;
        d.write_json(STATIC_ANALYSIS_FILE, &board_init_document())?;
        d.write_json(HARDWARE_SNAPSHOT_FILE, &hardware_snapshot_document())?;
        Ok(d)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.file(name);
        let raw = serde_json::to_string_pretty(value).context("serialize fixture")?;
        fs::write(&path, raw).with_context(|| format!("write fixture: {}", path.display()))?;
        Ok(path)
    }

    pub fn write_text(&self, name: &str, text: &str) -> Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, text).with_context(|| format!("write fixture: {}", path.display()))?;
        Ok(path)
    }

    pub fn read_json(&self, name: &str) -> Result<Value> {
        let path = self.file(name);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read output: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse output: {}", path.display()))
    }

    pub fn read_text(&self, name: &str) -> Result<String> {
        let path = self.file(name);
        fs::read_to_string(&path).with_context(|| format!("read output: {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn config_from_yaml(docs: &[&str]) -> Result<(EngineConfig, LoadedConfig)> {
    load_engine_config_from_strings(docs)
}

/// Run the full pipeline over `dir` with layered YAML overrides and the
/// fixed timestamp.
pub fn run_with_yaml(dir: &ResultsDir, yaml_docs: &[&str]) -> Result<CorrectionRun> {
    let (cfg, loaded) = config_from_yaml(yaml_docs)?;
    run_correction(CorrectionRequest {
        results_dir: dir.path(),
        config: &cfg,
        config_hash: &loaded.config_hash,
        correction_timestamp: fixed_timestamp(),
    })
}
