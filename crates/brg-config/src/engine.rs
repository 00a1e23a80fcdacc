use anyhow::{bail, Context, Result};
use brg_catalog::{
    default_clock_gate_rules, default_expected_final_values, default_known_values, ClockGateRule,
    GateCondition, RegisterValueTable,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Effective pipeline configuration. Every section has a default so an
/// empty config reproduces the MIMXRT798S reference setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub inputs: InputsConfig,
    pub outputs: OutputsConfig,
    /// Resolver fallback for writes without a hardware capture.
    pub known_values: RegisterValueTable,
    /// Validation oracle: expected final value per address.
    pub expected_final_values: RegisterValueTable,
    pub clock_gating: Vec<ClockGateRule>,
    pub timestamps: TimestampConfig,
    pub recommendations: RecommendationThresholds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Static-analysis documents, one per firmware module.
    pub static_analysis: Vec<ModuleSource>,
    /// Hardware snapshot file name; `null` runs without hardware data.
    pub hardware_snapshot: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSource {
    pub file: String,
    pub module: String,
    pub execution_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputsConfig {
    pub corrected_sequence: String,
    pub validation_report: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampConfig {
    /// Emit `relative_timestamp_estimate_ms`; `false` writes `null`.
    pub estimate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationThresholds {
    /// Recommend wider hardware coverage below this verified ratio.
    pub min_hardware_ratio: f64,
    /// Recommend reviewing duplicate detection above this removed ratio.
    pub max_duplicate_ratio: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            inputs: InputsConfig::default(),
            outputs: OutputsConfig::default(),
            known_values: default_known_values(),
            expected_final_values: default_expected_final_values(),
            clock_gating: default_clock_gate_rules(),
            timestamps: TimestampConfig::default(),
            recommendations: RecommendationThresholds::default(),
        }
    }
}

impl Default for InputsConfig {
    fn default() -> Self {
        InputsConfig {
            static_analysis: vec![ModuleSource {
                file: "complete_enhanced_peripheral_analysis.json".to_string(),
                module: "BOARD_InitHardware".to_string(),
                execution_order: 1,
            }],
            hardware_snapshot: Some("hardware_snapshot.json".to_string()),
        }
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        OutputsConfig {
            corrected_sequence: "corrected_chronological_sequence.json".to_string(),
            validation_report: "sequence_validation_report.json".to_string(),
            summary: "corrected_sequence_summary.md".to_string(),
        }
    }
}

impl Default for TimestampConfig {
    fn default() -> Self {
        TimestampConfig { estimate: true }
    }
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        RecommendationThresholds {
            min_hardware_ratio: 0.5,
            max_duplicate_ratio: 0.1,
        }
    }
}

impl EngineConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let mut cfg: EngineConfig = serde_json::from_value(config_json.clone())
            .context("config does not match the engine config schema")?;
        cfg.clock_gating = cfg
            .clock_gating
            .into_iter()
            .map(ClockGateRule::normalized)
            .collect();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Static-analysis modules sorted by execution order (ties keep
    /// declaration order).
    pub fn modules_in_order(&self) -> Vec<&ModuleSource> {
        let mut mods: Vec<&ModuleSource> = self.inputs.static_analysis.iter().collect();
        mods.sort_by_key(|m| m.execution_order);
        mods
    }

    fn validate(&self) -> Result<()> {
        if self.inputs.static_analysis.is_empty() {
            bail!("CONFIG_INVALID: inputs.static_analysis must list at least one module");
        }

        let mut seen = BTreeSet::new();
        for m in &self.inputs.static_analysis {
            if m.file.trim().is_empty() {
                bail!("CONFIG_INVALID: module '{}' has an empty file name", m.module);
            }
            if !seen.insert(m.module.as_str()) {
                bail!("CONFIG_INVALID: duplicate static-analysis module '{}'", m.module);
            }
        }

        let mut gated = BTreeSet::new();
        for r in &self.clock_gating {
            if !gated.insert(r.peripheral.as_str()) {
                bail!(
                    "CONFIG_INVALID: more than one clock-gating rule for peripheral '{}'",
                    r.peripheral
                );
            }
            if let GateCondition::BitClear { bit } = r.condition {
                if bit > 31 {
                    bail!(
                        "CONFIG_INVALID: clock-gating rule for '{}' uses bit {bit} of {}; \
                         control registers are 32 bits wide",
                        r.peripheral,
                        r.control_register
                    );
                }
            }
        }

        let t = &self.recommendations;
        for (name, v) in [
            ("min_hardware_ratio", t.min_hardware_ratio),
            ("max_duplicate_ratio", t.max_duplicate_ratio),
        ] {
            if !(0.0..=1.0).contains(&v) {
                bail!("CONFIG_INVALID: recommendations.{name} must be within [0, 1], got {v}");
            }
        }
        Ok(())
    }
}
