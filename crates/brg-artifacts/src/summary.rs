use std::fmt;

use brg_catalog::{format_hex32, RegAddr, RegisterCatalog, RegisterValueTable};
use brg_schemas::CanonicalAccessEntry;
use brg_validate::ValidationReport;
use chrono::{DateTime, Utc};

/// An oracle register as it ended up in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRegister {
    pub label: String,
    pub address: RegAddr,
    pub expected: u32,
    /// `(value_after, hardware_verified)` of the last access.
    pub observed: Option<(u32, bool)>,
}

impl KeyRegister {
    pub fn collect(
        entries: &[CanonicalAccessEntry],
        oracle: &RegisterValueTable,
        catalog: &RegisterCatalog,
    ) -> Vec<KeyRegister> {
        oracle
            .iter()
            .map(|(address, expected)| {
                let (p, r) = catalog.labels(address);
                KeyRegister {
                    label: format!("{p}_{r}"),
                    address,
                    expected,
                    observed: entries
                        .iter()
                        .rev()
                        .find(|e| e.address == address)
                        .map(|e| (e.value_after, e.hardware_verified)),
                }
            })
            .collect()
    }
}

pub struct SummaryInput<'a> {
    pub correction_timestamp: DateTime<Utc>,
    pub report: &'a ValidationReport,
    pub key_registers: &'a [KeyRegister],
    pub files: &'a [String],
}

pub fn render_summary(input: &SummaryInput<'_>) -> String {
    input.to_string()
}

impl fmt::Display for SummaryInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Boot Register Sequence Summary\n")?;
        self.write_overview(f)?;
        self.write_statistics(f)?;
        self.write_validation(f)?;
        self.write_key_registers(f)?;

        writeln!(f, "\n## Recommendations")?;
        if self.report.recommendations.is_empty() {
            writeln!(f, "- None")?;
        }
        for r in &self.report.recommendations {
            writeln!(f, "- {r}")?;
        }

        writeln!(f, "\n## Files Generated")?;
        for file in self.files {
            writeln!(f, "- `{file}`")?;
        }
        Ok(())
    }
}

impl SummaryInput<'_> {
    fn write_overview(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "## Overview")?;
        writeln!(
            f,
            "- **Total Register Accesses**: {}",
            report.correction_statistics.total_entries
        )?;
        writeln!(
            f,
            "- **Correction Timestamp**: {}",
            self.correction_timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            f,
            "- **Overall Confidence**: {:.1}%",
            report.confidence_metrics.overall_confidence
        )?;
        writeln!(
            f,
            "- **All Checks Passed**: {}\n",
            if report.all_checks_passed { "yes" } else { "no" }
        )
    }

    fn write_statistics(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.report.correction_statistics;
        let conf = &self.report.confidence_metrics;
        writeln!(f, "## Correction Statistics")?;
        writeln!(f, "- **Duplicates Removed**: {}", stats.duplicates_removed)?;
        writeln!(
            f,
            "- **Hardware Verified**: {} ({:.1}%)",
            stats.hardware_verified, conf.hardware_verification_rate
        )?;
        writeln!(f, "- **Clock-Gated Registers**: {}", stats.clock_gated_registers)?;
        writeln!(
            f,
            "- **Bit Changes Populated**: {} ({:.1}%)",
            stats.bit_changes_populated, conf.bit_analysis_completion_rate
        )?;
        writeln!(f, "- **Known-Value Fallbacks**: {}", stats.known_value_fallbacks)?;
        writeln!(f, "- **Hardware Data Gaps**: {}", stats.hardware_data_gaps)?;
        writeln!(f, "- **Rejected Records**: {}\n", stats.rejected_records)
    }

    fn write_validation(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "## Validation Results")?;
        for c in &report.checks {
            writeln!(
                f,
                "- {} **{}** ({} issues)",
                if c.passed { "[PASS]" } else { "[FAIL]" },
                c.check.title(),
                c.issues
            )?;
        }
        writeln!(f, "- **Total Issues**: {}", report.validation_issues.len())?;
        if !report.issue_summary.is_empty() {
            let types: Vec<String> = report
                .issue_summary
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            writeln!(f, "- **Issue Types**: {}", types.join(", "))?;
        }
        let mpu = &report.mpu_sequence;
        writeln!(
            f,
            "- **MPU Sequence Coverage**: {:.1}% (critical order {})\n",
            mpu.coverage_percent,
            if mpu.critical_steps_in_order { "ok" } else { "not confirmed" }
        )
    }

    fn write_key_registers(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Key Register Values")?;
        for k in self.key_registers {
            match k.observed {
                Some((value, verified)) => writeln!(
                    f,
                    "- **{}** ({}): {} {} (expected {})",
                    k.label,
                    k.address,
                    format_hex32(value),
                    if verified { "verified" } else { "not verified" },
                    format_hex32(k.expected)
                )?,
                None => writeln!(f, "- **{}** ({}): not found in sequence", k.label, k.address)?,
            }
        }
        Ok(())
    }
}
