//! Run artifacts on disk
//!
//! GREEN when:
//! - all three files are written, creating the output directory
//! - JSON files are pretty-printed and end with a newline
//! - the corrected sequence reads back into the same document
//! - the summary lists key registers and the generated files

use brg_artifacts::{
    read_corrected_sequence, render_summary, write_artifacts, ArtifactPaths, KeyRegister,
    SummaryInput, ValidationReportDocument, WriteArtifactsArgs,
};
use brg_catalog::{
    default_expected_final_values, ClockGateStatus, RegAddr, RegisterCatalog,
};
use brg_schemas::{
    AccessKind, AccessPurpose, CanonicalAccessEntry, CorrectedSequenceDocument,
    CorrectionStatistics, ExecutionPhase,
};
use brg_validate::{validate, RecommendationPolicy, ValidationInput};
use chrono::{TimeZone, Utc};

fn clksel_entry() -> CanonicalAccessEntry {
    CanonicalAccessEntry {
        sequence_number: 1,
        relative_timestamp_estimate_ms: Some(0.0),
        address: RegAddr(0x4000_1434),
        peripheral_name: "CLKCTL0".to_string(),
        register_name: "CLKSEL".to_string(),
        register_offset_from_base: Some("0x434".to_string()),
        access_type: AccessKind::FunctionCallWrite,
        data_width: 32,
        value_before: 0,
        value_after: 0,
        value_written: Some(0),
        mask_applied: None,
        bits_modified: Vec::new(),
        execution_phase: ExecutionPhase::BoardInit,
        source_file_path: "clock_config.c".to_string(),
        function_name: "BOARD_BootClockRUN".to_string(),
        line_number: 10,
        call_stack_depth: 1,
        hardware_verified: false,
        j_link_captured_value: None,
        clock_gate_status: ClockGateStatus::Unknown,
        purpose: AccessPurpose::Unspecified,
    }
}

#[test]
fn writes_all_three_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("nested");
    let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

    let entries = vec![clksel_entry()];
    let stats = CorrectionStatistics {
        total_entries: 1,
        ..CorrectionStatistics::default()
    };
    let oracle = default_expected_final_values();
    let report = validate(ValidationInput {
        entries: &entries,
        statistics: &stats,
        expected_final_values: &oracle,
        rejected: &[],
        policy: RecommendationPolicy::default(),
    });
    // CLKSEL ends at 0x0, oracle expects 0x2.
    assert!(!report.all_checks_passed);

    let sequence = CorrectedSequenceDocument {
        total_accesses: 1,
        correction_timestamp: ts,
        config_hash: "abc".to_string(),
        statistics: stats.clone(),
        chronological_sequence: entries.clone(),
    };
    let report_doc = ValidationReportDocument {
        validation_timestamp: ts,
        config_hash: "abc".to_string(),
        report: report.clone(),
    };
    let paths = ArtifactPaths::in_dir(&out_dir, "seq.json", "report.json", "summary.md");
    let files = paths.file_names();
    let keys = KeyRegister::collect(&entries, &oracle, &RegisterCatalog::mimxrt798s());
    let summary = SummaryInput {
        correction_timestamp: ts,
        report: &report,
        key_registers: &keys,
        files: &files,
    };

    write_artifacts(WriteArtifactsArgs {
        paths: &paths,
        sequence: &sequence,
        report: &report_doc,
        summary: &summary,
    })
    .unwrap();

    let raw = std::fs::read_to_string(&paths.corrected_sequence).unwrap();
    assert!(raw.ends_with("}\n"));
    assert!(raw.contains("\n  \"total_accesses\": 1"));
    assert_eq!(read_corrected_sequence(&paths.corrected_sequence).unwrap(), sequence);

    let report_json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.validation_report).unwrap()).unwrap();
    assert_eq!(report_json["all_checks_passed"], false);
    assert_eq!(report_json["config_hash"], "abc");
    assert_eq!(report_json["validation_issues"][0]["type"], "known_value_mismatch");

    let md = std::fs::read_to_string(&paths.summary).unwrap();
    assert_eq!(md, render_summary(&summary));
    assert!(md.starts_with("# Boot Register Sequence Summary\n\n## Overview\n"));
    let sections: Vec<usize> = [
        "## Correction Statistics",
        "## Validation Results",
        "## Key Register Values",
        "## Recommendations",
        "## Files Generated",
    ]
    .iter()
    .map(|h| md.find(h).expect("section present"))
    .collect();
    assert!(sections.windows(2).all(|w| w[0] < w[1]));
    assert!(md.ends_with("- `summary.md`\n"));
    assert!(md.contains(
        "**CLKCTL0_CLKSEL** (0x40001434): 0x00000000 not verified (expected 0x00000002)"
    ));
    assert!(md.contains("**XSPI2_MCR** (0x40411000): not found in sequence"));
    assert!(md.contains("- `seq.json`"));
    assert!(md.contains("2025-01-02 03:04:05 UTC"));
}
