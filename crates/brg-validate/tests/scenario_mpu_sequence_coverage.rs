//! MPU configuration coverage
//!
//! GREEN when:
//! - all six cache/MPU steps found -> 100 % coverage, critical order holds
//! - cache enabled before the MPU is enabled -> critical order broken
//! - coverage is informational and never fails a check

use brg_catalog::{RegisterCatalog, RegisterValueTable};
use brg_ingest::normalize;
use brg_reconcile::{reconcile, ReconcileInput, ResolveOptions};
use brg_schemas::{CanonicalAccessEntry, CorrectionStatistics, HardwareSnapshot};
use brg_validate::{mpu_sequence_coverage, validate, RecommendationPolicy, ValidationInput};
use serde_json::{json, Value};

fn doc(functions: &[(&str, &str)]) -> Value {
    let items: Vec<Value> = functions
        .iter()
        .enumerate()
        .map(|(i, (addr, func))| {
            json!({
                "address": addr,
                "access_type": "volatile_write",
                "execution_phase": "board_init",
                "instruction_index": i,
                "source_location": {"file": "board.c", "function": func, "line": 100 + i}
            })
        })
        .collect();
    json!({ "chronological_sequence": items })
}

fn entries(functions: &[(&str, &str)]) -> Vec<CanonicalAccessEntry> {
    let cat = RegisterCatalog::mimxrt798s();
    let records = normalize(&doc(functions), &cat, Some("BOARD_ConfigMPU"))
        .unwrap()
        .records;
    reconcile(
        records,
        ReconcileInput {
            hardware: &HardwareSnapshot::empty(),
            known_values: &RegisterValueTable::new(),
            catalog: &cat,
            options: ResolveOptions::default(),
        },
    )
    .entries
}

#[test]
fn full_mpu_setup_is_covered_in_order() {
    let es = entries(&[
        ("0x40033000", "XCACHE_DisableCache"),
        ("0xE000ED94", "ARM_MPU_Disable"),
        ("0xE000EDC0", "ARM_MPU_SetMemAttr"),
        ("0xE000ED9C", "ARM_MPU_SetRegion"),
        ("0xE000ED94", "ARM_MPU_Enable"),
        ("0x40033000", "XCACHE_EnableCache"),
    ]);
    let cov = mpu_sequence_coverage(&es);
    assert_eq!(cov.coverage_percent, 100.0);
    assert!(cov.critical_steps_present);
    assert!(cov.critical_steps_in_order);
    assert_eq!(cov.steps[0].first_sequence_number, Some(1));
}

#[test]
fn cache_enabled_before_mpu_breaks_critical_order() {
    let es = entries(&[
        ("0x40033000", "XCACHE_DisableCache"),
        ("0x40033000", "XCACHE_EnableCache"),
        ("0xE000ED94", "ARM_MPU_Enable"),
    ]);
    let cov = mpu_sequence_coverage(&es);
    assert_eq!(cov.coverage_percent, 50.0);
    assert!(cov.critical_steps_present);
    assert!(!cov.critical_steps_in_order);

    let stats = CorrectionStatistics {
        total_entries: es.len(),
        ..CorrectionStatistics::default()
    };
    let report = validate(ValidationInput {
        entries: &es,
        statistics: &stats,
        expected_final_values: &RegisterValueTable::new(),
        rejected: &[],
        policy: RecommendationPolicy::default(),
    });
    assert!(report.all_checks_passed);
}
