//! MPU_CTRL final value
//!
//! GREEN when:
//! - without a capture, the last MPU_CTRL write resolves to 0x7
//!   (ENABLE | HFNMIENA | PRIVDEFENA) and the known-value cross-check passes
//! - a captured MPU_CTRL that disagrees with 0x7 is reported as a
//!   known_value_mismatch on the last MPU_CTRL entry

use brg_catalog::{default_expected_final_values, default_known_values, RegAddr, RegisterCatalog};
use brg_ingest::{normalize, parse_hardware_snapshot};
use brg_reconcile::{correction_statistics, reconcile, ReconcileInput, ResolveOptions};
use brg_schemas::{CanonicalAccessEntry, HardwareSnapshot};
use brg_validate::{
    validate, CheckKind, RecommendationPolicy, ValidationInput, ValidationIssue, ValidationReport,
};
use serde_json::{json, Value};

const MPU_CTRL: RegAddr = RegAddr(0xE000_ED94);

fn mpu_config_document() -> Value {
    json!({"chronological_sequence": [
        {
            "address": "0xE000ED94",
            "access_type": "volatile_write",
            "execution_phase": "board_init",
            "instruction_index": 1,
            "source_location": {"file": "board.c", "function": "ARM_MPU_Disable", "line": 212}
        },
        {
            "address": "0xE000ED9C",
            "access_type": "volatile_write",
            "execution_phase": "board_init",
            "instruction_index": 2,
            "source_location": {"file": "board.c", "function": "ARM_MPU_SetRegion", "line": 216}
        },
        {
            "address": "0xE000ED94",
            "access_type": "volatile_write",
            "execution_phase": "board_init",
            "instruction_index": 3,
            "source_location": {"file": "board.c", "function": "ARM_MPU_Enable", "line": 220}
        }
    ]})
}

fn run(hardware: &HardwareSnapshot) -> (Vec<CanonicalAccessEntry>, ValidationReport) {
    let cat = RegisterCatalog::mimxrt798s();
    let records = normalize(&mpu_config_document(), &cat, None).unwrap().records;
    let known = default_known_values();
    let outcome = reconcile(
        records,
        ReconcileInput {
            hardware,
            known_values: &known,
            catalog: &cat,
            options: ResolveOptions::default(),
        },
    );
    let stats = correction_statistics(&outcome, 0, 0);
    let oracle = default_expected_final_values();
    let report = validate(ValidationInput {
        entries: &outcome.entries,
        statistics: &stats,
        expected_final_values: &oracle,
        rejected: &[],
        policy: RecommendationPolicy::default(),
    });
    (outcome.entries, report)
}

fn last_mpu_ctrl(entries: &[CanonicalAccessEntry]) -> &CanonicalAccessEntry {
    entries
        .iter()
        .rev()
        .find(|e| e.address == MPU_CTRL)
        .expect("MPU_CTRL entry")
}

#[test]
fn uncaptured_mpu_enable_resolves_to_known_value() {
    let (entries, report) = run(&HardwareSnapshot::empty());

    let ctrl = last_mpu_ctrl(&entries);
    assert_eq!(ctrl.function_name, "ARM_MPU_Enable");
    assert_eq!(ctrl.value_after, 0x7);
    assert_eq!(ctrl.value_written, Some(0x7));
    assert!(!ctrl.hardware_verified);

    let check = report.check(CheckKind::KnownValueCrossCheck).unwrap();
    assert!(check.passed);
}

#[test]
fn captured_mpu_ctrl_mismatch_is_reported() {
    let cat = RegisterCatalog::mimxrt798s();
    let capture = json!({"final": {"0xE000ED94": "0x00000001"}});
    let hardware = parse_hardware_snapshot(&capture, &cat).unwrap().snapshot;
    let (entries, report) = run(&hardware);

    let ctrl = last_mpu_ctrl(&entries);
    assert_eq!(ctrl.value_after, 0x1);
    assert!(ctrl.hardware_verified);

    let check = report.check(CheckKind::KnownValueCrossCheck).unwrap();
    assert!(!check.passed);
    let issues: Vec<&ValidationIssue> = report.issues_of(CheckKind::KnownValueCrossCheck).collect();
    assert_eq!(issues.len(), 1);
    match issues[0] {
        ValidationIssue::KnownValueMismatch {
            sequence_number,
            address,
            expected,
            actual,
            ..
        } => {
            assert_eq!(*sequence_number, ctrl.sequence_number);
            assert_eq!(*address, MPU_CTRL);
            assert_eq!(*expected, 0x7);
            assert_eq!(*actual, 0x1);
        }
        other => panic!("unexpected issue {other:?}"),
    }
}
