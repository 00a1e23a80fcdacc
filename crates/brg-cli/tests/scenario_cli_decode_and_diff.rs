//! `bootreg decode` / `bootreg diff`
//!
//! GREEN when:
//! - decode prints the catalog field breakdown as JSON
//! - diff prints field-level changes; identical values print an empty list
//! - an unparseable address is an error

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn bootreg() -> Command {
    Command::cargo_bin("bootreg").expect("bootreg binary")
}

#[test]
fn decode_prints_named_fields() {
    let out = bootreg()
        .args(["decode", "--address", "0x40001434", "--value", "0x2"])
        .output()
        .expect("run bootreg");
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(v["peripheral"], "CLKCTL0");
    assert_eq!(v["register"], "CLKSEL");
    assert_eq!(v["value"], "0x00000002");
    assert!(v["decoded_fields"].as_array().map_or(false, |a| !a.is_empty()));
}

#[test]
fn diff_reports_changes_and_nothing_for_equal_values() {
    let out = bootreg()
        .args(["diff", "--address", "0x40001434", "--before", "0x0", "--after", "0x3"])
        .output()
        .expect("run bootreg");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert!(!v.as_array().expect("array").is_empty());

    bootreg()
        .args(["diff", "--address", "0x40001434", "--before", "0x3", "--after", "0x3"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn bad_address_fails() {
    bootreg()
        .args(["decode", "--address", "0xZZ", "--value", "0x0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid address"));
}
