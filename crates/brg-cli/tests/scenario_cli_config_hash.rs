//! `bootreg config-hash`
//!
//! GREEN when:
//! - the printed hash is the one the config loader computes for the same files
//! - key order in the YAML does not change the hash

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn prints_loader_hash_and_canonical_json() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.yaml");
    let b = dir.path().join("b.yaml");
    std::fs::write(&a, "timestamps:\n  estimate: false\noutputs:\n  summary: s.md\n")?;
    std::fs::write(&b, "outputs:\n  summary: s.md\ntimestamps:\n  estimate: false\n")?;

    let a_s = a.to_string_lossy().to_string();
    let loaded = brg_config::load_layered_yaml(&[a_s.as_str()])?;

    for path in [&a, &b] {
        Command::cargo_bin("bootreg")?
            .arg("config-hash")
            .arg(path)
            .assert()
            .success()
            .stdout(predicate::str::contains(format!(
                "config_hash={}",
                loaded.config_hash
            )))
            .stdout(predicate::str::contains(loaded.canonical_json.as_str()));
    }
    Ok(())
}
