//! Layered YAML configuration for the reconciliation pipeline.
//!
//! Docs are merged in order (earlier = base, later = override), converted
//! to JSON, canonicalised (sorted keys, compact) and hashed with SHA-256.
//! The hash travels with every output document so a result can be traced
//! back to the exact effective configuration.

mod engine;

pub use engine::{
    EngineConfig, InputsConfig, ModuleSource, OutputsConfig, RecommendationThresholds,
    TimestampConfig,
};

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = read_docs(paths)?;
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let merged = merge_yaml_docs(serde_json::json!({}), yaml_docs)?;
    finish(merged)
}

/// Built-in defaults as the base layer, then `paths` in order.
pub fn load_engine_config(paths: &[&str]) -> Result<(EngineConfig, LoadedConfig)> {
    let docs = read_docs(paths)?;
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_engine_config_from_strings(&doc_refs)
}

pub fn load_engine_config_from_strings(yaml_docs: &[&str]) -> Result<(EngineConfig, LoadedConfig)> {
    let base = serde_json::to_value(EngineConfig::default())
        .context("default config serialize failed")?;
    let merged = merge_yaml_docs(base, yaml_docs)?;
    let loaded = finish(merged)?;
    let cfg = EngineConfig::from_json(&loaded.config_json)?;
    Ok((cfg, loaded))
}

fn read_docs(paths: &[&str]) -> Result<Vec<String>> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }
    Ok(docs)
}

fn merge_yaml_docs(base: Value, yaml_docs: &[&str]) -> Result<Value> {
    let mut merged = base;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        // An empty YAML document parses to null; treat it as "no overrides".
        if v_json.is_null() {
            continue;
        }
        merged = deep_merge(merged, v_json);
    }
    Ok(merged)
}

fn finish(merged: Value) -> Result<LoadedConfig> {
    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is BTreeMap-backed here (no preserve_order), so keys
    // serialize sorted.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_overrides_leaves_and_keeps_siblings() {
        let a = serde_json::json!({"outputs": {"summary": "a.md", "validation_report": "r.json"}});
        let b = serde_json::json!({"outputs": {"summary": "b.md"}});
        let m = deep_merge(a, b);
        assert_eq!(m["outputs"]["summary"], "b.md");
        assert_eq!(m["outputs"]["validation_report"], "r.json");
    }

    #[test]
    fn empty_yaml_document_is_no_op() {
        let (cfg, _) = load_engine_config_from_strings(&[""]).unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
