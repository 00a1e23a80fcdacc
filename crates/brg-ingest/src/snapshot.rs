//! Hardware snapshot parsing.
//!
//! Accepts the probe collaborator's capture document:
//!
//! ```json
//! {
//!   "initial": {"0x40001434": "0x00000000"},
//!   "final":   {"1073746996": {"value": "0x00000002"}},
//!   "clock_status": {"PSCCTL2": {"value": "0x00000000"}},
//!   "registers": [{"peripheral": "CLKCTL0", "register": "CLKSEL", "value": "0x2"}]
//! }
//! ```
//!
//! Captures marked `"success": false` are treated as missing.

use brg_catalog::{ClockStatusSnapshot, HexParseError, RegAddr, RegisterCatalog};
use brg_schemas::HardwareSnapshot;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::normalizer::{
    parse_address, parse_u32_value, str_field, InputFormatError, RejectedRecord,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub snapshot: HardwareSnapshot,
    pub rejected: Vec<RejectedRecord>,
}

const SNAPSHOT_KEYS: &[&str] = &["initial", "final", "clock_status", "registers"];

pub fn parse_hardware_snapshot(
    document: &Value,
    catalog: &RegisterCatalog,
) -> Result<SnapshotOutcome, InputFormatError> {
    let doc = document
        .as_object()
        .ok_or(InputFormatError::UnrecognizedShape)?;
    if !SNAPSHOT_KEYS.iter().any(|k| doc.contains_key(*k)) {
        return Err(InputFormatError::UnrecognizedShape);
    }

    let mut out = SnapshotOutcome::default();

    if let Some(v) = doc.get("initial") {
        out.snapshot.initial = value_map(v, "initial", &mut out.rejected);
    }
    if let Some(v) = doc.get("final") {
        out.snapshot.final_values = value_map(v, "final", &mut out.rejected);
    }
    if let Some(v) = doc.get("clock_status") {
        out.snapshot.clock_status = Some(clock_status(v, &mut out.rejected));
    }
    if let Some(Value::Array(items)) = doc.get("registers") {
        for (i, item) in items.iter().enumerate() {
            let location = format!("registers[{i}]");
            match named_capture(item, catalog) {
                Ok(Some((addr, value))) => {
                    out.snapshot.final_values.insert(addr, value);
                }
                Ok(None) => debug!(%location, "capture not successful; ignored"),
                Err(error) => reject(&mut out.rejected, location, error),
            }
        }
    }

    Ok(out)
}

fn reject(rejected: &mut Vec<RejectedRecord>, location: String, error: InputFormatError) {
    warn!(%location, %error, "skipping malformed hardware capture");
    rejected.push(RejectedRecord { location, error });
}

fn captured(v: &Value) -> bool {
    v.as_object()
        .and_then(|o| o.get("success"))
        .and_then(|s| s.as_bool())
        .unwrap_or(true)
}

fn value_map(
    v: &Value,
    section: &str,
    rejected: &mut Vec<RejectedRecord>,
) -> BTreeMap<RegAddr, u32> {
    let mut out = BTreeMap::new();
    let Some(map) = v.as_object() else {
        reject(rejected, section.to_string(), InputFormatError::NotAnObject);
        return out;
    };
    for (key, raw) in map {
        let location = format!("{section}[{key}]");
        if !captured(raw) {
            continue;
        }
        let addr = match RegAddr::parse_key(key) {
            Ok(a) => a,
            Err(reason) => {
                reject(
                    rejected,
                    location,
                    InputFormatError::InvalidAddress {
                        raw: key.clone(),
                        reason,
                    },
                );
                continue;
            }
        };
        match parse_u32_value(raw) {
            Ok(value) => {
                out.insert(addr, value);
            }
            Err(e) => reject(rejected, location, e),
        }
    }
    out
}

fn clock_status(v: &Value, rejected: &mut Vec<RejectedRecord>) -> ClockStatusSnapshot {
    let mut snap = ClockStatusSnapshot::new();
    let Some(map) = v.as_object() else {
        reject(rejected, "clock_status".to_string(), InputFormatError::NotAnObject);
        return snap;
    };
    for (name, raw) in map {
        if !captured(raw) {
            continue;
        }
        match parse_u32_value(raw) {
            Ok(value) => snap.insert(name.as_str(), value),
            Err(e) => reject(rejected, format!("clock_status[{name}]"), e),
        }
    }
    snap
}

/// `{peripheral, register, address?, value}`; the address is resolved
/// through the catalog when only names are given.
fn named_capture(
    item: &Value,
    catalog: &RegisterCatalog,
) -> Result<Option<(RegAddr, u32)>, InputFormatError> {
    let obj: &Map<String, Value> = item.as_object().ok_or(InputFormatError::NotAnObject)?;
    if !captured(item) {
        return Ok(None);
    }

    let addr = match obj.get("address") {
        Some(Value::Null) | None => {
            let peripheral = str_field(obj, &["peripheral", "peripheral_name"]);
            let register = str_field(obj, &["register", "register_name"]);
            match (peripheral, register) {
                (Some(p), Some(r)) => catalog
                    .find_by_name(&p, &r)
                    .map(|d| d.address)
                    .ok_or(InputFormatError::MissingAddress)?,
                _ => return Err(InputFormatError::MissingAddress),
            }
        }
        Some(v) => parse_address(Some(v))?,
    };

    let raw = obj
        .get("value")
        .ok_or_else(|| InputFormatError::InvalidValue {
            raw: item.to_string(),
            reason: HexParseError::Empty,
        })?;
    let value = parse_u32_value(raw)?;
    Ok(Some((addr, value)))
}
