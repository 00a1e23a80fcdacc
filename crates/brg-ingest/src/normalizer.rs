//! Static-analysis document normalization.
//!
//! Converts either producer shape into [`RawAccessRecord`]s:
//! - flat: `{"chronological_sequence": [record, ...]}` (or a bare array)
//! - grouped: `{"peripheral_accesses": [{"peripheral_name", "accesses": [record, ...]}]}`
//!
//! A record that cannot be normalized is rejected on its own; the rest of
//! the batch continues. Only an unrecognised document shape fails the whole
//! document.
//!
//! This module does **not**:
//! - read files
//! - deduplicate (see `dedupe.rs`)
//! - order records

use std::fmt;

use brg_catalog::{parse_hex_u32, HexParseError, RegAddr, RegisterCatalog};
use brg_schemas::{
    AccessKind, AccessPurpose, ExecutionPhase, RawAccessRecord, SourceLocation,
    UNKNOWN_CALL_STACK,
};
use serde_json::{Map, Value};
use tracing::warn;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while normalizing producer documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormatError {
    /// The document is neither the flat nor the grouped shape.
    UnrecognizedShape,
    /// A record (or group) is not a JSON object.
    NotAnObject,
    /// A peripheral group has no `accesses` array.
    MalformedGroup,
    MissingAddress,
    InvalidAddress { raw: String, reason: HexParseError },
    MissingAccessKind,
    UnknownAccessKind { raw: String },
    /// A captured value could not be parsed.
    InvalidValue { raw: String, reason: HexParseError },
}

impl fmt::Display for InputFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormatError::UnrecognizedShape => {
                write!(f, "unrecognized document shape")
            }
            InputFormatError::NotAnObject => write!(f, "entry is not a JSON object"),
            InputFormatError::MalformedGroup => {
                write!(f, "peripheral group has no 'accesses' array")
            }
            InputFormatError::MissingAddress => write!(f, "address is missing"),
            InputFormatError::InvalidAddress { raw, reason } => {
                write!(f, "address '{raw}' is not a 32-bit address: {reason}")
            }
            InputFormatError::MissingAccessKind => write!(f, "access_type is missing"),
            InputFormatError::UnknownAccessKind { raw } => {
                write!(f, "unknown access_type '{raw}'")
            }
            InputFormatError::InvalidValue { raw, reason } => {
                write!(f, "value '{raw}' is not a 32-bit value: {reason}")
            }
        }
    }
}

impl std::error::Error for InputFormatError {}

/// A single entry that was skipped, with a JSON-path-like location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub location: String,
    pub error: InputFormatError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOutcome {
    pub records: Vec<RawAccessRecord>,
    pub rejected: Vec<RejectedRecord>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize one static-analysis document.
///
/// `module` tags every record with the firmware module it came from. The
/// catalog fills in peripheral/register names the producer left out.
pub fn normalize(
    document: &Value,
    catalog: &RegisterCatalog,
    module: Option<&str>,
) -> Result<NormalizeOutcome, InputFormatError> {
    let mut out = NormalizeOutcome::default();

    match document {
        Value::Array(items) => {
            normalize_list(items, "", None, catalog, module, &mut out);
        }
        Value::Object(doc) => {
            if let Some(Value::Array(items)) = doc.get("chronological_sequence") {
                normalize_list(items, "chronological_sequence", None, catalog, module, &mut out);
            } else if let Some(Value::Array(groups)) = doc.get("peripheral_accesses") {
                for (gi, group) in groups.iter().enumerate() {
                    let location = format!("peripheral_accesses[{gi}]");
                    let Some(g) = group.as_object() else {
                        reject(&mut out, location, InputFormatError::NotAnObject);
                        continue;
                    };
                    let Some(Value::Array(items)) = g.get("accesses") else {
                        reject(&mut out, location, InputFormatError::MalformedGroup);
                        continue;
                    };
                    let group_peripheral = str_field(g, &["peripheral_name", "peripheral"]);
                    normalize_list(
                        items,
                        &format!("{location}.accesses"),
                        group_peripheral.as_deref(),
                        catalog,
                        module,
                        &mut out,
                    );
                }
            } else {
                return Err(InputFormatError::UnrecognizedShape);
            }
        }
        _ => return Err(InputFormatError::UnrecognizedShape),
    }

    Ok(out)
}

fn normalize_list(
    items: &[Value],
    path: &str,
    group_peripheral: Option<&str>,
    catalog: &RegisterCatalog,
    module: Option<&str>,
    out: &mut NormalizeOutcome,
) {
    for (i, item) in items.iter().enumerate() {
        match normalize_record(item, group_peripheral, catalog, module) {
            Ok(r) => out.records.push(r),
            Err(e) => reject(out, format!("{path}[{i}]"), e),
        }
    }
}

fn reject(out: &mut NormalizeOutcome, location: String, error: InputFormatError) {
    warn!(%location, %error, "skipping malformed access record");
    out.rejected.push(RejectedRecord { location, error });
}

/// Normalize one producer record.
pub fn normalize_record(
    item: &Value,
    group_peripheral: Option<&str>,
    catalog: &RegisterCatalog,
    module: Option<&str>,
) -> Result<RawAccessRecord, InputFormatError> {
    let obj = item.as_object().ok_or(InputFormatError::NotAnObject)?;

    let address = parse_address(obj.get("address"))?;

    let access_raw = str_field(obj, &["access_type", "access_kind"])
        .ok_or(InputFormatError::MissingAccessKind)?;
    let access_kind = AccessKind::parse(&access_raw)
        .ok_or(InputFormatError::UnknownAccessKind { raw: access_raw })?;

    let mut rec = RawAccessRecord::new(address, access_kind);

    rec.peripheral_name = str_field(obj, &["peripheral_name", "peripheral"])
        .or_else(|| group_peripheral.map(str::to_string));
    rec.register_name = str_field(obj, &["register_name", "register"]);
    if let Some(def) = catalog.lookup(address) {
        if rec.peripheral_name.is_none() {
            rec.peripheral_name = Some(def.peripheral.clone());
        }
        if rec.register_name.is_none() {
            rec.register_name = Some(def.name.clone());
        }
    }

    rec.source = source_location(obj);
    rec.call_stack = call_stack(obj.get("call_stack"));
    rec.phase = str_field(obj, &["execution_phase"])
        .map(|p| ExecutionPhase::parse(&p))
        .unwrap_or(ExecutionPhase::Unknown);
    rec.execution_context = str_field(obj, &["execution_context"]);
    rec.instruction_index = u64_field(obj, &["instruction_index", "sequence_number"]).unwrap_or(0);
    rec.data_width =
        u64_field(obj, &["data_size", "data_width"]).and_then(|v| u32::try_from(v).ok());
    rec.bits_modified_present = match obj.get("bits_modified") {
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        _ => false,
    };
    rec.mask = obj.get("mask").and_then(|v| parse_u32_value(v).ok());
    rec.purpose = AccessPurpose::infer(
        rec.source.function.as_deref(),
        str_field(obj, &["purpose"]).as_deref(),
    );
    rec.module = module.map(str::to_string);

    Ok(rec)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Addresses arrive as hex strings (with or without `0x`) or JSON integers.
pub fn parse_address(v: Option<&Value>) -> Result<RegAddr, InputFormatError> {
    match v {
        None | Some(Value::Null) => Err(InputFormatError::MissingAddress),
        Some(Value::String(s)) => parse_hex_u32(s)
            .map(RegAddr)
            .map_err(|reason| InputFormatError::InvalidAddress {
                raw: s.clone(),
                reason,
            }),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(RegAddr)
            .ok_or_else(|| InputFormatError::InvalidAddress {
                raw: n.to_string(),
                reason: HexParseError::OutOfRange { raw: n.to_string() },
            }),
        Some(other) => Err(InputFormatError::InvalidAddress {
            raw: other.to_string(),
            reason: HexParseError::InvalidDigits {
                raw: other.to_string(),
            },
        }),
    }
}

/// Register values arrive as hex strings, JSON integers, or `{"value": …}`.
pub fn parse_u32_value(v: &Value) -> Result<u32, InputFormatError> {
    match v {
        Value::String(s) => parse_hex_u32(s).map_err(|reason| InputFormatError::InvalidValue {
            raw: s.clone(),
            reason,
        }),
        Value::Number(n) => n
            .as_u64()
            .and_then(|x| u32::try_from(x).ok())
            .ok_or_else(|| InputFormatError::InvalidValue {
                raw: n.to_string(),
                reason: HexParseError::OutOfRange { raw: n.to_string() },
            }),
        Value::Object(o) => match o.get("value") {
            Some(inner) => parse_u32_value(inner),
            None => Err(InputFormatError::InvalidValue {
                raw: v.to_string(),
                reason: HexParseError::Empty,
            }),
        },
        other => Err(InputFormatError::InvalidValue {
            raw: other.to_string(),
            reason: HexParseError::InvalidDigits {
                raw: other.to_string(),
            },
        }),
    }
}

pub(crate) fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn u64_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().filter_map(|k| obj.get(*k)).find_map(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn source_location(obj: &Map<String, Value>) -> SourceLocation {
    let nested = obj.get("source_location").and_then(|v| v.as_object());
    let line_of = |o: &Map<String, Value>, keys: &[&str]| {
        u64_field(o, keys).and_then(|v| u32::try_from(v).ok())
    };

    match nested {
        Some(loc) => SourceLocation {
            file: str_field(loc, &["file", "file_name", "file_path"]),
            function: str_field(loc, &["function", "function_name"]),
            line: line_of(loc, &["line", "line_number"]),
        },
        None => SourceLocation {
            file: str_field(obj, &["file_name", "source_file", "file"]),
            function: str_field(obj, &["function_name", "function"]),
            line: line_of(obj, &["line_number", "line"]),
        },
    }
}

fn call_stack(v: Option<&Value>) -> String {
    let joined = match v {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(frames)) => frames
            .iter()
            .filter_map(|f| f.as_str())
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join("->"),
        _ => String::new(),
    };
    if joined.is_empty() {
        UNKNOWN_CALL_STACK.to_string()
    } else {
        joined
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cat() -> RegisterCatalog {
        RegisterCatalog::mimxrt798s()
    }

    #[test]
    fn flat_and_grouped_shapes_produce_identical_records() {
        let flat = json!({"chronological_sequence": [{
            "address": "0x40001434",
            "peripheral_name": "CLKCTL0",
            "register_name": "CLKSEL",
            "access_type": "function_call_write",
            "execution_phase": "board_init",
            "source_location": {"file": "clock_config.c", "function": "BOARD_BootClockRUN", "line": 120},
            "call_stack": "main->BOARD_BootClockRUN",
            "instruction_index": 7,
            "data_size": 32
        }]});
        let grouped = json!({"peripheral_accesses": [{
            "peripheral_name": "CLKCTL0",
            "base_address": "0x40001000",
            "accesses": [{
                "address": "40001434",
                "register_name": "CLKSEL",
                "access_type": "function_call_write",
                "execution_phase": "board_init",
                "file_name": "clock_config.c",
                "function_name": "BOARD_BootClockRUN",
                "line_number": 120,
                "call_stack": ["main", "BOARD_BootClockRUN"],
                "instruction_index": 7,
                "data_size": 32
            }]
        }]});

        let a = normalize(&flat, &cat(), None).unwrap();
        let b = normalize(&grouped, &cat(), None).unwrap();
        assert!(a.rejected.is_empty());
        assert!(b.rejected.is_empty());
        assert_eq!(a.records, b.records);
        assert_eq!(a.records[0].address, RegAddr(0x4000_1434));
        assert_eq!(a.records[0].purpose, AccessPurpose::ClockControl);
    }

    #[test]
    fn missing_optional_fields_get_sentinels() {
        let doc = json!({"chronological_sequence": [{
            "address": "0x40020030",
            "access_type": "volatile_write"
        }]});
        let out = normalize(&doc, &cat(), Some("BOARD_InitHardware")).unwrap();
        let r = &out.records[0];
        assert_eq!(r.call_stack, "UNKNOWN");
        assert_eq!(r.instruction_index, 0);
        assert_eq!(r.phase, ExecutionPhase::Unknown);
        // Filled from the catalog.
        assert_eq!(r.peripheral_name.as_deref(), Some("SYSCON0"));
        assert_eq!(r.register_name.as_deref(), Some("AHBMATPRIO"));
        assert_eq!(r.module.as_deref(), Some("BOARD_InitHardware"));
    }

    #[test]
    fn integer_addresses_are_accepted() {
        let doc = json!([{"address": 1073746996u64, "access_type": "read"}]);
        let out = normalize(&doc, &cat(), None).unwrap();
        assert_eq!(out.records[0].address, RegAddr(0x4000_1434));
        assert_eq!(out.records[0].access_kind, AccessKind::VolatileRead);
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let doc = json!({"chronological_sequence": [
            {"address": "0xNOTHEX", "access_type": "volatile_read"},
            {"address": "0x1FFFFFFFF", "access_type": "volatile_read"},
            {"access_type": "volatile_read"},
            {"address": "0x40001434", "access_type": "teleport"},
            {"address": "0x40001434"},
            "not an object",
            {"address": "0x40001434", "access_type": "volatile_read"}
        ]});
        let out = normalize(&doc, &cat(), None).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected.len(), 6);
        assert_eq!(out.rejected[0].location, "chronological_sequence[0]");
        assert!(matches!(
            out.rejected[1].error,
            InputFormatError::InvalidAddress { .. }
        ));
        assert_eq!(out.rejected[2].error, InputFormatError::MissingAddress);
        assert!(matches!(
            out.rejected[3].error,
            InputFormatError::UnknownAccessKind { .. }
        ));
        assert_eq!(out.rejected[4].error, InputFormatError::MissingAccessKind);
        assert_eq!(out.rejected[5].error, InputFormatError::NotAnObject);
    }

    #[test]
    fn malformed_group_is_rejected_others_kept() {
        let doc = json!({"peripheral_accesses": [
            {"peripheral_name": "XSPI2"},
            {"peripheral_name": "XSPI2", "accesses": [
                {"address": "0x40411000", "access_type": "write"}
            ]}
        ]});
        let out = normalize(&doc, &cat(), None).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.rejected[0].location, "peripheral_accesses[0]");
        assert_eq!(out.rejected[0].error, InputFormatError::MalformedGroup);
    }

    #[test]
    fn unrecognized_shape_fails_document() {
        let err = normalize(&json!({"something_else": []}), &cat(), None).unwrap_err();
        assert_eq!(err, InputFormatError::UnrecognizedShape);
        assert!(normalize(&json!("text"), &cat(), None).is_err());
    }

    #[test]
    fn unknown_address_keeps_producer_labels_absent() {
        let doc = json!([{"address": "0x50000000", "access_type": "volatile_write"}]);
        let out = normalize(&doc, &cat(), None).unwrap();
        assert_eq!(out.records[0].peripheral_name, None);
        assert_eq!(out.records[0].register_name, None);
    }

    #[test]
    fn mask_and_bits_modified_flags() {
        let doc = json!([{
            "address": "0x40001434",
            "access_type": "read-modify-write",
            "mask": "0x7",
            "bits_modified": ["SEL"]
        }]);
        let out = normalize(&doc, &cat(), None).unwrap();
        let r = &out.records[0];
        assert_eq!(r.access_kind, AccessKind::ReadModifyWrite);
        assert_eq!(r.mask, Some(7));
        assert!(r.bits_modified_present);
    }

    #[test]
    fn error_display() {
        let e = InputFormatError::UnknownAccessKind {
            raw: "teleport".to_string(),
        };
        assert_eq!(e.to_string(), "unknown access_type 'teleport'");
        assert_eq!(
            InputFormatError::UnrecognizedShape.to_string(),
            "unrecognized document shape"
        );
    }
}
