//! brg-catalog
//!
//! Register Catalog for the MIMXRT798S peripherals touched during boot.
//!
//! Architectural decisions:
//! - The catalog is built once from a fixed table of peripheral bases and
//!   register offsets, then indexed by absolute address.
//! - Bit-level diffs are computed from `before XOR after`; changed bits that
//!   no named field covers are still reported as `BIT_n`.
//! - Clock gating is table-driven per peripheral. A peripheral without a rule
//!   (or without evidence in the clock-status capture) is `unknown`, never
//!   a silent `enabled`.
//!
//! Pure deterministic logic. No IO.

mod addr;
mod catalog;
mod gating;
mod mimxrt798s;
mod types;
mod values;

pub use addr::{format_hex, format_hex32, hex32, parse_hex_u32, HexParseError, RegAddr};
pub use catalog::RegisterCatalog;
pub use gating::{ClockGateRule, ClockStatusSnapshot, GateCondition};
pub use mimxrt798s::{
    default_clock_gate_rules, default_expected_final_values, default_known_values,
    mimxrt798s_peripherals,
};
pub use types::*;
pub use values::RegisterValueTable;
