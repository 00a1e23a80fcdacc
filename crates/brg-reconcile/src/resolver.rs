//! Value resolution.
//!
//! Walks the ordered records once, threading a [`RegisterState`] that holds
//! the last known value of every register touched so far. Value priority:
//!
//! - reads: hardware capture (final, else initial), else running state;
//! - writes: final capture, else the known-value table, else a no-op write
//!   of the current value.
//!
//! A value that did not come from a capture is never marked verified.

use std::collections::BTreeMap;

use brg_catalog::{ClockGateStatus, RegAddr, RegisterCatalog, RegisterValueTable};
use brg_schemas::{AccessKind, CanonicalAccessEntry, ExecutionPhase, HardwareSnapshot};
use tracing::debug;

use crate::sequencer::SequencedRecord;

pub const DEFAULT_DATA_WIDTH: u32 = 32;
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Last known value per register.
///
/// Seeded lazily from the catalog reset value, or 0 for uncatalogued
/// addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterState {
    values: BTreeMap<RegAddr, u32>,
}

impl RegisterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: RegAddr) -> Option<u32> {
        self.values.get(&address).copied()
    }

    pub fn current(&mut self, address: RegAddr, catalog: &RegisterCatalog) -> u32 {
        *self
            .values
            .entry(address)
            .or_insert_with(|| catalog.reset_value(address).unwrap_or(0))
    }

    pub fn set(&mut self, address: RegAddr, value: u32) {
        self.values.insert(address, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Where value-after came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Hardware,
    KnownValue,
    RunningState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedValues {
    pub value_before: u32,
    pub value_after: u32,
    pub value_written: Option<u32>,
    pub captured: Option<u32>,
    pub source: ValueSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub estimate_timestamps: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            estimate_timestamps: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub entries: Vec<CanonicalAccessEntry>,
    pub known_value_fallbacks: usize,
    /// Entries whose address had no capture in the snapshot at all.
    pub hardware_data_gaps: usize,
}

/// Resolve one access against the captures and the running state.
/// Only seeds `state` with the reset value on first touch; recording the
/// resolved value is left to the caller.
pub fn resolve_values(
    address: RegAddr,
    kind: AccessKind,
    hardware: &HardwareSnapshot,
    known: &RegisterValueTable,
    catalog: &RegisterCatalog,
    state: &mut RegisterState,
) -> ResolvedValues {
    let current = state.current(address, catalog);

    if kind.is_read() {
        return match hardware.observed_value(address) {
            Some(v) => ResolvedValues {
                value_before: v,
                value_after: v,
                value_written: None,
                captured: Some(v),
                source: ValueSource::Hardware,
            },
            None => ResolvedValues {
                value_before: current,
                value_after: current,
                value_written: None,
                captured: None,
                source: ValueSource::RunningState,
            },
        };
    }

    let (after, captured, source) = if let Some(v) = hardware.final_value(address) {
        (v, Some(v), ValueSource::Hardware)
    } else if let Some(v) = known.get(address) {
        (v, None, ValueSource::KnownValue)
    } else {
        (current, None, ValueSource::RunningState)
    };

    ResolvedValues {
        value_before: current,
        value_after: after,
        value_written: Some(after),
        captured,
        source,
    }
}

/// Estimated position on the boot timeline: phase base plus 0.1 ms per
/// instruction index. Computed in tenths to keep the output stable.
pub fn estimate_timestamp_ms(phase: ExecutionPhase, instruction_index: u64) -> f64 {
    let base_tenths = (phase.timeline_base_ms() * 10.0) as u64;
    base_tenths.saturating_add(instruction_index) as f64 / 10.0
}

pub fn resolve(
    ordered: &[SequencedRecord],
    hardware: &HardwareSnapshot,
    known: &RegisterValueTable,
    catalog: &RegisterCatalog,
    state: &mut RegisterState,
    opts: ResolveOptions,
) -> ResolveOutcome {
    let mut out = ResolveOutcome {
        entries: Vec::with_capacity(ordered.len()),
        ..ResolveOutcome::default()
    };

    for s in ordered {
        let r = &s.record;
        let values = resolve_values(r.address, r.access_kind, hardware, known, catalog, state);
        state.set(r.address, values.value_after);

        match values.source {
            ValueSource::KnownValue => {
                out.known_value_fallbacks += 1;
                debug!(address = %r.address, seq = s.sequence_number, "value from known-value table");
            }
            ValueSource::RunningState if !r.access_kind.is_read() => {
                debug!(
                    address = %r.address,
                    seq = s.sequence_number,
                    "no value source; recorded as no-op write"
                );
            }
            _ => {}
        }
        if hardware.observed_value(r.address).is_none() {
            out.hardware_data_gaps += 1;
        }

        let (peripheral, register) = catalog.labels(r.address);
        let offset = catalog
            .lookup(r.address)
            .map(|d| brg_catalog::format_hex(d.offset));

        out.entries.push(CanonicalAccessEntry {
            sequence_number: s.sequence_number,
            relative_timestamp_estimate_ms: opts
                .estimate_timestamps
                .then(|| estimate_timestamp_ms(r.phase, r.instruction_index)),
            address: r.address,
            peripheral_name: peripheral.to_string(),
            register_name: register.to_string(),
            register_offset_from_base: offset,
            access_type: r.access_kind,
            data_width: r.data_width.unwrap_or(DEFAULT_DATA_WIDTH),
            value_before: values.value_before,
            value_after: values.value_after,
            value_written: values.value_written,
            mask_applied: match r.access_kind {
                AccessKind::ReadModifyWrite => r.mask,
                _ => None,
            },
            bits_modified: Vec::new(),
            execution_phase: r.phase,
            source_file_path: r
                .source
                .file
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            function_name: r
                .source
                .function
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            line_number: r.source_line(),
            call_stack_depth: r.call_stack_depth(),
            hardware_verified: values.source == ValueSource::Hardware,
            j_link_captured_value: values.captured,
            clock_gate_status: ClockGateStatus::Unknown,
            purpose: r.purpose,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use brg_schemas::RawAccessRecord;

    const CLKSEL: RegAddr = RegAddr(0x4000_1434);
    const AHBMATPRIO: RegAddr = RegAddr(0x4002_0030);

    fn seq(records: Vec<RawAccessRecord>) -> Vec<SequencedRecord> {
        crate::sequencer::order(records)
    }

    #[test]
    fn state_seeds_from_reset_value() {
        let cat = RegisterCatalog::mimxrt798s();
        let mut st = RegisterState::new();
        assert_eq!(st.current(AHBMATPRIO, &cat), 0x1C);
        assert_eq!(st.current(RegAddr(0x1234_0000), &cat), 0);
        st.set(AHBMATPRIO, 0x3);
        assert_eq!(st.current(AHBMATPRIO, &cat), 0x3);
        assert_eq!(st.len(), 2);
    }

    #[test]
    fn resolving_seeds_state_but_does_not_record_the_write() {
        let cat = RegisterCatalog::mimxrt798s();
        let known: RegisterValueTable = [(AHBMATPRIO, 0x3u32)].into_iter().collect();
        let mut st = RegisterState::new();

        let v = resolve_values(
            AHBMATPRIO,
            AccessKind::VolatileWrite,
            &HardwareSnapshot::empty(),
            &known,
            &cat,
            &mut st,
        );
        assert_eq!(v.value_after, 0x3);
        assert_eq!(st.get(AHBMATPRIO), Some(0x1C));
    }

    #[test]
    fn read_prefers_final_then_initial_then_state() {
        let cat = RegisterCatalog::mimxrt798s();
        let known = RegisterValueTable::new();
        let mut hw = HardwareSnapshot::empty();
        hw.initial.insert(CLKSEL, 0x1);
        let mut st = RegisterState::new();

        let v = resolve_values(CLKSEL, AccessKind::VolatileRead, &hw, &known, &cat, &mut st);
        assert_eq!((v.value_before, v.value_after, v.captured), (1, 1, Some(1)));
        assert_eq!(v.value_written, None);

        hw.final_values.insert(CLKSEL, 0x3);
        let v = resolve_values(CLKSEL, AccessKind::VolatileRead, &hw, &known, &cat, &mut st);
        assert_eq!(v.value_after, 3);

        let v = resolve_values(AHBMATPRIO, AccessKind::VolatileRead, &hw, &known, &cat, &mut st);
        assert_eq!(v.source, ValueSource::RunningState);
        assert_eq!(v.value_after, 0x1C);
    }

    #[test]
    fn write_without_any_source_is_a_no_op() {
        let cat = RegisterCatalog::mimxrt798s();
        let mut st = RegisterState::new();
        let v = resolve_values(
            AHBMATPRIO,
            AccessKind::VolatileWrite,
            &HardwareSnapshot::empty(),
            &RegisterValueTable::new(),
            &cat,
            &mut st,
        );
        assert_eq!(v.value_before, v.value_after);
        assert_eq!(v.value_written, Some(v.value_before));
        assert_eq!(v.source, ValueSource::RunningState);
    }

    #[test]
    fn state_carries_value_after_to_next_access() {
        let cat = RegisterCatalog::mimxrt798s();
        let known: RegisterValueTable = [(CLKSEL, 0x2u32)].into_iter().collect();
        let mut w = RawAccessRecord::new(CLKSEL, AccessKind::FunctionCallWrite);
        w.phase = ExecutionPhase::BoardInit;
        let mut r = RawAccessRecord::new(CLKSEL, AccessKind::VolatileRead);
        r.phase = ExecutionPhase::DriverInit;

        let mut st = RegisterState::new();
        let out = resolve(
            &seq(vec![w, r]),
            &HardwareSnapshot::empty(),
            &known,
            &cat,
            &mut st,
            ResolveOptions::default(),
        );
        assert_eq!(out.known_value_fallbacks, 1);
        assert_eq!(out.hardware_data_gaps, 2);
        assert_eq!(out.entries[0].value_after, 2);
        assert_eq!(out.entries[1].value_before, 2);
        assert!(!out.entries[1].hardware_verified);
        assert_eq!(st.get(CLKSEL), Some(2));
    }

    #[test]
    fn mask_is_recorded_only_for_read_modify_write() {
        let cat = RegisterCatalog::mimxrt798s();
        let mut rmw = RawAccessRecord::new(CLKSEL, AccessKind::ReadModifyWrite);
        rmw.mask = Some(0x3);
        let mut w = RawAccessRecord::new(CLKSEL, AccessKind::VolatileWrite);
        w.mask = Some(0x3);
        w.source.line = Some(2);

        let out = resolve(
            &seq(vec![rmw, w]),
            &HardwareSnapshot::empty(),
            &RegisterValueTable::new(),
            &cat,
            &mut RegisterState::new(),
            ResolveOptions::default(),
        );
        assert_eq!(out.entries[0].mask_applied, Some(0x3));
        assert_eq!(out.entries[1].mask_applied, None);
    }

    #[test]
    fn entry_defaults_for_sparse_record() {
        let cat = RegisterCatalog::mimxrt798s();
        let rec = RawAccessRecord::new(RegAddr(0x5000_0000), AccessKind::VolatileWrite);
        let out = resolve(
            &seq(vec![rec]),
            &HardwareSnapshot::empty(),
            &RegisterValueTable::new(),
            &cat,
            &mut RegisterState::new(),
            ResolveOptions {
                estimate_timestamps: false,
            },
        );
        let e = &out.entries[0];
        assert_eq!(e.peripheral_name, "UNKNOWN");
        assert_eq!(e.register_name, "UNKNOWN");
        assert_eq!(e.register_offset_from_base, None);
        assert_eq!(e.data_width, 32);
        assert_eq!(e.source_file_path, "unknown");
        assert_eq!(e.function_name, "unknown");
        assert_eq!(e.line_number, 0);
        assert_eq!(e.call_stack_depth, 1);
        assert_eq!(e.relative_timestamp_estimate_ms, None);
    }

    #[test]
    fn timestamp_estimate_by_phase() {
        assert_eq!(estimate_timestamp_ms(ExecutionPhase::BoardInit, 7), 0.7);
        assert_eq!(estimate_timestamp_ms(ExecutionPhase::DriverInit, 0), 50.0);
        assert_eq!(estimate_timestamp_ms(ExecutionPhase::Runtime, 25), 102.5);
        assert_eq!(estimate_timestamp_ms(ExecutionPhase::Unknown, 0), 100.0);
    }
}
