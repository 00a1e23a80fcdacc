//! Clock-gate classification of each accessed register.

use brg_catalog::{ClockGateStatus, ClockStatusSnapshot, RegAddr, RegisterCatalog};
use brg_schemas::CanonicalAccessEntry;

/// `Unknown` whenever there is nothing to judge by: no clock-status capture,
/// an uncatalogued address, no rule for the peripheral, or a rule whose
/// control register was not captured.
pub fn classify(
    address: RegAddr,
    clock_status: Option<&ClockStatusSnapshot>,
    catalog: &RegisterCatalog,
) -> ClockGateStatus {
    catalog.clock_gate_status(address, clock_status)
}

/// Classify every entry in place; returns the number found `Disabled`.
pub fn classify_all(
    entries: &mut [CanonicalAccessEntry],
    clock_status: Option<&ClockStatusSnapshot>,
    catalog: &RegisterCatalog,
) -> usize {
    let mut gated = 0;
    for e in entries.iter_mut() {
        e.clock_gate_status = classify(e.address, clock_status, catalog);
        if e.clock_gate_status == ClockGateStatus::Disabled {
            gated += 1;
        }
    }
    gated
}
