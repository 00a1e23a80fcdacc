//! Bit-change analysis. Runs after value resolution.

use brg_catalog::RegisterCatalog;
use brg_schemas::CanonicalAccessEntry;

/// Fill `bits_modified` from the resolved before/after pair.
///
/// The reported changes cover exactly `value_before ^ value_after`; an
/// unchanged value yields an empty list.
pub fn analyze(entry: &mut CanonicalAccessEntry, catalog: &RegisterCatalog) {
    entry.bits_modified = catalog.diff(entry.address, entry.value_before, entry.value_after);
}

pub fn analyze_all(entries: &mut [CanonicalAccessEntry], catalog: &RegisterCatalog) -> usize {
    let mut populated = 0;
    for e in entries.iter_mut() {
        analyze(e, catalog);
        if !e.bits_modified.is_empty() {
            populated += 1;
        }
    }
    populated
}
