use brg_catalog::{ClockStatusSnapshot, RegAddr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probe-captured register values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    /// Values read before the boot sequence ran.
    pub initial: BTreeMap<RegAddr, u32>,
    /// Values read after the boot sequence completed.
    #[serde(rename = "final")]
    pub final_values: BTreeMap<RegAddr, u32>,
    /// `None` when the capture carried no clock-status map at all.
    pub clock_status: Option<ClockStatusSnapshot>,
}

impl HardwareSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn final_value(&self, address: RegAddr) -> Option<u32> {
        self.final_values.get(&address).copied()
    }

    /// Best available capture for a read: final, else initial.
    pub fn observed_value(&self, address: RegAddr) -> Option<u32> {
        self.final_value(address)
            .or_else(|| self.initial.get(&address).copied())
    }

    pub fn is_empty(&self) -> bool {
        self.initial.is_empty()
            && self.final_values.is_empty()
            && self.clock_status.as_ref().map_or(true, |c| c.is_empty())
    }
}
