use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ClockGateStatus;

/// Captured values of the clock-control registers, keyed by upper-case
/// register name (e.g. `"PSCCTL2"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockStatusSnapshot {
    values: BTreeMap<String, u32>,
}

impl ClockStatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, register: impl Into<String>, value: u32) {
        self.values.insert(register_key(&register.into()), value);
    }

    pub fn get(&self, register: &str) -> Option<u32> {
        self.values.get(&register_key(register)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for ClockStatusSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut snap = ClockStatusSnapshot::new();
        for (k, v) in iter {
            snap.insert(k, v);
        }
        snap
    }
}

fn register_key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// When the controlling register indicates the peripheral clock is off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gated_when", rename_all = "snake_case")]
pub enum GateCondition {
    /// Gated iff the whole control register reads zero.
    ZeroValue,
    /// Gated iff the given bit of the control register is clear.
    BitClear { bit: u8 },
}

/// Clock-gating rule for one peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockGateRule {
    pub peripheral: String,
    pub control_register: String,
    #[serde(flatten)]
    pub condition: GateCondition,
}

impl ClockGateRule {
    pub fn zero_value(peripheral: &str, control_register: &str) -> Self {
        ClockGateRule {
            peripheral: peripheral.to_string(),
            control_register: control_register.to_string(),
            condition: GateCondition::ZeroValue,
        }
        .normalized()
    }

    pub fn bit_clear(peripheral: &str, control_register: &str, bit: u8) -> Self {
        ClockGateRule {
            peripheral: peripheral.to_string(),
            control_register: control_register.to_string(),
            condition: GateCondition::BitClear { bit },
        }
        .normalized()
    }

    /// Upper-case peripheral and control-register names, matching the catalog
    /// and the clock-status capture keys.
    pub fn normalized(self) -> Self {
        ClockGateRule {
            peripheral: register_key(&self.peripheral),
            control_register: register_key(&self.control_register),
            condition: self.condition,
        }
    }

    /// Missing control-register evidence yields `Unknown`, as does a bit
    /// position outside the 32-bit register.
    pub fn evaluate(&self, status: &ClockStatusSnapshot) -> ClockGateStatus {
        let Some(value) = status.get(&self.control_register) else {
            return ClockGateStatus::Unknown;
        };
        let gated = match self.condition {
            GateCondition::ZeroValue => value == 0,
            GateCondition::BitClear { bit } => match 1u32.checked_shl(u32::from(bit)) {
                Some(mask) => value & mask == 0,
                None => return ClockGateStatus::Unknown,
            },
        };
        if gated {
            ClockGateStatus::Disabled
        } else {
            ClockGateStatus::Enabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_rule() {
        let rule = ClockGateRule::zero_value("IOPCTL2", "PSCCTL2");
        let off: ClockStatusSnapshot = [("PSCCTL2", 0u32)].into_iter().collect();
        let on: ClockStatusSnapshot = [("PSCCTL2", 0x20u32)].into_iter().collect();
        assert_eq!(rule.evaluate(&off), ClockGateStatus::Disabled);
        assert_eq!(rule.evaluate(&on), ClockGateStatus::Enabled);
    }

    #[test]
    fn bit_clear_rule() {
        let rule = ClockGateRule::bit_clear("IOPCTL0", "PSCCTL5", 2);
        let off: ClockStatusSnapshot = [("PSCCTL5", 0x8u32)].into_iter().collect();
        let on: ClockStatusSnapshot = [("PSCCTL5", 0x4u32)].into_iter().collect();
        assert_eq!(rule.evaluate(&off), ClockGateStatus::Disabled);
        assert_eq!(rule.evaluate(&on), ClockGateStatus::Enabled);
    }

    #[test]
    fn missing_control_register_is_unknown() {
        let rule = ClockGateRule::bit_clear("XSPI2", "PSCCTL4", 0);
        let snap: ClockStatusSnapshot = [("PSCCTL2", 0u32)].into_iter().collect();
        assert_eq!(rule.evaluate(&snap), ClockGateStatus::Unknown);
    }

    #[test]
    fn names_match_regardless_of_case() {
        let rule = ClockGateRule::bit_clear("xspi2", "pscctl4", 0);
        assert_eq!(rule.control_register, "PSCCTL4");
        assert_eq!(rule.peripheral, "XSPI2");
        let snap: ClockStatusSnapshot = [(" Pscctl4", 0u32)].into_iter().collect();
        assert_eq!(snap.get("PSCCTL4"), Some(0));
        assert_eq!(rule.evaluate(&snap), ClockGateStatus::Disabled);
    }

    #[test]
    fn bit_outside_register_is_unknown() {
        let rule = ClockGateRule::bit_clear("XSPI2", "PSCCTL4", 32);
        let snap: ClockStatusSnapshot = [("PSCCTL4", 0u32)].into_iter().collect();
        assert_eq!(rule.evaluate(&snap), ClockGateStatus::Unknown);
    }

    #[test]
    fn rule_round_trips_through_yaml_shaped_json() {
        let raw = r#"{"peripheral":"XSPI2","control_register":"PSCCTL4","gated_when":"bit_clear","bit":0}"#;
        let rule: ClockGateRule = serde_json::from_str(raw).unwrap();
        assert_eq!(rule, ClockGateRule::bit_clear("XSPI2", "PSCCTL4", 0));
    }
}
