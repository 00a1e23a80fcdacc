use std::collections::{BTreeMap, HashMap};

use crate::addr::{format_hex, RegAddr};
use crate::gating::{ClockGateRule, ClockStatusSnapshot};
use crate::mimxrt798s::{default_clock_gate_rules, mimxrt798s_peripherals};
use crate::types::{
    BitChange, ClockGateStatus, DecodedField, DecodedRegister, PeripheralDefinition,
    RegisterDefinition, UNKNOWN_LABEL,
};

/// Address-indexed register catalog plus the clock-gating rule table.
#[derive(Debug, Clone)]
pub struct RegisterCatalog {
    peripherals: Vec<PeripheralDefinition>,
    /// address -> (peripheral index, register index)
    index: HashMap<RegAddr, (usize, usize)>,
    gate_rules: BTreeMap<String, ClockGateRule>,
}

impl RegisterCatalog {
    /// Build the index. When two registers share an address the first one
    /// in table order wins.
    pub fn new(peripherals: Vec<PeripheralDefinition>, rules: Vec<ClockGateRule>) -> Self {
        let mut index = HashMap::new();
        for (pi, p) in peripherals.iter().enumerate() {
            for (ri, r) in p.registers.iter().enumerate() {
                index.entry(r.address).or_insert((pi, ri));
            }
        }
        let gate_rules = rules
            .into_iter()
            .map(ClockGateRule::normalized)
            .map(|r| (r.peripheral.clone(), r))
            .collect();
        RegisterCatalog {
            peripherals,
            index,
            gate_rules,
        }
    }

    /// The built-in MIMXRT798S tables.
    pub fn mimxrt798s() -> Self {
        Self::new(mimxrt798s_peripherals(), default_clock_gate_rules())
    }

    /// Replace the clock-gating rule table.
    pub fn with_clock_gate_rules(mut self, rules: Vec<ClockGateRule>) -> Self {
        self.gate_rules = rules
            .into_iter()
            .map(ClockGateRule::normalized)
            .map(|r| (r.peripheral.clone(), r))
            .collect();
        self
    }

    pub fn peripherals(&self) -> &[PeripheralDefinition] {
        &self.peripherals
    }

    pub fn register_count(&self) -> usize {
        self.index.len()
    }

    pub fn lookup(&self, address: RegAddr) -> Option<&RegisterDefinition> {
        let (pi, ri) = *self.index.get(&address)?;
        self.peripherals.get(pi)?.registers.get(ri)
    }

    /// Case-insensitive lookup by `(peripheral, register)` name.
    pub fn find_by_name(&self, peripheral: &str, register: &str) -> Option<&RegisterDefinition> {
        self.peripherals
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(peripheral))
            .flat_map(|p| p.registers.iter())
            .find(|r| r.name.eq_ignore_ascii_case(register))
    }

    pub fn contains(&self, address: RegAddr) -> bool {
        self.index.contains_key(&address)
    }

    /// `(peripheral, register)` labels, `UNKNOWN` for addresses outside the table.
    pub fn labels(&self, address: RegAddr) -> (&str, &str) {
        match self.lookup(address) {
            Some(r) => (r.peripheral.as_str(), r.name.as_str()),
            None => (UNKNOWN_LABEL, UNKNOWN_LABEL),
        }
    }

    pub fn reset_value(&self, address: RegAddr) -> Option<u32> {
        self.lookup(address).map(|r| r.reset_value)
    }

    pub fn clock_gate_rule(&self, peripheral: &str) -> Option<&ClockGateRule> {
        self.gate_rules.get(peripheral)
    }

    /// Named-field breakdown of `value` at `address`.
    pub fn decode(&self, address: RegAddr, value: u32) -> DecodedRegister {
        match self.lookup(address) {
            Some(def) => DecodedRegister {
                address,
                value,
                peripheral: def.peripheral.clone(),
                register: def.name.clone(),
                description: def.description.clone(),
                decoded_fields: def
                    .fields
                    .iter()
                    .map(|f| {
                        let v = f.extract(value);
                        DecodedField {
                            name: f.name.clone(),
                            value: v,
                            hex: format_hex(v),
                            bit_position: f.position,
                            bit_width: f.width,
                            description: f.description.clone(),
                        }
                    })
                    .collect(),
            },
            None => DecodedRegister {
                address,
                value,
                peripheral: UNKNOWN_LABEL.to_string(),
                register: UNKNOWN_LABEL.to_string(),
                description: "Register not in catalog".to_string(),
                decoded_fields: Vec::new(),
            },
        }
    }

    /// Field-level changes between `before` and `after`.
    ///
    /// Empty iff `before == after`. Fields come in definition order; changed
    /// bits outside every defined field follow as single-bit `BIT_n`
    /// entries in ascending bit order.
    pub fn diff(&self, address: RegAddr, before: u32, after: u32) -> Vec<BitChange> {
        let changed = before ^ after;
        if changed == 0 {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut covered = 0u32;

        if let Some(def) = self.lookup(address) {
            for f in &def.fields {
                let mask = f.mask();
                covered |= mask;
                if changed & mask == 0 {
                    continue;
                }
                out.push(BitChange {
                    bit_field_name: f.name.clone(),
                    bit_position: f.position,
                    bit_width: f.width,
                    value_before: f.extract(before),
                    value_after: f.extract(after),
                    description: f.description.clone(),
                    functional_description: format!("{} - {}", f.name, f.description),
                });
            }
        }

        let uncovered = changed & !covered;
        for bit in 0..32u8 {
            if uncovered & (1u32 << bit) == 0 {
                continue;
            }
            let name = format!("BIT_{bit}");
            let description = format!("Undocumented bit {bit}");
            out.push(BitChange {
                functional_description: format!("{name} - {description}"),
                bit_field_name: name,
                bit_position: bit,
                bit_width: 1,
                value_before: (before >> bit) & 1,
                value_after: (after >> bit) & 1,
                description,
            });
        }

        out
    }

    /// Clock-gate state of the peripheral owning `address`.
    ///
    /// `Unknown` when the address is not catalogued, the peripheral has no
    /// rule, or there is no clock-status capture to judge by.
    pub fn clock_gate_status(
        &self,
        address: RegAddr,
        clock_status: Option<&ClockStatusSnapshot>,
    ) -> ClockGateStatus {
        let Some(status) = clock_status else {
            return ClockGateStatus::Unknown;
        };
        let Some(def) = self.lookup(address) else {
            return ClockGateStatus::Unknown;
        };
        match self.gate_rules.get(&def.peripheral) {
            Some(rule) => rule.evaluate(status),
            None => ClockGateStatus::Unknown,
        }
    }

    pub fn is_clock_gated(
        &self,
        address: RegAddr,
        clock_status: Option<&ClockStatusSnapshot>,
    ) -> bool {
        self.clock_gate_status(address, clock_status) == ClockGateStatus::Disabled
    }
}

impl Default for RegisterCatalog {
    fn default() -> Self {
        Self::mimxrt798s()
    }
}
