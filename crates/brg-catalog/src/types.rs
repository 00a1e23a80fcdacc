use serde::{Deserialize, Serialize};

use crate::addr::{hex32, RegAddr};

// ---------------------------------------------------------------------------
// Register layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldAccess {
    #[serde(rename = "RW")]
    ReadWrite,
    #[serde(rename = "RO")]
    ReadOnly,
    #[serde(rename = "WO")]
    WriteOnly,
    #[serde(rename = "W1C")]
    WriteOneToClear,
}

/// A named bit-field inside a 32-bit register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    pub name: String,
    /// Position of the least-significant bit (0..=31).
    pub position: u8,
    /// Width in bits (1..=32).
    pub width: u8,
    pub access: FieldAccess,
    pub description: String,
}

impl BitField {
    /// Mask of this field in register position.
    pub fn mask(&self) -> u32 {
        let width_mask = if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        };
        width_mask.checked_shl(self.position as u32).unwrap_or(0)
    }

    /// Field value right-aligned.
    pub fn extract(&self, register_value: u32) -> u32 {
        (register_value & self.mask())
            .checked_shr(self.position as u32)
            .unwrap_or(0)
    }
}

/// One memory-mapped register as documented in the reference manual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDefinition {
    pub peripheral: String,
    pub name: String,
    pub address: RegAddr,
    /// Offset from the owning peripheral's base address.
    pub offset: u32,
    pub description: String,
    /// Ordered by bit position.
    pub fields: Vec<BitField>,
    #[serde(with = "hex32")]
    pub reset_value: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralDefinition {
    pub name: String,
    pub base: RegAddr,
    pub description: String,
    pub registers: Vec<RegisterDefinition>,
}

// ---------------------------------------------------------------------------
// Decode / diff output
// ---------------------------------------------------------------------------

/// A single field whose value differs between two register values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitChange {
    pub bit_field_name: String,
    pub bit_position: u8,
    pub bit_width: u8,
    /// Field value before, right-aligned.
    pub value_before: u32,
    /// Field value after, right-aligned.
    pub value_after: u32,
    pub description: String,
    /// `"<NAME> - <description>"`.
    pub functional_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedField {
    pub name: String,
    pub value: u32,
    pub hex: String,
    pub bit_position: u8,
    pub bit_width: u8,
    pub description: String,
}

/// Named-field breakdown of one register value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRegister {
    pub address: RegAddr,
    #[serde(with = "hex32")]
    pub value: u32,
    pub peripheral: String,
    pub register: String,
    pub description: String,
    pub decoded_fields: Vec<DecodedField>,
}

// ---------------------------------------------------------------------------
// Clock gating
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockGateStatus {
    Enabled,
    Disabled,
    Unknown,
}

impl ClockGateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockGateStatus::Enabled => "enabled",
            ClockGateStatus::Disabled => "disabled",
            ClockGateStatus::Unknown => "unknown",
        }
    }
}

/// Label used for anything the catalog does not know.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";

#[cfg(test)]
mod tests {
    use super::*;

    fn f(position: u8, width: u8) -> BitField {
        BitField {
            name: "F".to_string(),
            position,
            width,
            access: FieldAccess::ReadWrite,
            description: String::new(),
        }
    }

    #[test]
    fn mask_and_extract() {
        assert_eq!(f(0, 1).mask(), 0x1);
        assert_eq!(f(8, 2).mask(), 0x300);
        assert_eq!(f(5, 27).mask(), 0xFFFF_FFE0);
        assert_eq!(f(0, 32).mask(), u32::MAX);
        assert_eq!(f(8, 2).extract(0x0000_0200), 2);
        assert_eq!(f(24, 3).extract(0x0300_0000), 3);
    }
}
