use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Hex parsing / formatting
// ---------------------------------------------------------------------------

/// Errors produced while parsing a 32-bit hex quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexParseError {
    /// The string was empty (or only a `0x` prefix).
    Empty,
    /// The string contained a non-hex character.
    InvalidDigits { raw: String },
    /// The value does not fit in 32 bits.
    OutOfRange { raw: String },
}

impl fmt::Display for HexParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexParseError::Empty => write!(f, "hex value is empty"),
            HexParseError::InvalidDigits { raw } => {
                write!(f, "hex value contains non-hex digits: '{raw}'")
            }
            HexParseError::OutOfRange { raw } => {
                write!(f, "hex value does not fit in 32 bits: '{raw}'")
            }
        }
    }
}

impl std::error::Error for HexParseError {}

/// Parse a hex string with or without a `0x`/`0X` prefix into a `u32`.
///
/// Leading zeros are allowed beyond 8 digits as long as the value fits.
pub fn parse_hex_u32(raw: &str) -> Result<u32, HexParseError> {
    let t = raw.trim();
    let digits = t
        .strip_prefix("0x")
        .or_else(|| t.strip_prefix("0X"))
        .unwrap_or(t);

    if digits.is_empty() {
        return Err(HexParseError::Empty);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HexParseError::InvalidDigits { raw: t.to_string() });
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 8 {
        return Err(HexParseError::OutOfRange { raw: t.to_string() });
    }
    if significant.is_empty() {
        return Ok(0);
    }

    u32::from_str_radix(significant, 16).map_err(|_| HexParseError::OutOfRange {
        raw: t.to_string(),
    })
}

/// `0x` + 8 lower-case hex digits.
pub fn format_hex32(v: u32) -> String {
    format!("0x{v:08x}")
}

/// `0x` + minimal lower-case hex digits (used for offsets).
pub fn format_hex(v: u32) -> String {
    format!("0x{v:x}")
}

// ---------------------------------------------------------------------------
// Register address
// ---------------------------------------------------------------------------

/// Absolute 32-bit address of a memory-mapped register.
///
/// Displays and serializes in canonical form (`0x` + 8 lower-case hex
/// digits), so two spellings of the same address always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegAddr(pub u32);

impl RegAddr {
    pub fn new(v: u32) -> Self {
        RegAddr(v)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Parse a hardware-capture map key.
    ///
    /// `0x`-prefixed keys are hex; all-decimal keys are decimal (the probe
    /// tooling writes `str(int)` keys); anything else is tried as bare hex.
    pub fn parse_key(raw: &str) -> Result<Self, HexParseError> {
        let t = raw.trim();
        if t.starts_with("0x") || t.starts_with("0X") {
            return parse_hex_u32(t).map(RegAddr);
        }
        if !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()) {
            return t
                .parse::<u32>()
                .map(RegAddr)
                .map_err(|_| HexParseError::OutOfRange { raw: t.to_string() });
        }
        parse_hex_u32(t).map(RegAddr)
    }

    pub fn offset_from(self, base: RegAddr) -> u32 {
        self.0.wrapping_sub(base.0)
    }
}

impl fmt::Display for RegAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl FromStr for RegAddr {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_u32(s).map(RegAddr)
    }
}

impl Serialize for RegAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RegAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// serde helpers for 32-bit register values
// ---------------------------------------------------------------------------

/// `#[serde(with = "hex32")]` for `u32` register values rendered as
/// `0x%08x` strings.
pub mod hex32 {
    use super::{format_hex32, parse_hex_u32};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_hex32(*v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_hex_u32(&raw).map_err(serde::de::Error::custom)
    }

    /// Same encoding for `Option<u32>`; `None` is `null`.
    pub mod option {
        use super::{format_hex32, parse_hex_u32};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
            match v {
                Some(v) => serializer.serialize_str(&format_hex32(*v)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<u32>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|s| parse_hex_u32(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
