use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::addr::{format_hex32, parse_hex_u32, RegAddr};

/// Address -> 32-bit value table, serialized as `{"0x…": "0x…"}`.
///
/// Used both for the resolver's known-value fallback and for the
/// validator's expected-final-value oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterValueTable {
    values: BTreeMap<RegAddr, u32>,
}

impl RegisterValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: RegAddr, value: u32) {
        self.values.insert(address, value);
    }

    pub fn get(&self, address: RegAddr) -> Option<u32> {
        self.values.get(&address).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegAddr, u32)> + '_ {
        self.values.iter().map(|(a, v)| (*a, *v))
    }
}

impl FromIterator<(RegAddr, u32)> for RegisterValueTable {
    fn from_iter<I: IntoIterator<Item = (RegAddr, u32)>>(iter: I) -> Self {
        RegisterValueTable {
            values: iter.into_iter().collect(),
        }
    }
}

impl Serialize for RegisterValueTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (addr, value) in &self.values {
            map.serialize_entry(&addr.to_string(), &format_hex32(*value))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RegisterValueTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = RegisterValueTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of hex address to hex value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = RegisterValueTable::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    let addr = parse_hex_u32(&k).map_err(serde::de::Error::custom)?;
                    let value = parse_hex_u32(&v).map_err(serde::de::Error::custom)?;
                    table.insert(RegAddr(addr), value);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip_canonicalises_spelling() {
        let raw = r#"{"0X40001434": "0x2", "40020030": "0x0000001C"}"#;
        let t: RegisterValueTable = serde_json::from_str(raw).unwrap();
        assert_eq!(t.get(RegAddr(0x4000_1434)), Some(2));
        assert_eq!(t.get(RegAddr(0x4002_0030)), Some(0x1C));

        let out = serde_json::to_string(&t).unwrap();
        assert_eq!(
            out,
            r#"{"0x40001434":"0x00000002","0x40020030":"0x0000001c"}"#
        );
    }
}
