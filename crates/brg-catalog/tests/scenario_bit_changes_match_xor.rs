//! Bit-change correspondence
//!
//! GREEN when, for every catalogued register and for unknown addresses:
//! - `diff` is empty exactly when before == after
//! - the union of reported field masks covers every changed bit
//! - no reported field is unchanged

use brg_catalog::{RegAddr, RegisterCatalog};

fn field_mask(position: u8, width: u8) -> u32 {
    let w = if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    };
    w << position
}

const VALUE_PAIRS: &[(u32, u32)] = &[
    (0x0000_0000, 0x0000_0000),
    (0x0000_0000, 0x0000_0002),
    (0x072F_01DC, 0x072F_01DC),
    (0x072F_41DC, 0x072F_01DC),
    (0xFFFF_FFFF, 0x0000_0000),
    (0x1234_5678, 0x8765_4321),
    (0x0000_0041, 0x0000_0141),
];

#[test]
fn diff_covers_exactly_the_changed_bits_for_every_register() {
    let cat = RegisterCatalog::mimxrt798s();

    let mut addresses: Vec<RegAddr> = cat
        .peripherals()
        .iter()
        .flat_map(|p| p.registers.iter().map(|r| r.address))
        .collect();
    addresses.push(RegAddr(0x5000_0000));
    addresses.push(RegAddr(0x0000_0004));

    for addr in addresses {
        for &(before, after) in VALUE_PAIRS {
            let changes = cat.diff(addr, before, after);
            let xor = before ^ after;

            assert_eq!(
                changes.is_empty(),
                xor == 0,
                "empty diff must mean equal values at {addr} ({before:#x} -> {after:#x})"
            );

            let mut covered = 0u32;
            for c in &changes {
                let m = field_mask(c.bit_position, c.bit_width);
                assert_ne!(
                    xor & m,
                    0,
                    "field {} reported but unchanged at {addr}",
                    c.bit_field_name
                );
                assert_ne!(c.value_before, c.value_after);
                covered |= m;
            }
            assert_eq!(
                xor & !covered,
                0,
                "changed bits {:#x} not reported at {addr}",
                xor & !covered
            );
        }
    }
}

#[test]
fn unknown_address_gets_one_entry_per_changed_bit() {
    let cat = RegisterCatalog::mimxrt798s();
    let changes = cat.diff(RegAddr(0x6000_0000), 0x0, 0x8000_0101);
    let positions: Vec<u8> = changes.iter().map(|c| c.bit_position).collect();
    assert_eq!(positions, vec![0, 8, 31]);
    assert!(changes.iter().all(|c| c.bit_width == 1));
}
