//! MIMXRT798S register table (the subset exercised by board bring-up).

use crate::addr::RegAddr;
use crate::gating::ClockGateRule;
use crate::types::{BitField, FieldAccess, PeripheralDefinition, RegisterDefinition};
use crate::values::RegisterValueTable;

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

fn field(name: &str, position: u8, width: u8, access: FieldAccess, description: &str) -> BitField {
    BitField {
        name: name.to_string(),
        position,
        width,
        access,
        description: description.to_string(),
    }
}

fn rw(name: &str, position: u8, width: u8, description: &str) -> BitField {
    field(name, position, width, FieldAccess::ReadWrite, description)
}

fn ro(name: &str, position: u8, width: u8, description: &str) -> BitField {
    field(name, position, width, FieldAccess::ReadOnly, description)
}

fn wo(name: &str, position: u8, width: u8, description: &str) -> BitField {
    field(name, position, width, FieldAccess::WriteOnly, description)
}

fn bit_per_field(prefix: &str, description: &str) -> Vec<BitField> {
    (0..32u8)
        .map(|i| rw(&format!("{prefix}{i}"), i, 1, &format!("{description} {i}")))
        .collect()
}

struct PeripheralBuilder {
    name: String,
    base: u32,
    description: String,
    registers: Vec<RegisterDefinition>,
}

impl PeripheralBuilder {
    fn new(name: &str, base: u32, description: &str) -> Self {
        PeripheralBuilder {
            name: name.to_string(),
            base,
            description: description.to_string(),
            registers: Vec::new(),
        }
    }

    fn reg(
        mut self,
        name: &str,
        offset: u32,
        description: &str,
        reset_value: u32,
        mut fields: Vec<BitField>,
    ) -> Self {
        fields.sort_by_key(|f| f.position);
        self.registers.push(RegisterDefinition {
            peripheral: self.name.clone(),
            name: name.to_string(),
            address: RegAddr(self.base.wrapping_add(offset)),
            offset,
            description: description.to_string(),
            fields,
            reset_value,
        });
        self
    }

    fn build(self) -> PeripheralDefinition {
        PeripheralDefinition {
            name: self.name,
            base: RegAddr(self.base),
            description: self.description,
            registers: self.registers,
        }
    }
}

// ---------------------------------------------------------------------------
// Peripherals
// ---------------------------------------------------------------------------

fn mpu() -> PeripheralDefinition {
    let attr = |first: u8| -> Vec<BitField> {
        (0..4u8)
            .map(|i| {
                rw(
                    &format!("ATTR{}", first + i),
                    i * 8,
                    8,
                    &format!("Memory attribute encoding for index {}", first + i),
                )
            })
            .collect()
    };

    PeripheralBuilder::new("MPU", 0xE000_ED90, "Memory Protection Unit")
        .reg(
            "TYPE",
            0x0,
            "MPU Type Register",
            0x0000_0800,
            vec![
                ro("SEPARATE", 0, 1, "Unified or separate instruction/data regions"),
                ro("DREGION", 8, 8, "Number of supported data regions"),
                ro("IREGION", 16, 8, "Number of supported instruction regions"),
            ],
        )
        .reg(
            "CTRL",
            0x4,
            "MPU Control Register",
            0,
            vec![
                rw("ENABLE", 0, 1, "MPU enable"),
                rw("HFNMIENA", 1, 1, "MPU enabled during HardFault and NMI handlers"),
                rw("PRIVDEFENA", 2, 1, "Default memory map for privileged access"),
            ],
        )
        .reg(
            "RNR",
            0x8,
            "MPU Region Number Register",
            0,
            vec![rw("REGION", 0, 8, "Region selected by RBAR/RASR")],
        )
        .reg(
            "RBAR",
            0xC,
            "MPU Region Base Address Register",
            0,
            vec![
                rw("REGION", 0, 4, "Region number when VALID is set"),
                rw("VALID", 4, 1, "Region number valid"),
                rw("ADDR", 5, 27, "Region base address"),
            ],
        )
        .reg(
            "RASR",
            0x10,
            "MPU Region Attribute and Size Register",
            0,
            vec![
                rw("ENABLE", 0, 1, "Region enable"),
                rw("SIZE", 1, 5, "Region size (2^(SIZE+1) bytes)"),
                rw("SRD", 8, 8, "Subregion disable"),
                rw("B", 16, 1, "Bufferable"),
                rw("C", 17, 1, "Cacheable"),
                rw("S", 18, 1, "Shareable"),
                rw("TEX", 19, 3, "Type extension"),
                rw("AP", 24, 3, "Access permission"),
                rw("XN", 28, 1, "Execute never"),
            ],
        )
        .reg("MAIR0", 0x30, "MPU Memory Attribute Indirection Register 0", 0, attr(0))
        .reg("MAIR1", 0x34, "MPU Memory Attribute Indirection Register 1", 0, attr(4))
        .build()
}

fn xspi2() -> PeripheralDefinition {
    PeripheralBuilder::new("XSPI2", 0x4041_1000, "External SPI controller 2")
        .reg(
            "MCR",
            0x0,
            "Module Configuration Register",
            0x072F_01DC,
            vec![
                rw("SWRSTSD", 0, 1, "Software reset for serial flash domain"),
                rw("SWRSTAHB", 1, 1, "Software reset for AHB domain"),
                rw("END_CFG", 2, 2, "Byte ordering configuration"),
                rw("DQS_EN", 6, 1, "DQS enable"),
                rw("DQS_LAT_EN", 7, 1, "DQS latency enable"),
                rw("DQS_FA_SEL", 8, 2, "DQS clock source for port A"),
                rw("DQS_FB_SEL", 10, 2, "DQS clock source for port B"),
                rw("MDIS", 14, 1, "Module disable"),
                rw("ISD2FA", 16, 1, "Idle signal drive IOFA[2]"),
                rw("ISD3FA", 17, 1, "Idle signal drive IOFA[3]"),
                rw("ISD2FB", 18, 1, "Idle signal drive IOFB[2]"),
                rw("ISD3FB", 19, 1, "Idle signal drive IOFB[3]"),
            ],
        )
        .build()
}

fn clkctl0() -> PeripheralDefinition {
    let pscctl0 = vec![
        rw("CODE_CACHE", 1, 1, "Code cache clock enable"),
        rw("SYSTEM_CACHE", 2, 1, "System cache clock enable"),
        rw("VDD2_OTP0", 5, 1, "VDD2 OTP0 clock enable"),
        rw("SLEEPCON0", 12, 1, "SLEEPCON0 clock enable"),
        rw("SYSCON0", 13, 1, "SYSCON0 clock enable"),
        rw("GLIKEY0", 14, 1, "GLIKEY0 clock enable"),
        rw("GLIKEY3", 15, 1, "GLIKEY3 clock enable"),
    ];

    let mut pscctl1 = vec![
        rw("TPIU_TRACE_CLKIN", 2, 1, "TPIU trace clock enable"),
        rw("SWO_TRACECLKIN", 3, 1, "SWO trace clock enable"),
        rw("TSCLK", 4, 1, "Timestamp clock enable"),
        rw("EDMA0", 5, 1, "eDMA0 clock enable"),
        rw("EDMA1", 6, 1, "eDMA1 clock enable"),
        rw("PKC_RAM_CTRL", 7, 1, "PKC RAM controller clock enable"),
        rw("PKC", 8, 1, "PKC clock enable"),
        rw("ROMCP", 9, 1, "ROM controller clock enable"),
        rw("XSPI0", 10, 1, "XSPI0 clock enable"),
        rw("XSPI1", 11, 1, "XSPI1 clock enable"),
        rw("CACHE64_0", 12, 1, "CACHE64_0 clock enable"),
        rw("CACHE64_1", 13, 1, "CACHE64_1 clock enable"),
        rw("QK_SUBSYS", 14, 1, "QK subsystem clock enable"),
        rw("MMU0", 16, 1, "MMU0 clock enable"),
        rw("MMU1", 17, 1, "MMU1 clock enable"),
    ];
    for i in 0..8u8 {
        pscctl1.push(rw(
            &format!("GPIO{i}"),
            18 + i,
            1,
            &format!("GPIO{i} clock enable"),
        ));
    }
    pscctl1.extend([
        rw("SCT0", 26, 1, "SCTimer0 clock enable"),
        rw("CDOG0", 27, 1, "CDOG0 clock enable"),
        rw("CDOG1", 28, 1, "CDOG1 clock enable"),
        rw("CDOG2", 29, 1, "CDOG2 clock enable"),
        rw("LP_FLEXCOMM0", 30, 1, "LP_FLEXCOMM0 clock enable"),
        rw("LP_FLEXCOMM1", 31, 1, "LP_FLEXCOMM1 clock enable"),
    ]);

    let pscctl4 = vec![rw("XSPI2", 0, 1, "XSPI2 clock enable")];
    let pscctl5 = vec![
        rw("IOPCTL0", 2, 1, "IOPCTL0 clock enable"),
        rw("IOPCTL1", 3, 1, "IOPCTL1 clock enable"),
        rw("IOPCTL2", 5, 1, "IOPCTL2 clock enable"),
    ];

    PeripheralBuilder::new("CLKCTL0", 0x4000_1000, "Clock Controller 0")
        .reg("PSCCTL0", 0x10, "Peripheral clock control 0", 0, pscctl0)
        .reg("PSCCTL1", 0x14, "Peripheral clock control 1", 0, pscctl1)
        .reg(
            "PSCCTL2",
            0x18,
            "Peripheral clock control 2",
            0,
            bit_per_field("BIT_", "Peripheral clock enable bit"),
        )
        .reg(
            "PSCCTL3",
            0x1C,
            "Peripheral clock control 3",
            0,
            bit_per_field("BIT_", "Peripheral clock enable bit"),
        )
        .reg("PSCCTL4", 0x20, "Peripheral clock control 4", 0, pscctl4)
        .reg("PSCCTL5", 0x24, "Peripheral clock control 5", 0, pscctl5)
        .reg(
            "CLKDIV",
            0x400,
            "Clock divider register",
            0,
            vec![
                rw("CLKDIV", 0, 8, "Clock divider value"),
                rw("RESET", 29, 1, "Reset divider counter"),
                rw("HALT", 30, 1, "Halt divider counter"),
                ro("REQFLAG", 31, 1, "Divider change request pending"),
            ],
        )
        .reg(
            "CLKSEL",
            0x434,
            "Clock select register",
            0,
            vec![
                rw("SEL", 0, 3, "Clock source select"),
                rw("FREQMEAS_REF", 8, 1, "Frequency measure reference clock select"),
                rw("FREQMEAS_TARGET", 9, 1, "Frequency measure target clock select"),
            ],
        )
        .build()
}

fn iopctl_pin_fields() -> Vec<BitField> {
    vec![
        rw("FUNC", 0, 4, "Pin function select"),
        rw("PUPDENA", 4, 1, "Pull-up/pull-down enable"),
        rw("PUPDSEL", 5, 1, "Pull-up/pull-down select"),
        rw("IBENA", 6, 1, "Input buffer enable"),
        rw("SLEW", 7, 1, "Slew rate control"),
        rw("FULLDRIVE", 8, 1, "Full drive strength"),
        rw("AMENA", 9, 1, "Analog mux enable"),
        rw("ODENA", 10, 1, "Open-drain enable"),
        rw("IIENA", 11, 1, "Input invert enable"),
    ]
}

fn iopctl0() -> PeripheralDefinition {
    PeripheralBuilder::new("IOPCTL0", 0x4000_4000, "I/O pin control 0")
        .reg("PIO0_31", 0x7C, "Port 0 pin 31 configuration", 0, iopctl_pin_fields())
        .reg("PIO1_0", 0x80, "Port 1 pin 0 configuration", 0, iopctl_pin_fields())
        .build()
}

fn iopctl2() -> PeripheralDefinition {
    let mut b = PeripheralBuilder::new("IOPCTL2", 0x400A_5000, "I/O pin control 2");
    for pin in 0..32u32 {
        b = b.reg(
            &format!("PIO5_{pin}"),
            0x80 + 4 * pin,
            &format!("Port 5 pin {pin} configuration"),
            0,
            iopctl_pin_fields(),
        );
    }
    b.build()
}

fn rstctl() -> PeripheralDefinition {
    let mut fields = vec![
        wo("IOPCTL0_RST", 2, 1, "Clear IOPCTL0 reset"),
        wo("IOPCTL1_RST", 3, 1, "Clear IOPCTL1 reset"),
        wo("IOPCTL2_RST", 5, 1, "Clear IOPCTL2 reset"),
    ];
    for i in 0..8u8 {
        fields.push(wo(
            &format!("GPIO{i}_RST"),
            18 + i,
            1,
            &format!("Clear GPIO{i} reset"),
        ));
    }
    PeripheralBuilder::new("RSTCTL", 0x4000_0000, "Reset Controller")
        .reg("PRSTCTL_CLR", 0x70, "Peripheral reset control clear", 0, fields)
        .build()
}

fn syscon0() -> PeripheralDefinition {
    PeripheralBuilder::new("SYSCON0", 0x4002_0000, "System configuration 0")
        .reg(
            "AHBMATPRIO",
            0x30,
            "AHB matrix priority",
            0x1C,
            vec![
                rw("PRI_CPU0", 0, 2, "CPU0 bus master priority"),
                rw("PRI_DMA0", 2, 2, "DMA0 bus master priority"),
                rw("PRI_DMA1", 4, 2, "DMA1 bus master priority"),
                rw("PRI_DSP", 6, 2, "DSP bus master priority"),
                rw("PRI_PKC", 8, 2, "PKC bus master priority"),
                rw("PRI_XSPI0", 10, 2, "XSPI0 bus master priority"),
                rw("PRI_XSPI1", 12, 2, "XSPI1 bus master priority"),
                rw("PRI_XSPI2", 14, 2, "XSPI2 bus master priority"),
            ],
        )
        .build()
}

fn xcache(name: &str, base: u32, description: &str) -> PeripheralDefinition {
    PeripheralBuilder::new(name, base, description)
        .reg(
            "CCR",
            0x0,
            "Cache control register",
            0,
            vec![
                rw("ENCACHE", 0, 1, "Cache enable"),
                rw("ENWRBUF", 1, 1, "Write buffer enable"),
                rw("INVW0", 24, 1, "Invalidate way 0"),
                rw("INVW1", 25, 1, "Invalidate way 1"),
                rw("PUSHW0", 26, 1, "Push way 0"),
                rw("PUSHW1", 27, 1, "Push way 1"),
                rw("GO", 31, 1, "Initiate cache command"),
            ],
        )
        .build()
}

fn gpio0() -> PeripheralDefinition {
    PeripheralBuilder::new("GPIO0", 0x4010_0000, "General purpose I/O port 0")
        .reg("DIR", 0x0, "Pin direction", 0, bit_per_field("DIRP", "Direction of pin"))
        .reg("MASK", 0x80, "Pin mask", 0, bit_per_field("MASKP", "Mask of pin"))
        .reg("PIN", 0x100, "Pin state", 0, bit_per_field("PORT", "State of pin"))
        .build()
}

// ---------------------------------------------------------------------------
// Public tables
// ---------------------------------------------------------------------------

/// Every peripheral known to the catalog, in a fixed order.
pub fn mimxrt798s_peripherals() -> Vec<PeripheralDefinition> {
    vec![
        mpu(),
        xspi2(),
        clkctl0(),
        iopctl0(),
        iopctl2(),
        rstctl(),
        syscon0(),
        xcache("XCACHE0", 0x4003_3000, "System cache controller"),
        xcache("XCACHE1", 0x4003_4000, "Code cache controller"),
        gpio0(),
    ]
}

/// Clock-gating rules for the peripherals whose gate is known.
pub fn default_clock_gate_rules() -> Vec<ClockGateRule> {
    vec![
        ClockGateRule::zero_value("IOPCTL2", "PSCCTL2"),
        ClockGateRule::bit_clear("XSPI2", "PSCCTL4", 0),
        ClockGateRule::bit_clear("IOPCTL0", "PSCCTL5", 2),
    ]
}

/// Values written by the reference boot flow where the static analyzer
/// cannot see the operand (SDK calls that compute the value at runtime).
pub fn default_known_values() -> RegisterValueTable {
    [
        (RegAddr(0x4000_1434), 0x0000_0002), // CLKCTL0 CLKSEL
        (RegAddr(0x4041_1000), 0x072F_01DC), // XSPI2 MCR
        (RegAddr(0x4000_407C), 0x0000_0041), // IOPCTL0 PIO0_31
        (RegAddr(0x4002_0030), 0x0000_001C), // SYSCON0 AHBMATPRIO
        (RegAddr(0x4000_1020), 0x0000_0001), // CLKCTL0 PSCCTL4
        (RegAddr(0x4000_1024), 0x0000_002C), // CLKCTL0 PSCCTL5
        (RegAddr(0xE000_ED94), 0x0000_0007), // MPU CTRL: ENABLE | HFNMIENA | PRIVDEFENA
    ]
    .into_iter()
    .collect()
}

/// Final values confirmed on hardware for the highest-confidence registers.
pub fn default_expected_final_values() -> RegisterValueTable {
    [
        (RegAddr(0x4000_1434), 0x0000_0002), // CLKCTL0 CLKSEL
        (RegAddr(0x4041_1000), 0x072F_01DC), // XSPI2 MCR
        (RegAddr(0x4000_407C), 0x0000_0041), // IOPCTL0 PIO0_31
        (RegAddr(0x4002_0030), 0x0000_001C), // SYSCON0 AHBMATPRIO
        (RegAddr(0xE000_ED94), 0x0000_0007), // MPU CTRL after ARM_MPU_Enable
    ]
    .into_iter()
    .collect()
}
