use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    VolatileRead,
    VolatileWrite,
    FunctionCallWrite,
    ReadModifyWrite,
}

impl AccessKind {
    /// Accepts the canonical names plus the short aliases the
    /// peripheral-grouped documents use.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "volatile_read" | "read" => Some(AccessKind::VolatileRead),
            "volatile_write" | "write" => Some(AccessKind::VolatileWrite),
            "function_call_write" | "function_call" => Some(AccessKind::FunctionCallWrite),
            "read_modify_write" | "read-modify-write" | "rmw" => {
                Some(AccessKind::ReadModifyWrite)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::VolatileRead => "volatile_read",
            AccessKind::VolatileWrite => "volatile_write",
            AccessKind::FunctionCallWrite => "function_call_write",
            AccessKind::ReadModifyWrite => "read_modify_write",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, AccessKind::VolatileRead)
    }

    /// Goes straight through a volatile pointer (not via an SDK call).
    pub fn is_volatile(&self) -> bool {
        !matches!(self, AccessKind::FunctionCallWrite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    BoardInit,
    DriverInit,
    Runtime,
    Unknown,
}

impl ExecutionPhase {
    /// Unrecognised labels map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "board_init" => ExecutionPhase::BoardInit,
            "driver_init" => ExecutionPhase::DriverInit,
            "runtime" => ExecutionPhase::Runtime,
            _ => ExecutionPhase::Unknown,
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            ExecutionPhase::BoardInit => 0,
            ExecutionPhase::DriverInit => 1,
            ExecutionPhase::Runtime => 2,
            ExecutionPhase::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionPhase::BoardInit => "board_init",
            ExecutionPhase::DriverInit => "driver_init",
            ExecutionPhase::Runtime => "runtime",
            ExecutionPhase::Unknown => "unknown",
        }
    }

    /// Base offset (ms) of the phase on the estimated boot timeline.
    pub fn timeline_base_ms(&self) -> f64 {
        match self {
            ExecutionPhase::BoardInit => 0.0,
            ExecutionPhase::DriverInit => 50.0,
            ExecutionPhase::Runtime | ExecutionPhase::Unknown => 100.0,
        }
    }
}

/// What an access is for. Closed set; populated once at ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPurpose {
    CacheDisable,
    CacheEnable,
    MpuDisable,
    MpuEnable,
    MpuMemoryAttribute,
    MpuRegion,
    ClockControl,
    ResetControl,
    PinMux,
    #[default]
    Unspecified,
}

impl AccessPurpose {
    pub fn is_unspecified(&self) -> bool {
        *self == AccessPurpose::Unspecified
    }

    /// Classify from the function name first, then the free-text purpose
    /// label. The only place purpose text is inspected.
    pub fn infer(function: Option<&str>, purpose_text: Option<&str>) -> Self {
        for text in [function, purpose_text].into_iter().flatten() {
            let p = Self::classify(&text.to_ascii_lowercase());
            if p != AccessPurpose::Unspecified {
                return p;
            }
        }
        AccessPurpose::Unspecified
    }

    fn classify(t: &str) -> Self {
        // "disable" contains "enable": disable checks go first.
        if t.contains("cache") && !t.contains("mpu") {
            if t.contains("disable") {
                return AccessPurpose::CacheDisable;
            }
            if t.contains("enable") {
                return AccessPurpose::CacheEnable;
            }
        }
        if t.contains("mpu") {
            if t.contains("disable") {
                return AccessPurpose::MpuDisable;
            }
            if t.contains("memattr") || t.contains("memory attribute") || t.contains("mair") {
                return AccessPurpose::MpuMemoryAttribute;
            }
            if t.contains("region") {
                return AccessPurpose::MpuRegion;
            }
            if t.contains("enable") {
                return AccessPurpose::MpuEnable;
            }
        }
        if t.contains("clock") || t.contains("clk") {
            return AccessPurpose::ClockControl;
        }
        if t.contains("reset") || t.contains("rst") {
            return AccessPurpose::ResetControl;
        }
        if t.contains("pin") || t.contains("iopctl") || t.contains("mux") {
            return AccessPurpose::PinMux;
        }
        AccessPurpose::Unspecified
    }
}
