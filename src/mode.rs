//! Device operating mode and the UART pin assignment it selects.
//!
//! The mode is chosen externally (strap inputs, sampled once at boot) and
//! never changes afterwards.

use crate::config;

/// Device operating mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatingMode {
    /// Dual-purpose: debug probe plus CDC-UART bridge on the default pins
    Default,
    /// Debug probe only; the UART is disabled entirely and the bridge is
    /// inert
    DebugProbeOnly,
    /// Dedicated UART bridge on its own pin pair
    UartOnly,
}

impl OperatingMode {
    /// Decode the two strap bits sampled at boot. Unknown combinations fall
    /// back to the default mode.
    pub fn from_straps(bit0: bool, bit1: bool) -> Self {
        match (bit1, bit0) {
            (false, false) => OperatingMode::Default,
            (false, true) => OperatingMode::DebugProbeOnly,
            (true, false) => OperatingMode::UartOnly,
            (true, true) => OperatingMode::Default,
        }
    }

    /// True when the bridge's execution contexts should run at all
    pub fn bridge_active(self) -> bool {
        !matches!(self, OperatingMode::DebugProbeOnly)
    }
}

/// TX/RX pin pair for one interface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinAssignment {
    pub tx: u8,
    pub rx: u8,
}

impl PinAssignment {
    /// Pin pair for `mode`, or `None` when that mode leaves the UART
    /// disabled. Default and UartOnly map to disjoint pairs.
    pub fn for_mode(mode: OperatingMode) -> Option<Self> {
        match mode {
            OperatingMode::Default => Some(Self {
                tx: config::pins::default_mode::UART_TX,
                rx: config::pins::default_mode::UART_RX,
            }),
            OperatingMode::UartOnly => Some(Self {
                tx: config::pins::uart_only::UART_TX,
                rx: config::pins::uart_only::UART_RX,
            }),
            OperatingMode::DebugProbeOnly => None,
        }
    }
}
