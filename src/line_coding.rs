//! Host-negotiated serial parameters and their hardware mirror.
//!
//! The host reports line coding as raw CDC wire values. Those are stored
//! unmodified so change detection compares exactly what the host sent;
//! normalization to hardware-safe values happens only at the point a value
//! is pushed into the UART.

use crate::bridge::traits::UartPort;
use crate::config;

/// Data bits accepted by the UART hardware
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity accepted by the UART hardware
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Stop bits accepted by the UART hardware
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// One line-coding tuple as reported over the CDC control channel.
///
/// Fields hold the raw wire encoding: `parity` 0/1/2 = none/odd/even,
/// `stop_bits` 0/1/2 = 1/1.5/2 stop bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCoding {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: u8,
    pub stop_bits: u8,
}

impl LineCoding {
    /// Data bits normalized for hardware; unsupported values fall back to 8
    pub fn hw_data_bits(&self) -> DataBits {
        match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        }
    }

    /// Parity normalized for hardware; unsupported values fall back to none
    pub fn hw_parity(&self) -> Parity {
        match self.parity {
            1 => Parity::Odd,
            2 => Parity::Even,
            _ => Parity::None,
        }
    }

    /// Stop bits normalized for hardware; unsupported values (including the
    /// CDC 1.5-stop-bit encoding) fall back to one
    pub fn hw_stop_bits(&self) -> StopBits {
        match self.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        }
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        Self {
            baud_rate: config::serial::BAUD_RATE,
            data_bits: config::serial::DATA_BITS,
            parity: config::serial::PARITY,
            stop_bits: config::serial::STOP_BITS,
        }
    }
}

/// The host-negotiated coding and the last value pushed into hardware.
///
/// `applied` converges to `negotiated` on every [`sync_to`](Self::sync_to)
/// call; hardware is only touched for fields that actually changed.
#[derive(Clone, Copy, Debug)]
pub struct LineCodingPair {
    pub negotiated: LineCoding,
    pub applied: LineCoding,
}

impl LineCodingPair {
    pub const fn new() -> Self {
        let def = LineCoding {
            baud_rate: config::serial::BAUD_RATE,
            data_bits: config::serial::DATA_BITS,
            parity: config::serial::PARITY,
            stop_bits: config::serial::STOP_BITS,
        };
        Self {
            negotiated: def,
            applied: def,
        }
    }

    /// Reprogram `uart` with whatever differs between the negotiated and
    /// applied codings.
    ///
    /// Baud rate is reprogrammed on its own; data bits, parity and stop bits
    /// share one hardware format write, so a change to any of the three
    /// rewrites the group.
    pub fn sync_to<U: UartPort>(&mut self, uart: &mut U) {
        if self.negotiated.baud_rate != self.applied.baud_rate {
            uart.set_baud_rate(self.negotiated.baud_rate);
            self.applied.baud_rate = self.negotiated.baud_rate;
            log::debug!("uart baud rate -> {}", self.applied.baud_rate);
        }

        if self.negotiated.data_bits != self.applied.data_bits
            || self.negotiated.parity != self.applied.parity
            || self.negotiated.stop_bits != self.applied.stop_bits
        {
            uart.set_format(
                self.negotiated.hw_data_bits(),
                self.negotiated.hw_stop_bits(),
                self.negotiated.hw_parity(),
            );
            self.applied.data_bits = self.negotiated.data_bits;
            self.applied.parity = self.negotiated.parity;
            self.applied.stop_bits = self.negotiated.stop_bits;
        }
    }
}

impl Default for LineCodingPair {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::traits::mock::{MockUartPort, UartCall};

    #[test]
    fn test_default_is_115200_8n1() {
        let lc = LineCoding::default();
        assert_eq!(lc.baud_rate, 115_200);
        assert_eq!(lc.hw_data_bits(), DataBits::Eight);
        assert_eq!(lc.hw_parity(), Parity::None);
        assert_eq!(lc.hw_stop_bits(), StopBits::One);
    }

    #[test]
    fn test_unsupported_values_normalize_to_safe_defaults() {
        let lc = LineCoding {
            baud_rate: 9600,
            data_bits: 16,
            parity: 4, // CDC "space" parity, unsupported
            stop_bits: 1, // CDC 1.5 stop bits, unsupported
        };
        assert_eq!(lc.hw_data_bits(), DataBits::Eight);
        assert_eq!(lc.hw_parity(), Parity::None);
        assert_eq!(lc.hw_stop_bits(), StopBits::One);
    }

    #[test]
    fn test_supported_values_pass_through() {
        let lc = LineCoding {
            baud_rate: 9600,
            data_bits: 7,
            parity: 2,
            stop_bits: 2,
        };
        assert_eq!(lc.hw_data_bits(), DataBits::Seven);
        assert_eq!(lc.hw_parity(), Parity::Even);
        assert_eq!(lc.hw_stop_bits(), StopBits::Two);
    }

    #[test]
    fn test_sync_no_change_touches_nothing() {
        let mut pair = LineCodingPair::new();
        let mut uart = MockUartPort::new();

        pair.sync_to(&mut uart);

        assert_eq!(uart.baud_calls(), 0);
        assert_eq!(uart.format_calls(), 0);
    }

    #[test]
    fn test_sync_baud_only_skips_format() {
        let mut pair = LineCodingPair::new();
        let mut uart = MockUartPort::new();

        pair.negotiated.baud_rate = 9600;
        pair.sync_to(&mut uart);

        assert_eq!(uart.baud_calls(), 1);
        assert_eq!(uart.format_calls(), 0);
        assert_eq!(pair.applied, pair.negotiated);
        assert!(uart.calls().contains(&UartCall::SetBaud(9600)));
    }

    #[test]
    fn test_sync_format_group_is_one_write() {
        let mut pair = LineCodingPair::new();
        let mut uart = MockUartPort::new();

        // Changing two of the three format fields is still one format call
        pair.negotiated.parity = 1;
        pair.negotiated.stop_bits = 2;
        pair.sync_to(&mut uart);

        assert_eq!(uart.baud_calls(), 0);
        assert_eq!(uart.format_calls(), 1);
        assert_eq!(pair.applied, pair.negotiated);
        assert!(uart.calls().contains(&UartCall::SetFormat(
            DataBits::Eight,
            StopBits::Two,
            Parity::Odd
        )));
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut pair = LineCodingPair::new();
        let mut uart = MockUartPort::new();

        pair.negotiated.baud_rate = 57_600;
        pair.negotiated.data_bits = 7;
        pair.sync_to(&mut uart);
        pair.sync_to(&mut uart);
        pair.sync_to(&mut uart);

        // Hardware written once per changed group, not once per sync
        assert_eq!(uart.baud_calls(), 1);
        assert_eq!(uart.format_calls(), 1);
    }

    #[test]
    fn test_unknown_values_never_reach_hardware_raw() {
        let mut pair = LineCodingPair::new();
        let mut uart = MockUartPort::new();

        pair.negotiated.data_bits = 9;
        pair.sync_to(&mut uart);

        // Raw 9 is recorded as applied (for change detection) but the
        // hardware saw the normalized fallback
        assert_eq!(pair.applied.data_bits, 9);
        assert!(uart.calls().contains(&UartCall::SetFormat(
            DataBits::Eight,
            StopBits::One,
            Parity::None
        )));
    }
}
