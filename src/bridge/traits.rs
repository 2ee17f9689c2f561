//! Hardware seams for the bridge, for abstraction and testability.
//!
//! The bridge core only consumes these interfaces; the USB protocol state
//! machine and the UART peripheral live behind them. Both seams are sync and
//! non-blocking by contract: a call either completes immediately or reports
//! how little it did, never suspends.

use crate::line_coding::{DataBits, LineCoding, Parity, StopBits};

/// Upstream USB CDC-ACM collaborator.
pub trait UsbSerial {
    /// Number of host bytes readable right now without blocking
    fn available(&self) -> usize;

    /// Non-blocking bounded read; returns the number of bytes copied into
    /// `buf`. Bytes not read remain queued at the USB layer.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Non-blocking bounded write; returns the number of bytes accepted.
    /// Unaccepted bytes are the caller's to retry.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Push previously accepted bytes out to the host
    fn flush(&mut self);

    /// Line coding currently negotiated by the host
    fn line_coding(&self) -> LineCoding;
}

/// Downstream UART hardware collaborator.
pub trait UartPort {
    fn set_baud_rate(&mut self, baud_rate: u32);

    /// One atomic format update; the three fields share a hardware register
    fn set_format(&mut self, data_bits: DataBits, stop_bits: StopBits, parity: Parity);

    /// Assert or release the line-break condition
    fn set_break(&mut self, assert: bool);

    /// True when the transmitter can take a byte without blocking
    fn is_writable(&self) -> bool;

    fn write_byte(&mut self, byte: u8);
}
