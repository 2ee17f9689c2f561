//! Bidirectional byte bridge between a USB CDC endpoint and a UART.
//!
//! Each interface owns two bounded FIFO buffers (`to_uart` carries host
//! bytes awaiting UART transmission, `to_usb` carries UART bytes awaiting
//! the host) and a line-coding pair, each behind its own exclusive-access
//! token. Three contexts touch an interface concurrently: the UART RX
//! interrupt (producer into `to_usb`), the USB-side task and the UART-side
//! task. No operation ever holds more than one token, and the byte-moving
//! operations never block — on contention they skip the pass (or, in the
//! interrupt, drop the byte) and rely on the next loop iteration.

pub mod buffer;
pub mod lock;
pub mod traits;

use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal_async::delay::DelayNs;

use crate::config;
use crate::line_coding::LineCodingPair;
use buffer::DirectionalBuffer;
use lock::TryLock;
use traits::{UartPort, UsbSerial};

const _: () = assert!(config::bridge::NUM_INTERFACES > 0);

/// Sentinel for "no break requested"; break durations are u16 so every
/// valid duration (including 0x0000 and 0xFFFF) fits below it
const BREAK_NONE: u32 = u32::MAX;

/// One USB-serial <-> UART pairing
pub struct BridgeInterface {
    /// Host -> device bytes awaiting UART transmission
    to_uart: TryLock<DirectionalBuffer>,
    /// Device -> host bytes awaiting USB transmission
    to_usb: TryLock<DirectionalBuffer>,
    coding: TryLock<LineCodingPair>,
    /// UART RX bytes discarded because `to_usb` was full or contended
    rx_dropped: AtomicU32,
    /// Pending host break request ([`BREAK_NONE`] when empty)
    break_request: AtomicU32,
}

impl BridgeInterface {
    pub const fn new() -> Self {
        Self {
            to_uart: TryLock::new(DirectionalBuffer::new()),
            to_usb: TryLock::new(DirectionalBuffer::new()),
            coding: TryLock::new(LineCodingPair::new()),
            rx_dropped: AtomicU32::new(0),
            break_request: AtomicU32::new(BREAK_NONE),
        }
    }

    /// Record a host break request for the USB-side context to execute via
    /// [`send_break`]. Callable from the USB control layer; a newer request
    /// replaces an unexecuted older one.
    pub fn request_break(&self, duration_ms: u16) {
        self.break_request
            .store(u32::from(duration_ms), Ordering::Release);
    }

    /// Take the pending break request, leaving the slot empty
    pub fn take_break_request(&self) -> Option<u16> {
        match self.break_request.swap(BREAK_NONE, Ordering::Acquire) {
            BREAK_NONE => None,
            duration => Some(duration as u16),
        }
    }

    /// Pull whatever the USB endpoint has queued into `to_uart`, bounded by
    /// the buffer's free space. Excess stays queued at the USB layer for a
    /// later pass. No-op when the buffer token is contended.
    pub fn read_from_host<U: UsbSerial>(&self, usb: &mut U) {
        let available = usb.available();
        if available == 0 {
            return;
        }
        if let Some(mut buf) = self.to_uart.try_lock() {
            buf.fill_from(available, |dst| usb.read(dst));
        }
    }

    /// Hand the entire `to_usb` contents to the USB write path in one call;
    /// whatever was not accepted is compacted to the front. Flushes only
    /// when bytes were accepted, after the token is released.
    pub fn write_to_host<U: UsbSerial>(&self, usb: &mut U) {
        let mut accepted = 0;
        if let Some(mut buf) = self.to_usb.try_lock() {
            if buf.is_empty() {
                return;
            }
            accepted = usb.write(buf.as_slice());
            buf.consume(accepted);
        }
        if accepted > 0 {
            usb.flush();
        }
    }

    /// Interrupt-context producer: append one UART RX byte to `to_usb`.
    ///
    /// Never blocks. If the buffer is full or its token is held elsewhere
    /// the byte is dropped and counted; the caller has already taken the
    /// byte off the hardware so the receive path cannot stall.
    pub fn uart_rx(&self, byte: u8) {
        let accepted = match self.to_usb.try_lock() {
            Some(mut buf) => buf.push(byte),
            None => false,
        };
        if !accepted {
            self.rx_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Move at most one byte from `to_uart` into the UART transmitter.
    ///
    /// One byte per call keeps the pass bounded: UART transmission is paced
    /// by the physical baud rate, and the calling loop must also service
    /// line-coding updates and the other interfaces.
    pub fn write_to_uart<U: UartPort>(&self, uart: &mut U) {
        if let Some(mut buf) = self.to_uart.try_lock() {
            if !buf.is_empty() && uart.is_writable() {
                if let Some(byte) = buf.pop_front() {
                    uart.write_byte(byte);
                }
            }
        }
    }

    /// Snapshot the host's negotiated line coding into the coding pair.
    /// Short bounded critical section; runs on the USB-side context.
    pub fn capture_line_coding<U: UsbSerial>(&self, usb: &U) {
        let negotiated = usb.line_coding();
        self.coding.lock().negotiated = negotiated;
    }

    /// Reprogram the UART for any fields that changed since the last apply.
    /// Runs on the UART-side context.
    pub fn apply_line_coding<U: UartPort>(&self, uart: &mut U) {
        self.coding.lock().sync_to(uart);
    }

    /// One USB-side service pass: refresh the negotiated coding, then move
    /// bytes in both USB directions
    pub fn service_usb<U: UsbSerial>(&self, usb: &mut U) {
        self.capture_line_coding(usb);
        self.read_from_host(usb);
        self.write_to_host(usb);
    }

    /// One UART-side service pass: converge the hardware coding, then emit
    /// at most one byte
    pub fn service_uart<U: UartPort>(&self, uart: &mut U) {
        self.apply_line_coding(uart);
        self.write_to_uart(uart);
    }

    /// Total UART RX bytes discarded so far
    pub fn rx_dropped(&self) -> u32 {
        self.rx_dropped.load(Ordering::Relaxed)
    }
}

impl Default for BridgeInterface {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle a host break request.
///
/// `0xFFFF` asserts the break and leaves it asserted (the host releases it
/// later), `0x0000` releases immediately, anything else asserts, holds for
/// that many milliseconds and releases. The timed hold suspends the calling
/// context, which is the context servicing the USB control transfer and is
/// otherwise idle.
pub async fn send_break<U: UartPort, D: DelayNs>(uart: &mut U, delay: &mut D, duration_ms: u16) {
    match duration_ms {
        0xFFFF => uart.set_break(true),
        0x0000 => uart.set_break(false),
        ms => {
            uart.set_break(true);
            delay.delay_ms(u32::from(ms)).await;
            uart.set_break(false);
        }
    }
}
