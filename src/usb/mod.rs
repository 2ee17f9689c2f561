//! Non-blocking [`UsbSerial`] adapter over the embassy-usb CDC-ACM class.
//!
//! The CDC class exposes packet-based async reads and writes; the bridge
//! needs sync best-effort calls. Each attempt polls the corresponding
//! future exactly once: ready means the transfer completed, pending means
//! "nothing this pass". Incoming packets are staged in a one-packet buffer
//! so `available()` reflects bytes already pulled off the endpoint.

use embassy_futures::poll_once;
use embassy_usb::class::cdc_acm::{ParityType, Receiver, Sender, StopBits};
use esp_hal::otg_fs::asynch::Driver;

use crate::bridge::traits::UsbSerial;
use crate::line_coding::LineCoding;

/// CDC packet size, also the staging buffer capacity
const MAX_PACKET_SIZE: usize = 64;

pub struct CdcPort {
    tx: Sender<'static, Driver<'static>>,
    rx: Receiver<'static, Driver<'static>>,
    /// Bytes pulled off the OUT endpoint, not yet consumed by the bridge
    staged: heapless::Vec<u8, MAX_PACKET_SIZE>,
}

impl CdcPort {
    pub fn new(
        tx: Sender<'static, Driver<'static>>,
        rx: Receiver<'static, Driver<'static>>,
    ) -> Self {
        Self {
            tx,
            rx,
            staged: heapless::Vec::new(),
        }
    }

    /// True once the host has opened the port (DTR asserted)
    pub fn connected(&self) -> bool {
        self.tx.dtr()
    }

    /// Attempt to pull one packet off the OUT endpoint into the staging
    /// buffer. Call once per service loop iteration; a pending transfer
    /// simply leaves the staging buffer as it was.
    pub fn pump(&mut self) {
        if !self.staged.is_empty() {
            return;
        }
        let mut packet = [0u8; MAX_PACKET_SIZE];
        if let core::task::Poll::Ready(Ok(n)) = poll_once(self.rx.read_packet(&mut packet)) {
            // Staging buffer is empty and sized to one packet; cannot fail
            let _ = self.staged.extend_from_slice(&packet[..n]);
        }
    }
}

impl UsbSerial for CdcPort {
    fn available(&self) -> usize {
        self.staged.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.staged.len());
        buf[..count].copy_from_slice(&self.staged[..count]);
        let remaining = self.staged.len() - count;
        self.staged.copy_within(count.., 0);
        self.staged.truncate(remaining);
        count
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let chunk = data.len().min(MAX_PACKET_SIZE);
        if chunk == 0 {
            return 0;
        }
        match poll_once(self.tx.write_packet(&data[..chunk])) {
            core::task::Poll::Ready(Ok(())) => chunk,
            _ => 0,
        }
    }

    fn flush(&mut self) {
        // Terminate the bulk transfer so the host delivers a short packet
        // immediately
        let _ = poll_once(self.tx.write_packet(&[]));
    }

    // TODO: embassy-usb 0.5's CDC-ACM control handler rejects the class
    // SEND_BREAK request and exposes no callback for it, so nothing here can
    // observe a host break yet. Once embassy-usb surfaces the request, call
    // BridgeInterface::request_break from that path; the USB-side task
    // already executes pending requests.

    fn line_coding(&self) -> LineCoding {
        let coding = self.tx.line_coding();
        LineCoding {
            baud_rate: coding.data_rate(),
            data_bits: coding.data_bits(),
            parity: match coding.parity_type() {
                ParityType::None => 0,
                ParityType::Odd => 1,
                ParityType::Even => 2,
                ParityType::Mark => 3,
                ParityType::Space => 4,
            },
            stop_bits: match coding.stop_bits() {
                StopBits::One => 0,
                StopBits::OnePointFive => 1,
                StopBits::Two => 2,
            },
        }
    }
}
