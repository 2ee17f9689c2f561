//! esp-hal UART glue: per-mode initialization, the RX interrupt producer
//! and the [`UartPort`] seam the UART-side context drives.
//!
//! The UART handle is shared between the interrupt handler (RX reads) and
//! the UART-side task (TX writes, reconfiguration) through a critical
//! section, so each access is a short bounded exclusive window.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use esp_hal::uart::{
    Config as HwConfig, DataBits as HwDataBits, Parity as HwParity, RxConfig,
    StopBits as HwStopBits, Uart, UartInterrupt,
};
use esp_hal::Blocking;

use crate::bridge::traits::UartPort;
use crate::config;
use crate::line_coding::{DataBits, LineCoding, Parity, StopBits};
use crate::tasks::BRIDGES;

/// Shared UART handles, one slot per interface
static UARTS: [Mutex<CriticalSectionRawMutex, RefCell<Option<Uart<'static, Blocking>>>>;
    config::bridge::NUM_INTERFACES] =
    [const { Mutex::new(RefCell::new(None)) }; config::bridge::NUM_INTERFACES];

/// Hardware config for the default line coding. FIFO threshold of one
/// preserves per-byte interrupt granularity; flow control stays disabled.
pub fn default_config() -> HwConfig {
    hw_config(&LineCoding::default())
}

fn hw_config(coding: &LineCoding) -> HwConfig {
    HwConfig::default()
        .with_baudrate(coding.baud_rate)
        .with_data_bits(data_bits(coding.hw_data_bits()))
        .with_parity(parity(coding.hw_parity()))
        .with_stop_bits(stop_bits(coding.hw_stop_bits()))
        .with_rx(RxConfig::default().with_fifo_full_threshold(1))
}

fn data_bits(bits: DataBits) -> HwDataBits {
    match bits {
        DataBits::Five => HwDataBits::_5,
        DataBits::Six => HwDataBits::_6,
        DataBits::Seven => HwDataBits::_7,
        DataBits::Eight => HwDataBits::_8,
    }
}

fn parity(parity: Parity) -> HwParity {
    match parity {
        Parity::None => HwParity::None,
        Parity::Odd => HwParity::Odd,
        Parity::Even => HwParity::Even,
    }
}

fn stop_bits(bits: StopBits) -> HwStopBits {
    match bits {
        StopBits::One => HwStopBits::_1,
        StopBits::Two => HwStopBits::_2,
    }
}

/// Install a configured UART into the shared slot for `index` and arm the
/// RX-available interrupt. Runs exactly once per interface at startup,
/// before the bridge tasks are spawned. The TX-empty interrupt stays
/// disabled; transmission is polled.
pub fn install(index: usize, mut uart: Uart<'static, Blocking>) {
    uart.set_interrupt_handler(rx_handler);
    uart.listen(UartInterrupt::RxFifoFull);
    UARTS[index].lock(|slot| {
        slot.replace(Some(uart));
    });
    log::info!("uart {} installed", index);
}

/// RX-available interrupt: move every received byte into the bridge.
///
/// Bytes are always taken off the hardware so the receive path cannot
/// stall; the bridge drops them if its buffer is full or contended.
#[esp_hal::handler]
fn rx_handler() {
    for (slot, bridge) in UARTS.iter().zip(BRIDGES.iter()) {
        slot.lock(|cell| {
            if let Some(uart) = cell.borrow_mut().as_mut() {
                let mut byte = [0u8; 1];
                while matches!(embedded_io::ReadReady::read_ready(uart), Ok(true)) {
                    if embedded_io::Read::read(uart, &mut byte).is_ok() {
                        bridge.uart_rx(byte[0]);
                    }
                }
                uart.clear_interrupts(UartInterrupt::RxFifoFull.into());
            }
        });
    }
}

/// [`UartPort`] seam for one interface, driven by the UART-side task
pub struct BridgeUart {
    index: usize,
    /// Shadow of the applied hardware config; esp-hal reprograms the
    /// peripheral from a full config struct
    shadow: LineCoding,
}

impl BridgeUart {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            shadow: LineCoding::default(),
        }
    }

    fn with_uart<R>(&self, f: impl FnOnce(&mut Uart<'static, Blocking>) -> R) -> Option<R> {
        UARTS[self.index].lock(|cell| cell.borrow_mut().as_mut().map(f))
    }

    fn apply_shadow(&self) {
        let hw = hw_config(&self.shadow);
        self.with_uart(|uart| {
            if let Err(err) = uart.apply_config(&hw) {
                log::warn!("uart {} reconfigure failed: {:?}", self.index, err);
            }
        });
    }
}

impl UartPort for BridgeUart {
    fn set_baud_rate(&mut self, baud_rate: u32) {
        self.shadow.baud_rate = baud_rate;
        self.apply_shadow();
    }

    fn set_format(&mut self, data_bits: DataBits, stop_bits: StopBits, parity: Parity) {
        self.shadow.data_bits = match data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        self.shadow.parity = match parity {
            Parity::None => 0,
            Parity::Odd => 1,
            Parity::Even => 2,
        };
        self.shadow.stop_bits = match stop_bits {
            StopBits::One => 0,
            StopBits::Two => 2,
        };
        self.apply_shadow();
    }

    fn set_break(&mut self, assert: bool) {
        // TODO: esp-hal 1.0 exposes no TX break control; wire this to the
        // conf0 txd_brk bit once the HAL grows an API for it
        log::warn!("uart {} break {} not applied", self.index, assert);
    }

    fn is_writable(&self) -> bool {
        self.with_uart(|uart| matches!(embedded_io::WriteReady::write_ready(uart), Ok(true)))
            .unwrap_or(false)
    }

    fn write_byte(&mut self, byte: u8) {
        self.with_uart(|uart| {
            let _ = embedded_io::Write::write(uart, &[byte]);
        });
    }
}
