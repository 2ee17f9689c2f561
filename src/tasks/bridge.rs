//! The two persistent bridge loops.
//!
//! The USB-side task owns the CDC endpoint and signals readiness once; the
//! UART-side task waits for that signal, then both run independently until
//! reset. Neither loop accepts cancellation. Each pass is short and ends in
//! a cooperative yield so the executor stays responsive.

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::UsbDevice;
use esp_hal::otg_fs::asynch::Driver;

use crate::bridge::{send_break, BridgeInterface};
use crate::config::bridge::NUM_INTERFACES;
use crate::uart::BridgeUart;
use crate::usb::CdcPort;

/// Per-interface bridge state, shared with the RX interrupt handler
pub static BRIDGES: [BridgeInterface; NUM_INTERFACES] =
    [const { BridgeInterface::new() }; NUM_INTERFACES];

/// One-shot readiness handoff from the USB-side task to the UART-side task
pub static USB_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// USB device state machine; protocol events (line-coding changes, control
/// transfers) are processed inside `run()`
#[embassy_executor::task]
pub async fn usb_device_task(mut device: UsbDevice<'static, Driver<'static>>) {
    device.run().await
}

/// USB-side loop: once the host has the port open, pull host bytes into
/// the bridge and push UART bytes back out.
///
/// The reference configuration wires one CDC endpoint; `port` serves
/// interface 0.
#[embassy_executor::task]
pub async fn usb_bridge_task(mut port: CdcPort) {
    USB_READY.signal(());
    log::info!("usb bridge running");

    // Break requests execute here, on the context that services the USB
    // control traffic; a timed hold suspends this loop for its duration,
    // which is acceptable because the requesting host is waiting on the
    // control transfer anyway
    let mut uart = BridgeUart::new(0);
    let mut delay = embassy_time::Delay;

    loop {
        port.pump();
        if port.connected() {
            BRIDGES[0].service_usb(&mut port);
        }
        if let Some(duration_ms) = BRIDGES[0].take_break_request() {
            send_break(&mut uart, &mut delay, duration_ms).await;
        }
        yield_now().await;
    }
}

/// UART-side loop: converge the hardware line coding and emit at most one
/// byte per interface per pass, round-robin
#[embassy_executor::task]
pub async fn uart_bridge_task() {
    USB_READY.wait().await;
    log::info!("uart bridge running");

    let mut uarts: [BridgeUart; NUM_INTERFACES] = core::array::from_fn(BridgeUart::new);

    loop {
        for (bridge, uart) in BRIDGES.iter().zip(uarts.iter_mut()) {
            bridge.service_uart(uart);
        }
        yield_now().await;
    }
}
