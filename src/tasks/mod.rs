//! Embassy tasks module
//!
//! The two bridge service loops plus the USB device state machine task.

pub mod bridge;

pub use bridge::{uart_bridge_task, usb_bridge_task, usb_device_task, BRIDGES, USB_READY};
