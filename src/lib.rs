#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod config;
pub mod line_coding;
pub mod mode;

// These modules depend on esp-hal/embassy and are only available with the
// embedded feature
#[cfg(feature = "embedded")]
pub mod tasks;
#[cfg(feature = "embedded")]
pub mod uart;
#[cfg(feature = "embedded")]
pub mod usb;
