//! On-board Devices.
//!
//! This module describes the devices the board instantiates: the per-socket interrupt
//! controllers (ACLINT, PLIC), the peripheral creation parameters (serial, virtio-mmio,
//! flash, fw_cfg), and an inert MMIO window used when no device model is supplied.

/// Advanced Core Local Interruptor (software interrupts and machine timer).
pub mod aclint;

/// Serial, virtio-mmio, flash, and firmware-config creation parameters.
pub mod peripherals;

/// Platform-Level Interrupt Controller (PLIC).
pub mod plic;

/// Inert placeholder MMIO range.
pub mod window;

pub use aclint::LocalTimer;
pub use peripherals::{FlashConfig, FwCfgConfig, SerialConfig, VirtioMmioConfig};
pub use plic::Plic;
pub use window::MmioWindow;

pub use crate::soc::traits::Device;
