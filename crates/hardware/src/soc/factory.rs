//! Device-model factory.
//!
//! The board decides placement and interrupt wiring; the behaviour of each device comes
//! from a [`DeviceFactory`]. Every method receives the creation parameters of one device
//! and returns the model to map at the address they name.
//!
//! All methods have defaults that return an inert [`MmioWindow`] covering the device's
//! range, so a factory only overrides the models it actually provides.

use crate::soc::devices::aclint::{AclintMtimer, AclintSwi};
use crate::soc::devices::peripherals::{FlashConfig, FwCfgConfig, SerialConfig, VirtioMmioConfig};
use crate::soc::devices::plic::PlicConfig;
use crate::soc::devices::{Device, MmioWindow};

/// Source of device models for board construction.
pub trait DeviceFactory {
    /// Creates the machine-level software-interrupt block of one socket.
    fn aclint_swi(&mut self, swi: &AclintSwi) -> Box<dyn Device> {
        Box::new(MmioWindow::new(format!("aclint-swi{}", swi.socket), swi.base, swi.size))
    }

    /// Creates the machine timer of one socket.
    fn aclint_mtimer(&mut self, mtimer: &AclintMtimer) -> Box<dyn Device> {
        Box::new(MmioWindow::new(
            format!("aclint-mtimer{}", mtimer.socket),
            mtimer.base,
            mtimer.size,
        ))
    }

    /// Creates the PLIC of one socket.
    fn plic(&mut self, plic: &PlicConfig) -> Box<dyn Device> {
        Box::new(MmioWindow::new(
            format!("plic{}", plic.socket),
            plic.base,
            plic.aperture_size,
        ))
    }

    /// Creates a serial port.
    fn serial(&mut self, serial: &SerialConfig, size: u64) -> Box<dyn Device> {
        Box::new(MmioWindow::new(serial.name(), serial.base, size))
    }

    /// Creates a virtio-mmio transport.
    fn virtio_mmio(&mut self, virtio: &VirtioMmioConfig) -> Box<dyn Device> {
        Box::new(MmioWindow::new(virtio.name(), virtio.base, virtio.size))
    }

    /// Creates the boot flash.
    fn flash(&mut self, flash: &FlashConfig) -> Box<dyn Device> {
        Box::new(MmioWindow::new("flash", flash.base, flash.size))
    }

    /// Creates the firmware-config channel occupying `size` bytes.
    fn fw_cfg(&mut self, fw_cfg: &FwCfgConfig, size: u64) -> Box<dyn Device> {
        Box::new(MmioWindow::new("fw_cfg", fw_cfg.base, size))
    }
}

/// Factory that maps an inert window for every device.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placeholders;

impl DeviceFactory for Placeholders {}
