//! Peripheral wiring.
//!
//! Places the shared peripherals at their regions and connects their interrupt lines:
//!
//! | device            | address                     | line                          |
//! |-------------------|-----------------------------|-------------------------------|
//! | `uart0..=uart2`   | `UART0..UART2` regions      | 10, 11, 12 on the serial target |
//! | `virtio0..=7`     | `VIRTIO.base + i * size`    | `1 + i` on the virtio target  |
//! | flash             | `FLASH` region              | none                          |
//! | fw_cfg            | `FW_CFG` region             | none                          |
//!
//! The target controllers come from the fabric's routing table. A line is checked before
//! its device is created and claimed only once the device is mapped.

use std::fmt;

use tracing::info;

use crate::common::constants::{UART_COUNT, UART0_IRQ, VIRTIO_COUNT, VIRTIO_IRQ};
use crate::common::{CPUS_MAX, LayoutError};
use crate::soc::devices::peripherals::{FlashConfig, FwCfgConfig, SerialConfig, VirtioMmioConfig};
use crate::soc::fabric::{InterruptFabric, IrqLine};
use crate::soc::factory::DeviceFactory;
use crate::soc::interconnect::AddressSpace;
use crate::soc::memmap::{MemoryMap, RegionId};
use crate::soc::routing::DeviceClass;

const UART_REGIONS: [RegionId; UART_COUNT] = [RegionId::Uart0, RegionId::Uart1, RegionId::Uart2];

/// Which peripheral a binding describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Serial port `n`.
    Serial(usize),
    /// Virtio-mmio slot `n`.
    VirtioMmio(usize),
    /// Boot flash.
    Flash,
    /// Firmware-config channel.
    FwCfg,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(n) => write!(f, "uart{n}"),
            Self::VirtioMmio(n) => write!(f, "virtio{n}"),
            Self::Flash => f.write_str("flash"),
            Self::FwCfg => f.write_str("fw_cfg"),
        }
    }
}

/// Placement and interrupt line of one peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceBinding {
    /// Peripheral.
    pub kind: DeviceKind,
    /// Base physical address.
    pub region_base: u64,
    /// Interrupt line, for devices that raise interrupts.
    pub irq: Option<IrqLine>,
}

/// Wiring context: maps peripherals into `space` and records their bindings.
pub struct DeviceWiring<'a> {
    map: &'a MemoryMap,
    fabric: &'a mut InterruptFabric,
    space: &'a mut AddressSpace,
    factory: &'a mut dyn DeviceFactory,
    bindings: Vec<DeviceBinding>,
}

impl fmt::Debug for DeviceWiring<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceWiring")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl<'a> DeviceWiring<'a> {
    /// Creates a wiring context.
    pub fn new(
        map: &'a MemoryMap,
        fabric: &'a mut InterruptFabric,
        space: &'a mut AddressSpace,
        factory: &'a mut dyn DeviceFactory,
    ) -> Self {
        Self {
            map,
            fabric,
            space,
            factory,
            bindings: Vec::new(),
        }
    }

    /// Maps the serial ports on lines 10, 11 and 12.
    ///
    /// # Errors
    ///
    /// Overlapping ranges or unavailable interrupt lines.
    pub fn serial_ports(&mut self) -> Result<(), LayoutError> {
        for (index, id) in UART_REGIONS.into_iter().enumerate() {
            let region = self.map.region(id);
            let kind = DeviceKind::Serial(index);
            let irq = self
                .fabric
                .free_line(DeviceClass::Serial, UART0_IRQ + index as u32)?;
            let serial = SerialConfig::new(index, region.base, irq);
            let dev = self.factory.serial(&serial, region.size);
            self.space.map(dev)?;
            let _ = self.fabric.attach_to(irq.controller, irq.line, &kind.to_string())?;
            self.record(kind, region.base, Some(irq));
        }
        Ok(())
    }

    /// Maps the virtio-mmio slots on lines `1..=8`.
    ///
    /// # Errors
    ///
    /// Overlapping ranges or unavailable interrupt lines.
    pub fn virtio_slots(&mut self) -> Result<(), LayoutError> {
        let size = self.map.region(RegionId::Virtio).size;
        for slot in 0..VIRTIO_COUNT {
            let base = self.map.instance_base(RegionId::Virtio, slot);
            let kind = DeviceKind::VirtioMmio(slot);
            let irq = self
                .fabric
                .free_line(DeviceClass::VirtioMmio, VIRTIO_IRQ + slot as u32)?;
            let virtio = VirtioMmioConfig {
                slot,
                base,
                size,
                irq,
            };
            let dev = self.factory.virtio_mmio(&virtio);
            self.space.map(dev)?;
            let _ = self.fabric.attach_to(irq.controller, irq.line, &kind.to_string())?;
            self.record(kind, base, Some(irq));
        }
        Ok(())
    }

    /// Maps the boot flash.
    ///
    /// # Errors
    ///
    /// Overlapping ranges.
    pub fn flash(&mut self) -> Result<(), LayoutError> {
        let region = self.map.region(RegionId::Flash);
        let flash = FlashConfig::new(region.base, region.size);
        let dev = self.factory.flash(&flash);
        self.space.map(dev)?;
        self.record(DeviceKind::Flash, region.base, None);
        Ok(())
    }

    /// Maps the firmware-config channel advertising `nb_cpus` harts and `ram_size` bytes.
    ///
    /// # Errors
    ///
    /// Overlapping ranges.
    pub fn fw_cfg(&mut self, nb_cpus: u16, ram_size: u64) -> Result<(), LayoutError> {
        let region = self.map.region(RegionId::FwCfg);
        let fw_cfg = FwCfgConfig::new(region.base, nb_cpus, CPUS_MAX as u16, ram_size);
        let dev = self.factory.fw_cfg(&fw_cfg, region.size);
        self.space.map(dev)?;
        self.record(DeviceKind::FwCfg, region.base, None);
        Ok(())
    }

    /// Wires every peripheral of the board.
    ///
    /// # Errors
    ///
    /// The first error of any step.
    pub fn wire_all(&mut self, nb_cpus: u16, ram_size: u64) -> Result<(), LayoutError> {
        self.serial_ports()?;
        self.virtio_slots()?;
        self.flash()?;
        self.fw_cfg(nb_cpus, ram_size)
    }

    /// Ends wiring and returns the bindings in wiring order.
    pub fn finish(self) -> Vec<DeviceBinding> {
        self.bindings
    }

    fn record(&mut self, kind: DeviceKind, region_base: u64, irq: Option<IrqLine>) {
        match irq {
            Some(irq) => info!(
                device = %kind,
                base = format_args!("{region_base:#x}"),
                socket = irq.controller.socket,
                line = irq.line,
                "device wired"
            ),
            None => info!(device = %kind, base = format_args!("{region_base:#x}"), "device wired"),
        }
        self.bindings.push(DeviceBinding {
            kind,
            region_base,
            irq,
        });
    }
}
