//! Creation parameters of the on-board peripherals.
//!
//! The board decides where each peripheral lives and which interrupt line it drives; the
//! device model that implements it receives one of these descriptors from the
//! [`DeviceFactory`](crate::soc::factory::DeviceFactory).

use crate::common::constants::{FLASH_BANK_WIDTH, FLASH_SECTOR_SIZE, UART_BAUDBASE};
use crate::soc::fabric::IrqLine;

/// A 16550-compatible serial port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port index (0 for `uart0`).
    pub index: usize,
    /// Base physical address.
    pub base: u64,
    /// Register spacing as a power of two (0 = byte-spaced registers).
    pub regshift: u32,
    /// Baud base of the divisor latch.
    pub baudbase: u32,
    /// Interrupt line.
    pub irq: IrqLine,
}

impl SerialConfig {
    /// Describes serial port `index` at `base`.
    pub fn new(index: usize, base: u64, irq: IrqLine) -> Self {
        Self {
            index,
            base,
            regshift: 0,
            baudbase: UART_BAUDBASE,
            irq,
        }
    }

    /// Device name (`"uart0"`, ...).
    pub fn name(&self) -> String {
        format!("uart{}", self.index)
    }
}

/// One virtio-mmio transport slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtioMmioConfig {
    /// Slot index.
    pub slot: usize,
    /// Base physical address.
    pub base: u64,
    /// Size of the register window.
    pub size: u64,
    /// Interrupt line.
    pub irq: IrqLine,
}

impl VirtioMmioConfig {
    /// Device name (`"virtio0"`, ...).
    pub fn name(&self) -> String {
        format!("virtio{}", self.slot)
    }
}

/// CFI parallel NOR boot flash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashConfig {
    /// Base physical address.
    pub base: u64,
    /// Total size in bytes.
    pub size: u64,
    /// Erase sector size in bytes.
    pub sector_size: u64,
    /// Bank width in bytes.
    pub bank_width: u32,
}

impl FlashConfig {
    /// Describes a flash device filling the region at `base`.
    pub fn new(base: u64, size: u64) -> Self {
        Self {
            base,
            size,
            sector_size: FLASH_SECTOR_SIZE,
            bank_width: FLASH_BANK_WIDTH,
        }
    }

    /// Number of erase sectors.
    pub fn sector_count(&self) -> u64 {
        self.size / self.sector_size
    }
}

/// Well-known firmware-config selector keys.
pub mod fw_cfg_keys {
    /// Interface signature (`"QEMU"`).
    pub const SIGNATURE: u16 = 0x00;
    /// Number of harts brought up at boot.
    pub const NB_CPUS: u16 = 0x05;
    /// Maximum number of harts.
    pub const MAX_CPUS: u16 = 0x0f;
    /// Main RAM size in bytes.
    pub const RAM_SIZE: u16 = 0x03;
}

/// A firmware-config item: selector key plus little-endian payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FwCfgItem {
    /// Selector key.
    pub key: u16,
    /// Payload bytes.
    pub data: Vec<u8>,
}

/// Memory-mapped firmware-config channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FwCfgConfig {
    /// Base physical address (the data register).
    pub base: u64,
    /// Selector (control) register address.
    pub ctl_addr: u64,
    /// Data register address.
    pub data_addr: u64,
    /// DMA address register.
    pub dma_addr: u64,
    /// Data register width in bytes.
    pub data_width: u32,
    /// Items exposed to the guest, in key order of insertion.
    pub items: Vec<FwCfgItem>,
}

impl FwCfgConfig {
    /// Describes the channel at `base` exposing the hart counts and RAM size.
    pub fn new(base: u64, nb_cpus: u16, max_cpus: u16, ram_size: u64) -> Self {
        let items = vec![
            FwCfgItem {
                key: fw_cfg_keys::SIGNATURE,
                data: b"QEMU".to_vec(),
            },
            FwCfgItem {
                key: fw_cfg_keys::NB_CPUS,
                data: nb_cpus.to_le_bytes().to_vec(),
            },
            FwCfgItem {
                key: fw_cfg_keys::MAX_CPUS,
                data: max_cpus.to_le_bytes().to_vec(),
            },
            FwCfgItem {
                key: fw_cfg_keys::RAM_SIZE,
                data: ram_size.to_le_bytes().to_vec(),
            },
        ];
        Self {
            base,
            ctl_addr: base + 8,
            data_addr: base,
            dma_addr: base + 16,
            data_width: 8,
            items,
        }
    }

    /// Returns the payload registered under `key`.
    pub fn item(&self, key: u16) -> Option<&[u8]> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.data.as_slice())
    }
}
