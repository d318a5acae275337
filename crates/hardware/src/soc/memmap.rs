//! Physical memory map of the Quard Star board.
//!
//! The map is a constant table of named regions indexed by [`RegionId`]. Some regions are
//! replicated: the CLINT and PLIC windows repeat once per socket, and the virtio-mmio
//! window repeats once per transport slot. Replicas are laid out back to back with a
//! stride equal to the region size.
//!
//! Main RAM is declared with size 0; its real size is supplied by the machine
//! configuration and checked by [`MemoryMap::validate`].

use crate::common::LayoutError;
use crate::common::constants::{CPUS_MAX, SOCKETS_MAX, VIRTIO_COUNT, plic_size};

/// Stable identifiers of the board's address regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionId {
    /// Mask ROM holding the reset vector.
    Mrom,
    /// On-chip SRAM used by early boot stages.
    Sram,
    /// Per-socket ACLINT window (software interrupts + machine timer).
    Clint,
    /// Per-socket PLIC window.
    Plic,
    /// First 16550 serial port.
    Uart0,
    /// Second 16550 serial port.
    Uart1,
    /// Third 16550 serial port.
    Uart2,
    /// Firmware configuration channel.
    FwCfg,
    /// Virtio-mmio transport slots.
    Virtio,
    /// CFI boot flash.
    Flash,
    /// Main DRAM.
    Dram,
}

impl RegionId {
    /// Number of region identifiers.
    pub const COUNT: usize = 11;

    /// All region identifiers in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Mrom,
        Self::Sram,
        Self::Clint,
        Self::Plic,
        Self::Uart0,
        Self::Uart1,
        Self::Uart2,
        Self::FwCfg,
        Self::Virtio,
        Self::Flash,
        Self::Dram,
    ];

    /// Number of back-to-back copies of this region in the address space.
    pub const fn copies(self) -> u64 {
        match self {
            Self::Clint | Self::Plic => SOCKETS_MAX as u64,
            Self::Virtio => VIRTIO_COUNT as u64,
            _ => 1,
        }
    }
}

/// A named physical address region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Region name.
    pub name: &'static str,
    /// Base physical address.
    pub base: u64,
    /// Size in bytes of a single copy.
    pub size: u64,
}

impl Region {
    const fn new(name: &'static str, base: u64, size: u64) -> Self {
        Self { name, base, size }
    }
}

/// The board's physical address map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryMap {
    regions: [Region; RegionId::COUNT],
}

/// The Quard Star memory map.
pub static QUARD_STAR_MEMMAP: MemoryMap = MemoryMap::new([
    Region::new("mrom", 0x0, 0x8000),
    Region::new("sram", 0x8000, 0x8000),
    Region::new("clint", 0x0200_0000, 0x1_0000),
    Region::new("plic", 0x0c00_0000, plic_size(CPUS_MAX as u64 * 2)),
    Region::new("uart0", 0x1000_0000, 0x100),
    Region::new("uart1", 0x1000_1000, 0x100),
    Region::new("uart2", 0x1000_2000, 0x100),
    Region::new("fw_cfg", 0x1001_0000, 0x18),
    Region::new("virtio", 0x1010_0000, 0x1000),
    Region::new("flash", 0x2000_0000, 0x200_0000),
    Region::new("dram", 0x8000_0000, 0x0),
]);

impl MemoryMap {
    /// Creates a map from regions listed in [`RegionId::ALL`] order.
    pub const fn new(regions: [Region; RegionId::COUNT]) -> Self {
        Self { regions }
    }

    /// Returns a copy of this map with one region moved or resized.
    pub fn with_region(mut self, id: RegionId, base: u64, size: u64) -> Self {
        let region = &mut self.regions[id as usize];
        region.base = base;
        region.size = size;
        self
    }

    /// Looks up a region.
    pub fn region(&self, id: RegionId) -> Region {
        self.regions[id as usize]
    }

    /// Base address of copy `index` of a replicated region (socket or slot index).
    pub fn instance_base(&self, id: RegionId, index: usize) -> u64 {
        let region = self.region(id);
        region.base + index as u64 * region.size
    }

    /// Total bytes a region occupies, including all of its copies.
    ///
    /// `Dram` occupies `ram_size` bytes; `None` means it would overflow the address space.
    pub fn footprint(&self, id: RegionId, ram_size: u64) -> Option<u64> {
        if id == RegionId::Dram {
            let base = self.region(id).base;
            return base.checked_add(ram_size).map(|_| ram_size);
        }
        self.region(id).size.checked_mul(id.copies())
    }

    /// Checks that no two regions (with all their copies) overlap once RAM is sized.
    ///
    /// # Errors
    ///
    /// [`LayoutError::RamOverflow`] if RAM runs past the top of the address space, and
    /// [`LayoutError::Overlap`] for the first pair of overlapping regions.
    pub fn validate(&self, ram_size: u64) -> Result<(), LayoutError> {
        let mut spans = Vec::with_capacity(RegionId::COUNT);
        for id in RegionId::ALL {
            let region = self.region(id);
            let size = self.footprint(id, ram_size).ok_or(LayoutError::RamOverflow {
                base: region.base,
                size: ram_size,
            })?;
            if size > 0 {
                spans.push((region.name, region.base, size));
            }
        }
        check_disjoint(spans)
    }
}

/// Verifies that `(name, base, size)` spans are pairwise disjoint.
pub(crate) fn check_disjoint<N: ToString>(mut spans: Vec<(N, u64, u64)>) -> Result<(), LayoutError> {
    spans.retain(|&(_, _, size)| size != 0);
    spans.sort_by_key(|&(_, base, _)| base);
    for pair in spans.windows(2) {
        let (ref first, first_base, first_size) = pair[0];
        let (ref second, second_base, second_size) = pair[1];
        // Sorted by base, so the subtraction cannot underflow.
        if second_base - first_base < first_size {
            return Err(LayoutError::Overlap {
                first: first.to_string(),
                first_base,
                first_size,
                second: second.to_string(),
                second_base,
                second_size,
            });
        }
    }
    Ok(())
}
