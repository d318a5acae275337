//! Physical address space.
//!
//! This module implements the address space that routes physical accesses to devices. It provides:
//! 1. **Mapping:** Devices are added by address range; overlapping ranges are rejected.
//! 2. **Access routing:** Read/write by address with a last-device hint for throughput.
//! 3. **Blob placement:** Construction-time loading of fixed images into ROM/RAM.
//! 4. **Merging:** A staged space can be folded into another in one pre-checked step.
//!
//! The address space is an explicit value. Boards are built into a caller-supplied space,
//! so independent machines can coexist in one process.

use tracing::{debug, trace};

use crate::common::LayoutError;
use crate::soc::memmap::check_disjoint;
use crate::soc::traits::Device;

/// Record of a blob placed by [`AddressSpace::load_blob_fixed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedBlob {
    /// Blob name.
    pub name: String,
    /// Physical address of the first byte.
    pub addr: u64,
    /// Length in bytes.
    pub len: usize,
}

/// A mapped range, as reported by [`AddressSpace::regions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedRegion {
    /// Device name.
    pub name: String,
    /// Base physical address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
}

/// Physical address space; routes accesses by physical address.
///
/// Holds the mapped devices sorted by base address and the list of blobs placed while
/// the board was built.
#[derive(Default)]
pub struct AddressSpace {
    devices: Vec<Box<dyn Device>>,
    blobs: Vec<PlacedBlob>,
    last_device_idx: usize,
}

impl std::fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSpace")
            .field("regions", &self.regions())
            .field("blobs", &self.blobs)
            .finish_non_exhaustive()
    }
}

impl AddressSpace {
    /// Creates an empty address space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a device at the range it reports.
    ///
    /// Zero-sized devices are accepted and never match an access.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Overlap`] if the range intersects a mapped device; the space is
    /// left unchanged.
    pub fn map(&mut self, dev: Box<dyn Device>) -> Result<(), LayoutError> {
        let (base, size) = dev.address_range();
        let mut spans = self.spans();
        spans.push((dev.name().to_string(), base, size));
        check_disjoint(spans)?;
        trace!(name = dev.name(), base = format_args!("{base:#x}"), size = format_args!("{size:#x}"), "mapped");
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.last_device_idx = 0;
        Ok(())
    }

    /// Moves every device and blob record of `other` into this space.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Overlap`] if any range of `other` intersects this space; nothing is
    /// moved in that case.
    pub fn absorb(&mut self, other: Self) -> Result<(), LayoutError> {
        let mut spans = self.spans();
        spans.extend(other.spans());
        check_disjoint(spans)?;
        debug!(devices = other.devices.len(), "address space merged");
        self.devices.extend(other.devices);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.blobs.extend(other.blobs);
        self.last_device_idx = 0;
        Ok(())
    }

    /// Writes `data` at `addr`, bypassing guest write protection.
    ///
    /// # Errors
    ///
    /// [`LayoutError::NoDeviceAt`] if nothing is mapped at `addr`, and
    /// [`LayoutError::BlobOutOfRange`] if the blob does not fit the device there or the
    /// device cannot be loaded.
    pub fn load_blob_fixed(&mut self, name: &str, data: &[u8], addr: u64) -> Result<(), LayoutError> {
        let (dev, offset) = self.find_device(addr).ok_or_else(|| LayoutError::NoDeviceAt {
            name: name.to_string(),
            addr,
        })?;
        let (_, size) = dev.address_range();
        let fits = (data.len() as u64) <= size - offset;
        if !fits || !dev.load_bytes(offset, data) {
            return Err(LayoutError::BlobOutOfRange {
                name: name.to_string(),
                addr,
                len: data.len(),
            });
        }
        debug!(name, addr = format_args!("{addr:#x}"), len = data.len(), "blob placed");
        self.blobs.push(PlacedBlob {
            name: name.to_string(),
            addr,
            len: data.len(),
        });
        Ok(())
    }

    /// Blobs placed so far, in placement order.
    pub fn blobs(&self) -> &[PlacedBlob] {
        &self.blobs
    }

    /// Mapped ranges in ascending address order.
    pub fn regions(&self) -> Vec<MappedRegion> {
        self.devices
            .iter()
            .map(|d| {
                let (base, size) = d.address_range();
                MappedRegion {
                    name: d.name().to_string(),
                    base,
                    size,
                }
            })
            .collect()
    }

    /// Returns the name of the device mapped at `paddr`.
    pub fn device_name_at(&self, paddr: u64) -> Option<&str> {
        self.devices
            .iter()
            .find(|d| contains(d.as_ref(), paddr))
            .map(|d| d.name())
    }

    /// Returns whether the given physical address is backed by any device.
    pub fn is_valid_address(&self, paddr: u64) -> bool {
        self.devices.iter().any(|d| contains(d.as_ref(), paddr))
    }

    /// Copies `len` bytes starting at `paddr`; unmapped bytes read as zero.
    pub fn read_bytes(&mut self, paddr: u64, len: usize) -> Vec<u8> {
        (0..len as u64).map(|i| self.read_u8(paddr + i)).collect()
    }

    fn spans(&self) -> Vec<(String, u64, u64)> {
        self.devices
            .iter()
            .map(|d| {
                let (base, size) = d.address_range();
                (d.name().to_string(), base, size)
            })
            .collect()
    }

    fn find_device(&mut self, paddr: u64) -> Option<(&mut Box<dyn Device>, u64)> {
        if let Some(dev) = self.devices.get(self.last_device_idx) {
            if contains(dev.as_ref(), paddr) {
                let start = dev.address_range().0;
                return Some((&mut self.devices[self.last_device_idx], paddr - start));
            }
        }

        let idx = self.devices.iter().position(|d| contains(d.as_ref(), paddr))?;
        self.last_device_idx = idx;
        let dev = &mut self.devices[idx];
        let start = dev.address_range().0;
        Some((dev, paddr - start))
    }

    /// Reads one byte at the given physical address; returns 0 if no device claims the address.
    pub fn read_u8(&mut self, paddr: u64) -> u8 {
        self.find_device(paddr).map_or(0, |(dev, offset)| dev.read_u8(offset))
    }
    /// Reads two bytes (little-endian) at the given physical address; returns 0 if unclaimed.
    pub fn read_u16(&mut self, paddr: u64) -> u16 {
        self.find_device(paddr).map_or(0, |(dev, offset)| dev.read_u16(offset))
    }
    /// Reads four bytes (little-endian) at the given physical address; returns 0 if unclaimed.
    pub fn read_u32(&mut self, paddr: u64) -> u32 {
        self.find_device(paddr).map_or(0, |(dev, offset)| dev.read_u32(offset))
    }
    /// Reads eight bytes (little-endian) at the given physical address; returns 0 if unclaimed.
    pub fn read_u64(&mut self, paddr: u64) -> u64 {
        self.find_device(paddr).map_or(0, |(dev, offset)| dev.read_u64(offset))
    }
    /// Writes one byte at the given physical address; no-op if no device claims it.
    pub fn write_u8(&mut self, paddr: u64, val: u8) {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.write_u8(offset, val);
        }
    }
    /// Writes two bytes (little-endian) at the given physical address; no-op if unclaimed.
    pub fn write_u16(&mut self, paddr: u64, val: u16) {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.write_u16(offset, val);
        }
    }
    /// Writes four bytes (little-endian) at the given physical address; no-op if unclaimed.
    pub fn write_u32(&mut self, paddr: u64, val: u32) {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.write_u32(offset, val);
        }
    }
    /// Writes eight bytes (little-endian) at the given physical address; no-op if unclaimed.
    pub fn write_u64(&mut self, paddr: u64, val: u64) {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.write_u64(offset, val);
        }
    }
}

fn contains(dev: &dyn Device, paddr: u64) -> bool {
    let (start, size) = dev.address_range();
    paddr >= start && paddr - start < size
}
