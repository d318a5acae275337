//! Placeholder MMIO window.
//!
//! Reserves an address range under a name without modelling any registers: reads
//! return zero and writes are dropped. Boards mapped with
//! [`Placeholders`](crate::soc::factory::Placeholders) consist of these windows plus
//! real memories, which is enough to inspect the layout and boot ROM.

use crate::soc::traits::Device;

/// An inert, named MMIO range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MmioWindow {
    name: String,
    base: u64,
    size: u64,
}

impl MmioWindow {
    /// Creates a window covering `[base, base + size)`.
    pub fn new(name: impl Into<String>, base: u64, size: u64) -> Self {
        Self {
            name: name.into(),
            base,
            size,
        }
    }
}

impl Device for MmioWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base, self.size)
    }

    fn read_u8(&mut self, _offset: u64) -> u8 {
        0
    }

    fn read_u16(&mut self, _offset: u64) -> u16 {
        0
    }

    fn read_u32(&mut self, _offset: u64) -> u32 {
        0
    }

    fn read_u64(&mut self, _offset: u64) -> u64 {
        0
    }

    fn write_u8(&mut self, _offset: u64, _val: u8) {}

    fn write_u16(&mut self, _offset: u64, _val: u16) {}

    fn write_u32(&mut self, _offset: u64, _val: u32) {}

    fn write_u64(&mut self, _offset: u64, _val: u64) {}
}
