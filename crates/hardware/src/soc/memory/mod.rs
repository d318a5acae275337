//! Board Memories.
//!
//! This module implements the memories mapped by the board. It provides:
//! 1. **Buffer:** Lazily committed host storage ([`RamBuffer`]) for RAM contents.
//! 2. **RAM:** Read/write memory (SRAM, DRAM) over a `RamBuffer`.
//! 3. **ROM:** Mask ROM that ignores guest writes but accepts construction-time blobs.
//!
//! Out-of-range accesses read as zero and drop writes; the address space never routes
//! them here, so this only matters for accesses straddling the end of a region.

/// RAM buffer implementation (mmap or heap) for raw byte storage.
pub mod buffer;

use std::io;

use self::buffer::RamBuffer;
use crate::soc::traits::Device;

fn read_le<const N: usize>(bytes: &[u8], offset: u64) -> [u8; N] {
    let mut out = [0u8; N];
    let start = offset as usize;
    if let Some(src) = start.checked_add(N).and_then(|end| bytes.get(start..end)) {
        out.copy_from_slice(src);
    }
    out
}

fn write_le(bytes: &mut [u8], offset: u64, data: &[u8]) -> bool {
    let start = offset as usize;
    match start.checked_add(data.len()).and_then(|end| bytes.get_mut(start..end)) {
        Some(dst) => {
            dst.copy_from_slice(data);
            true
        }
        None => false,
    }
}

/// Read/write memory.
#[derive(Debug)]
pub struct Ram {
    name: String,
    base: u64,
    buffer: RamBuffer,
}

impl Ram {
    /// Allocates `size` bytes of zeroed RAM at `base`.
    ///
    /// # Errors
    ///
    /// Returns the host allocation error.
    pub fn new(name: impl Into<String>, base: u64, size: u64) -> io::Result<Self> {
        let size = usize::try_from(size)
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "RAM size exceeds host address space"))?;
        Ok(Self {
            name: name.into(),
            base,
            buffer: RamBuffer::new(size)?,
        })
    }

    /// Contents of the memory.
    pub fn contents(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl Device for Ram {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base, self.buffer.len() as u64)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        u8::from_le_bytes(read_le(self.buffer.as_slice(), offset))
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        u16::from_le_bytes(read_le(self.buffer.as_slice(), offset))
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        u32::from_le_bytes(read_le(self.buffer.as_slice(), offset))
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        u64::from_le_bytes(read_le(self.buffer.as_slice(), offset))
    }

    fn write_u8(&mut self, offset: u64, val: u8) {
        let _ = write_le(self.buffer.as_mut_slice(), offset, &[val]);
    }

    fn write_u16(&mut self, offset: u64, val: u16) {
        let _ = write_le(self.buffer.as_mut_slice(), offset, &val.to_le_bytes());
    }

    fn write_u32(&mut self, offset: u64, val: u32) {
        let _ = write_le(self.buffer.as_mut_slice(), offset, &val.to_le_bytes());
    }

    fn write_u64(&mut self, offset: u64, val: u64) {
        let _ = write_le(self.buffer.as_mut_slice(), offset, &val.to_le_bytes());
    }

    fn load_bytes(&mut self, offset: u64, data: &[u8]) -> bool {
        write_le(self.buffer.as_mut_slice(), offset, data)
    }
}

/// Read-only memory, writable only while the board is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rom {
    name: String,
    base: u64,
    bytes: Vec<u8>,
}

impl Rom {
    /// Creates `size` bytes of zeroed ROM at `base`.
    pub fn new(name: impl Into<String>, base: u64, size: usize) -> Self {
        Self {
            name: name.into(),
            base,
            bytes: vec![0; size],
        }
    }

    /// Contents of the memory.
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }
}

impl Device for Rom {
    fn name(&self) -> &str {
        &self.name
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base, self.bytes.len() as u64)
    }

    fn read_u8(&mut self, offset: u64) -> u8 {
        u8::from_le_bytes(read_le(&self.bytes, offset))
    }

    fn read_u16(&mut self, offset: u64) -> u16 {
        u16::from_le_bytes(read_le(&self.bytes, offset))
    }

    fn read_u32(&mut self, offset: u64) -> u32 {
        u32::from_le_bytes(read_le(&self.bytes, offset))
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        u64::from_le_bytes(read_le(&self.bytes, offset))
    }

    // Guest stores to ROM are ignored.
    fn write_u8(&mut self, _offset: u64, _val: u8) {}

    fn write_u16(&mut self, _offset: u64, _val: u16) {}

    fn write_u32(&mut self, _offset: u64, _val: u32) {}

    fn write_u64(&mut self, _offset: u64, _val: u64) {}

    fn load_bytes(&mut self, offset: u64, data: &[u8]) -> bool {
        write_le(&mut self.bytes, offset, data)
    }
}
