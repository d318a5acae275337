//! Device trait for memory-mapped I/O.
//!
//! This module defines the `Device` trait implemented by everything mapped into an
//! [`AddressSpace`](crate::soc::interconnect::AddressSpace). It provides:
//! 1. **Identification:** `name` and `address_range` for routing and overlap checks.
//! 2. **Access:** Byte, half, word, and doubleword read/write at device-relative offsets.
//! 3. **Loading:** Construction-time blob placement that bypasses guest write protection.
//!
//! All implementors must be `Send + Sync` so a finished board can be handed to the
//! threads that run the harts.

/// Trait for memory-mapped devices and memories attached to an address space.
pub trait Device: Send + Sync {
    /// Returns a short name for this device (e.g., `"UART0"`, `"DRAM"`).
    fn name(&self) -> &str;
    /// Returns (base_address, size_in_bytes) for this device's MMIO or memory region.
    fn address_range(&self) -> (u64, u64);
    /// Reads one byte at the given device-relative offset.
    fn read_u8(&mut self, offset: u64) -> u8;
    /// Reads two bytes (little-endian) at the given offset.
    fn read_u16(&mut self, offset: u64) -> u16;
    /// Reads four bytes (little-endian) at the given offset.
    fn read_u32(&mut self, offset: u64) -> u32;
    /// Reads eight bytes (little-endian) at the given offset.
    fn read_u64(&mut self, offset: u64) -> u64;
    /// Writes one byte at the given offset.
    fn write_u8(&mut self, offset: u64, val: u8);
    /// Writes two bytes (little-endian) at the given offset.
    fn write_u16(&mut self, offset: u64, val: u16);
    /// Writes four bytes (little-endian) at the given offset.
    fn write_u32(&mut self, offset: u64, val: u32);
    /// Writes eight bytes (little-endian) at the given offset.
    fn write_u64(&mut self, offset: u64, val: u64);

    /// Places `data` at `offset` while the machine is being built.
    ///
    /// Unlike the `write_*` methods this also fills read-only memories. Returns `false`
    /// if the device has no backing store or the data does not fit.
    fn load_bytes(&mut self, _offset: u64, _data: &[u8]) -> bool {
        false
    }
}
