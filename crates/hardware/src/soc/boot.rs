//! Reset vector synthesis.
//!
//! Every hart starts at the mask ROM base. The ROM holds a ten-word stub that reads the
//! hart id, loads the next-stage entry point and device-tree pointer from the data words
//! that follow the code, and jumps:
//!
//! ```text
//!  0: auipc t0, 0            t0 = ROM base
//!  1: addi  a2, t0, 40       a2 = address just past the stub
//!  2: csrr  a0, mhartid      a0 = hart id
//!  3: lw/ld a1, 32(t0)       a1 = device-tree pointer (word 8)
//!  4: lw/ld t0, 24(t0)       t0 = entry point (words 6..7)
//!  5: jr    t0
//!  6: entry[31:0]
//!  7: entry[63:32]           zero on RV32
//!  8: fdt
//!  9: 0
//! ```
//!
//! The words are serialized little-endian regardless of the host byte order.

use crate::common::{LayoutError, UnsupportedArchitecture};
use crate::isa::Xlen;
use crate::isa::abi::{REG_A0, REG_A1, REG_A2, REG_T0};
use crate::isa::encode::{addi, auipc, csrr, jr, load_native};
use crate::isa::opcodes::CSR_MHARTID;
use crate::soc::interconnect::AddressSpace;

/// Number of 32-bit words in the reset vector.
pub const RESET_VECTOR_WORDS: usize = 10;

/// Size of the reset vector in bytes.
pub const RESET_VECTOR_BYTES: usize = RESET_VECTOR_WORDS * 4;

/// Name under which the reset vector is placed in the address space.
pub const RESET_VECTOR_BLOB: &str = "mrom.reset";

/// Byte offset of the entry-point data word.
const ENTRY_OFFSET: i32 = 24;

/// Byte offset of the device-tree pointer data word.
const FDT_OFFSET: i32 = 32;

/// The synthesized boot stub.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResetVector {
    words: [u32; RESET_VECTOR_WORDS],
}

impl ResetVector {
    /// Builds the stub for `xlen` harts jumping to `entry` with `fdt` in `a1`.
    ///
    /// On RV32 only the low half of `entry` is reachable; word 7 is zero.
    pub fn synthesize(xlen: Xlen, entry: u64, fdt: u32) -> Self {
        let entry_hi = match xlen {
            Xlen::Rv32 => 0,
            Xlen::Rv64 => (entry >> 32) as u32,
        };
        Self {
            words: [
                auipc(REG_T0, 0),
                addi(REG_A2, REG_T0, RESET_VECTOR_BYTES as i32),
                csrr(REG_A0, CSR_MHARTID),
                load_native(xlen, REG_A1, REG_T0, FDT_OFFSET),
                load_native(xlen, REG_T0, REG_T0, ENTRY_OFFSET),
                jr(REG_T0),
                entry as u32,
                entry_hi,
                fdt,
                0,
            ],
        }
    }

    /// Same as [`Self::synthesize`], taking the register width in bits.
    ///
    /// # Errors
    ///
    /// [`UnsupportedArchitecture`] for any width other than 32 or 64.
    pub fn synthesize_for_width(width: u32, entry: u64, fdt: u32) -> Result<Self, UnsupportedArchitecture> {
        Ok(Self::synthesize(Xlen::try_from(width)?, entry, fdt))
    }

    /// The ten instruction/data words.
    pub fn words(&self) -> &[u32; RESET_VECTOR_WORDS] {
        &self.words
    }

    /// Serializes the words little-endian.
    pub fn to_le_bytes(&self) -> [u8; RESET_VECTOR_BYTES] {
        let mut out = [0u8; RESET_VECTOR_BYTES];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Writes the stub into `space` at `rom_base`.
    ///
    /// # Errors
    ///
    /// See [`AddressSpace::load_blob_fixed`].
    pub fn place(&self, space: &mut AddressSpace, rom_base: u64) -> Result<(), LayoutError> {
        space.load_blob_fixed(RESET_VECTOR_BLOB, &self.to_le_bytes(), rom_base)
    }
}
