//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the register width model, opcode tables, and the encoders used to
//! synthesize boot code.
//!
//! # Modules
//!
//! * `abi`: Calling-convention register numbers.
//! * `opcodes`: Major opcodes, function codes, and CSR numbers.
//! * `encode`: Field packing for I/U-type instructions.
//! * `mode`: Privilege levels.

use std::fmt;

use crate::common::UnsupportedArchitecture;

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Instruction encoders (I-type, U-type, and common mnemonics).
pub mod encode;

/// Privilege modes (M/S/U).
pub mod mode;

/// Opcodes, function codes, and CSR addresses.
pub mod opcodes;

/// Native integer register width of a hart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Xlen {
    /// 32-bit harts (RV32).
    Rv32,
    /// 64-bit harts (RV64).
    Rv64,
}

impl Xlen {
    /// Returns the register width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Rv32 => 32,
            Self::Rv64 => 64,
        }
    }
}

impl TryFrom<u32> for Xlen {
    type Error = UnsupportedArchitecture;

    fn try_from(width: u32) -> Result<Self, Self::Error> {
        match width {
            32 => Ok(Self::Rv32),
            64 => Ok(Self::Rv64),
            width => Err(UnsupportedArchitecture { width }),
        }
    }
}

impl fmt::Display for Xlen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RV{}", self.bits())
    }
}
