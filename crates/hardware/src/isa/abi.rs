//! RISC-V ABI register numbers used by the boot stub.
//!
//! The reset vector hands over to the next stage with the standard calling
//! convention: `a0` = hart id, `a1` = device-tree pointer, `a2` = dynamic
//! firmware info.

/// Register x0 (hard-wired zero).
pub const REG_ZERO: u32 = 0;
/// Register x5 (temporary, t0).
pub const REG_T0: u32 = 5;
/// Register x10 (first argument, a0).
pub const REG_A0: u32 = 10;
/// Register x11 (second argument, a1).
pub const REG_A1: u32 = 11;
/// Register x12 (third argument, a2).
pub const REG_A2: u32 = 12;
