//! RISC-V opcodes, function codes, and CSR numbers.
//!
//! Only the encodings the boot stub is built from are listed here.

/// Load instructions (LB, LH, LW, LD, etc.).
pub const OP_LOAD: u32 = 0b0000011;

/// Immediate arithmetic instructions (ADDI, ANDI, SLLI, etc.).
pub const OP_IMM: u32 = 0b0010011;

/// Add Upper Immediate to PC (AUIPC).
pub const OP_AUIPC: u32 = 0b0010111;

/// Jump and Link Register (JALR).
pub const OP_JALR: u32 = 0b1100111;

/// System instructions (CSR access, ECALL, xRET, WFI).
pub const OP_SYSTEM: u32 = 0b1110011;

/// funct3 of ADDI.
pub const ADDI: u32 = 0b000;

/// funct3 of LW (load word, sign-extended).
pub const LW: u32 = 0b010;

/// funct3 of LD (load doubleword, RV64 only).
pub const LD: u32 = 0b011;

/// funct3 of JALR.
pub const JALR: u32 = 0b000;

/// funct3 of CSRRS (CSR read and set bits); with `rs1 = x0` this is `csrr`.
pub const CSRRS: u32 = 0b010;

/// Hart ID Register.
pub const CSR_MHARTID: u32 = 0xF14;
