//! Instruction encoders.
//!
//! Builds 32-bit RISC-V instruction words from their fields. It provides:
//! 1. **Formats:** I-type and U-type field packing.
//! 2. **Mnemonics:** The handful of instructions used by boot stubs
//!    (`auipc`, `addi`, `csrr`, `lw`/`ld`, `jr`).
//!
//! Immediates are truncated to their field width; callers are expected to pass
//! values that fit.

use super::Xlen;
use super::abi::REG_ZERO;
use super::opcodes::{
    ADDI, CSRRS, JALR, LD, LW, OP_AUIPC, OP_IMM, OP_JALR, OP_LOAD, OP_SYSTEM,
};

/// Packs an I-type instruction: `imm[11:0] | rs1 | funct3 | rd | opcode`.
pub const fn i_type(opcode: u32, rd: u32, funct3: u32, rs1: u32, imm: i32) -> u32 {
    (((imm as u32) & 0xFFF) << 20)
        | ((rs1 & 0x1F) << 15)
        | ((funct3 & 0x7) << 12)
        | ((rd & 0x1F) << 7)
        | (opcode & 0x7F)
}

/// Packs a U-type instruction: `imm[31:12] | rd | opcode`.
///
/// `imm20` is the upper-immediate field value (already shifted down by 12).
pub const fn u_type(opcode: u32, rd: u32, imm20: u32) -> u32 {
    ((imm20 & 0xF_FFFF) << 12) | ((rd & 0x1F) << 7) | (opcode & 0x7F)
}

/// `auipc rd, imm20`
pub const fn auipc(rd: u32, imm20: u32) -> u32 {
    u_type(OP_AUIPC, rd, imm20)
}

/// `addi rd, rs1, imm`
pub const fn addi(rd: u32, rs1: u32, imm: i32) -> u32 {
    i_type(OP_IMM, rd, ADDI, rs1, imm)
}

/// `csrr rd, csr` (encoded as `csrrs rd, csr, x0`).
pub const fn csrr(rd: u32, csr: u32) -> u32 {
    i_type(OP_SYSTEM, rd, CSRRS, REG_ZERO, csr as i32)
}

/// Native-width load: `lw` on RV32, `ld` on RV64.
pub const fn load_native(xlen: Xlen, rd: u32, rs1: u32, offset: i32) -> u32 {
    let funct3 = match xlen {
        Xlen::Rv32 => LW,
        Xlen::Rv64 => LD,
    };
    i_type(OP_LOAD, rd, funct3, rs1, offset)
}

/// `jr rs1` (encoded as `jalr x0, 0(rs1)`).
pub const fn jr(rs1: u32) -> u32 {
    i_type(OP_JALR, REG_ZERO, JALR, rs1, 0)
}
