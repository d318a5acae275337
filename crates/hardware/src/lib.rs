//! Quard Star board composition library.
//!
//! This crate assembles the multi-socket RISC-V "Quard Star" board with the following:
//! 1. **Topology:** Validates sockets and hart ids and creates one hart array per socket.
//! 2. **Layout:** A fixed physical memory map, checked for overlaps against the RAM size.
//! 3. **Interrupts:** Per-socket ACLINT and PLIC instances and a routing policy for
//!    shared peripherals.
//! 4. **Boot:** A bit-exact, little-endian reset vector in mask ROM.
//! 5. **Wiring:** Serial ports, virtio-mmio slots, flash, and fw_cfg, created through a
//!    pluggable device factory.
//!
//! ```
//! use quard_star_core::soc::factory::Placeholders;
//! use quard_star_core::{AddressSpace, Board, MachineConfig};
//!
//! let config = MachineConfig { ram_size: 0x10_0000, ..MachineConfig::default() };
//! let mut space = AddressSpace::new();
//! let board = Board::build(&config, &mut space, &mut Placeholders).unwrap();
//! assert_eq!(space.read_u32(0x0), 0x0000_0297);
//! assert_eq!(board.sockets.len(), 1);
//! ```

/// Common types and constants (platform limits, errors).
pub mod common;
/// Machine configuration (defaults, CPU types, NUMA layout).
pub mod config;
/// Instruction set pieces used for boot code (register width, opcodes, encoders).
pub mod isa;
/// System-on-chip (memory map, topology, interrupts, boot, wiring, builder).
pub mod soc;

/// Machine configuration; use `MachineConfig::default()` or deserialize from JSON.
pub use crate::config::MachineConfig;
/// Physical address space the board is built into.
pub use crate::soc::AddressSpace;
/// Constructed board; build with `Board::build`.
pub use crate::soc::Board;
