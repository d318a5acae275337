//! System-on-Chip (SoC) Components.
//!
//! This module organizes the pieces that make up the board: the memory map, socket
//! topology, interrupt fabric, boot code, peripheral wiring, and the builder that
//! assembles them into an address space.

/// Reset vector synthesis.
pub mod boot;

/// Board builder.
pub mod builder;

/// Interrupt controller descriptors and peripheral creation parameters.
pub mod devices;

/// Per-socket interrupt controllers and line allocation.
pub mod fabric;

/// Device-model factory seam.
pub mod factory;

/// Physical address space and access routing.
pub mod interconnect;

/// Physical memory map.
pub mod memmap;

/// ROM and RAM devices.
pub mod memory;

/// Interrupt routing policy for shared peripherals.
pub mod routing;

/// Socket validation and hart arrays.
pub mod topology;

/// Device trait definitions for MMIO access.
pub mod traits;

/// Peripheral placement and interrupt wiring.
pub mod wiring;

pub use builder::Board;
pub use interconnect::AddressSpace;
