//! Common types and constants shared by the board components.
//!
//! This module provides:
//! 1. **Constants:** Platform limits, controller geometry, and interrupt line numbers.
//! 2. **Error Handling:** Configuration, layout, and architecture errors.

/// Platform constants (socket limits, ACLINT/PLIC layout, IRQ numbers).
pub mod constants;

/// Error types for board construction.
pub mod error;

pub use constants::{CPUS_MAX, SOCKETS_MAX};
pub use error::{BoardError, ConfigError, LayoutError, UnsupportedArchitecture};
