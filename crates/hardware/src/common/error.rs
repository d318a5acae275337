//! Board construction errors.
//!
//! This module defines the error taxonomy of machine construction. It provides:
//! 1. **Configuration errors:** Invalid socket/hart topology or machine options; raised
//!    before any hardware object is created.
//! 2. **Layout errors:** Address-map and interrupt-line invariant violations. These indicate a
//!    broken platform definition rather than bad user input.
//! 3. **Architecture errors:** A register width other than 32 or 64 bits.
//! 4. **Board errors:** The umbrella type returned by the board builder.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid machine configuration, detected during topology validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// More sockets were requested than the board supports.
    #[error("number of sockets/nodes should be at most {max} (requested {requested})")]
    TooManySockets {
        /// Requested socket count.
        requested: usize,
        /// Platform maximum.
        max: usize,
    },

    /// More harts were requested than the board supports.
    #[error("number of harts should be at most {max} (requested {requested})")]
    TooManyHarts {
        /// Requested hart count.
        requested: u32,
        /// Platform maximum.
        max: u32,
    },

    /// The machine has no harts at all.
    #[error("machine needs at least one hart")]
    NoHarts,

    /// The harts assigned to a socket do not form one contiguous run.
    #[error("discontinuous hartids in socket{0}")]
    DiscontinuousHartIds(usize),

    /// The first hart id of a socket could not be determined.
    #[error("can't find hartid base for socket{0}")]
    MissingBaseHartId(usize),

    /// The hart count of a socket could not be determined.
    #[error("can't find hart count for socket{0}")]
    MissingHartCount(usize),

    /// A hart references a socket outside the configured layout.
    #[error("hart {hart} is assigned to socket{socket}, but only {count} sockets exist")]
    UnknownSocket {
        /// Hart id.
        hart: u32,
        /// Socket index named by the hart.
        socket: usize,
        /// Number of configured sockets.
        count: usize,
    },

    /// A hart id is listed in more than one socket.
    #[error("hart {0} is assigned to more than one socket")]
    DuplicateHart(u32),

    /// A socket's hart ids run past `u32::MAX`.
    #[error("hart ids of socket{0} overflow the hart id space")]
    HartIdOverflow(usize),

    /// A hart id is not listed in any socket.
    #[error("hart {0} is not assigned to any socket")]
    UnassignedHart(u32),

    /// A socket lists a hart id at or above the machine's hart count.
    #[error("hart {hart} is out of range for a {harts}-hart machine")]
    HartOutOfRange {
        /// Offending hart id.
        hart: u32,
        /// Total hart count.
        harts: u32,
    },

    /// The CPU type name is not known to the board.
    #[error("unknown cpu type '{0}'")]
    UnknownCpuType(String),
}

/// Address-map or interrupt-wiring invariant violation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Two regions claim overlapping physical address ranges.
    #[error("region {first} [{first_base:#x}, +{first_size:#x}) overlaps {second} [{second_base:#x}, +{second_size:#x})")]
    Overlap {
        /// Name of the lower region.
        first: String,
        /// Base of the lower region.
        first_base: u64,
        /// Size of the lower region.
        first_size: u64,
        /// Name of the upper region.
        second: String,
        /// Base of the upper region.
        second_base: u64,
        /// Size of the upper region.
        second_size: u64,
    },

    /// Main RAM does not fit below the top of the physical address space.
    #[error("RAM of {size:#x} bytes at {base:#x} overflows the address space")]
    RamOverflow {
        /// RAM base address.
        base: u64,
        /// Requested RAM size.
        size: u64,
    },

    /// A fixed blob does not fit inside a loadable region.
    #[error("blob '{name}' ({len:#x} bytes at {addr:#x}) is not contained in a loadable region")]
    BlobOutOfRange {
        /// Blob name.
        name: String,
        /// Target physical address.
        addr: u64,
        /// Blob length in bytes.
        len: usize,
    },

    /// No mapped device covers a blob's target address.
    #[error("no device mapped at {addr:#x} for blob '{name}'")]
    NoDeviceAt {
        /// Blob name.
        name: String,
        /// Target physical address.
        addr: u64,
    },

    /// An interrupt line is already claimed by another device.
    #[error("interrupt line {line} of PLIC{socket} is already used by {owner}")]
    IrqInUse {
        /// Socket of the controller.
        socket: usize,
        /// Interrupt source number.
        line: u32,
        /// Device that owns the line.
        owner: String,
    },

    /// An interrupt line is reserved or beyond the controller's source count.
    #[error("interrupt line {line} is not a valid source of PLIC{socket} (1..={sources})")]
    IrqOutOfRange {
        /// Socket of the controller.
        socket: usize,
        /// Interrupt source number.
        line: u32,
        /// Number of sources of the controller.
        sources: u32,
    },

    /// A controller reference names a socket that has no controllers.
    #[error("no interrupt controller for socket{0}")]
    UnknownController(usize),

    /// A PLIC hart-config string contains an unknown privilege letter.
    #[error("invalid PLIC hart config '{0}'")]
    HartConfig(String),

    /// The PLIC contexts do not fit in the per-socket aperture.
    #[error("{contexts} PLIC contexts do not fit in an aperture of {aperture:#x} bytes")]
    ContextOverflow {
        /// Requested context count.
        contexts: u32,
        /// Aperture size.
        aperture: u64,
    },
}

/// A register width other than RV32 or RV64.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unsupported architecture word width: {width} bits")]
pub struct UnsupportedArchitecture {
    /// The rejected width in bits.
    pub width: u32,
}

/// Any failure of board construction.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Invalid machine configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Broken address-map or interrupt wiring.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Unsupported register width.
    #[error(transparent)]
    Architecture(#[from] UnsupportedArchitecture),

    /// Host memory for a RAM region could not be reserved.
    #[error("failed to allocate {size:#x} bytes for {name}: {source}")]
    RamAllocation {
        /// Region name.
        name: String,
        /// Requested size.
        size: u64,
        /// Underlying OS error.
        source: io::Error,
    },

    /// A machine configuration file could not be read.
    #[error("failed to read machine config {}: {source}", path.display())]
    ConfigIo {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A machine configuration document is malformed.
    #[error("malformed machine config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
