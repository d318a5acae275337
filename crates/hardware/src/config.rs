//! Machine configuration for the Quard Star board.
//!
//! This module defines the configuration structures used to parameterize board
//! construction. It provides:
//! 1. **Defaults:** Baseline machine options (CPU type, hart count, RAM size).
//! 2. **CPU types:** The supported hart models and their register width.
//! 3. **NUMA layout:** How harts are grouped into sockets.
//! 4. **Loading:** JSON deserialization from strings and files.
//!
//! Every field has a default, so `{}` is a valid configuration.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::common::{BoardError, CPUS_MAX, ConfigError};
use crate::isa::Xlen;
use crate::soc::routing::IrqRouting;
use crate::soc::topology::HartDescriptor;

/// Default configuration constants for the board.
mod defaults {
    /// Number of harts when not specified.
    pub const SMP: u32 = 1;

    /// Main RAM size (1 GiB).
    pub const RAM_SIZE: u64 = 1024 * 1024 * 1024;
}

/// Hart models the board can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CpuType {
    /// Generic 32-bit hart.
    Rv32,
    /// Generic 64-bit hart.
    #[default]
    Rv64,
    /// SiFive E31 (RV32IMAC).
    SifiveE31,
    /// SiFive U54 (RV64GC).
    SifiveU54,
}

impl CpuType {
    /// Returns the canonical type name (e.g., `"rv64"`).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rv32 => "rv32",
            Self::Rv64 => "rv64",
            Self::SifiveE31 => "sifive-e31",
            Self::SifiveU54 => "sifive-u54",
        }
    }

    /// Returns the native register width of this hart model.
    pub const fn xlen(self) -> Xlen {
        match self {
            Self::Rv32 | Self::SifiveE31 => Xlen::Rv32,
            Self::Rv64 | Self::SifiveU54 => Xlen::Rv64,
        }
    }
}

impl FromStr for CpuType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rv32" => Ok(Self::Rv32),
            "rv64" => Ok(Self::Rv64),
            "sifive-e31" => Ok(Self::SifiveE31),
            "sifive-u54" => Ok(Self::SifiveU54),
            _ => Err(ConfigError::UnknownCpuType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CpuType {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grouping of harts into sockets (NUMA nodes).
///
/// In JSON this is either `{"nodes": 2}` or `{"sockets": [[0, 1], [2, 3]]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumaConfig {
    /// A node count; harts are spread evenly in index order, the remainder
    /// going to the last node.
    Nodes(usize),
    /// Explicit hart ids per socket.
    Sockets(Vec<Vec<u32>>),
}

impl NumaConfig {
    /// Returns the number of sockets this layout describes (at least one).
    pub fn socket_count(&self) -> usize {
        match self {
            Self::Nodes(nodes) => (*nodes).max(1),
            Self::Sockets(sockets) => sockets.len().max(1),
        }
    }
}

/// Root machine configuration.
///
/// # Examples
///
/// ```
/// use quard_star_core::config::{CpuType, MachineConfig, NumaConfig};
///
/// let json = r#"{
///     "cpu_type": "rv32",
///     "smp": 4,
///     "ram_size": 268435456,
///     "numa": { "nodes": 2 }
/// }"#;
///
/// let config = MachineConfig::from_json(json).unwrap();
/// assert_eq!(config.cpu_type, CpuType::Rv32);
/// assert_eq!(config.numa, Some(NumaConfig::Nodes(2)));
/// assert_eq!(config.socket_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MachineConfig {
    /// Hart model used for every socket.
    #[serde(default)]
    pub cpu_type: CpuType,

    /// Total number of harts.
    #[serde(default = "MachineConfig::default_smp")]
    pub smp: u32,

    /// Main RAM size in bytes.
    #[serde(default = "MachineConfig::default_ram_size")]
    pub ram_size: u64,

    /// Socket layout; `None` puts every hart in socket 0.
    #[serde(default)]
    pub numa: Option<NumaConfig>,

    /// Which socket's interrupt controller serves each shared device class.
    #[serde(default)]
    pub routing: IrqRouting,
}

impl MachineConfig {
    fn default_smp() -> u32 {
        defaults::SMP
    }

    fn default_ram_size() -> u64 {
        defaults::RAM_SIZE
    }

    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| BoardError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Returns the number of sockets requested by this configuration.
    pub fn socket_count(&self) -> usize {
        self.numa.as_ref().map_or(1, NumaConfig::socket_count)
    }

    /// Resolves the socket of every hart, in hart-id order.
    ///
    /// # Errors
    ///
    /// Fails if the hart count is zero or above [`CPUS_MAX`], or if an explicit
    /// socket list names a hart twice, names a hart outside `0..smp`, or leaves a
    /// hart unassigned.
    pub fn hart_descriptors(&self) -> Result<Vec<HartDescriptor>, ConfigError> {
        if self.smp == 0 {
            return Err(ConfigError::NoHarts);
        }
        if self.smp > CPUS_MAX {
            return Err(ConfigError::TooManyHarts {
                requested: self.smp,
                max: CPUS_MAX,
            });
        }

        match &self.numa {
            None | Some(NumaConfig::Nodes(0)) => Ok((0..self.smp)
                .map(|hart_id| HartDescriptor { hart_id, socket: 0 })
                .collect()),
            Some(NumaConfig::Nodes(nodes)) => {
                let per_node = (self.smp as usize / nodes).max(1);
                Ok((0..self.smp)
                    .map(|hart_id| HartDescriptor {
                        hart_id,
                        socket: (hart_id as usize / per_node).min(nodes - 1),
                    })
                    .collect())
            }
            Some(NumaConfig::Sockets(sockets)) => self.explicit_descriptors(sockets),
        }
    }

    fn explicit_descriptors(&self, sockets: &[Vec<u32>]) -> Result<Vec<HartDescriptor>, ConfigError> {
        let mut owner: Vec<Option<usize>> = vec![None; self.smp as usize];
        for (socket, harts) in sockets.iter().enumerate() {
            for &hart in harts {
                let slot = owner
                    .get_mut(hart as usize)
                    .ok_or(ConfigError::HartOutOfRange {
                        hart,
                        harts: self.smp,
                    })?;
                if slot.is_some() {
                    return Err(ConfigError::DuplicateHart(hart));
                }
                *slot = Some(socket);
            }
        }

        owner
            .into_iter()
            .zip(0u32..)
            .map(|(socket, hart_id)| {
                socket
                    .map(|socket| HartDescriptor { hart_id, socket })
                    .ok_or(ConfigError::UnassignedHart(hart_id))
            })
            .collect()
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            cpu_type: CpuType::default(),
            smp: defaults::SMP,
            ram_size: defaults::RAM_SIZE,
            numa: None,
            routing: IrqRouting::default(),
        }
    }
}
