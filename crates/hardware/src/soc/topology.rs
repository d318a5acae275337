//! Socket topology.
//!
//! This module validates the requested hart layout and partitions it into sockets. It performs:
//! 1. **Limits:** Rejects more sockets than the board supports.
//! 2. **Contiguity:** Each hart id appears once, and each socket owns one unbroken run
//!    of hart ids.
//! 3. **Partitioning:** Derives `(base hart id, hart count)` per socket.
//! 4. **Hart arrays:** Describes the per-socket hart clusters created from the sockets.
//!
//! Validation is fail-fast: the first invalid socket aborts construction before any
//! hardware object exists.

use std::ops::Range;

use tracing::debug;

use crate::common::{ConfigError, SOCKETS_MAX};
use crate::config::CpuType;

/// Socket assignment of a single hart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HartDescriptor {
    /// Hart id (equal to the CPU index).
    pub hart_id: u32,
    /// Socket the hart belongs to.
    pub socket: usize,
}

/// A validated socket: a contiguous run of harts sharing one set of interrupt controllers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Socket {
    /// Socket index.
    pub id: usize,
    /// First hart id of the socket.
    pub base_hart_id: u32,
    /// Number of harts in the socket.
    pub hart_count: u32,
}

impl Socket {
    /// Returns the hart ids owned by this socket.
    pub fn hart_ids(&self) -> Range<u32> {
        self.base_hart_id..self.base_hart_id.saturating_add(self.hart_count)
    }

    /// Returns `true` if `hart_id` belongs to this socket.
    pub fn contains(&self, hart_id: u32) -> bool {
        self.hart_ids().contains(&hart_id)
    }
}

/// Validates the hart layout and builds the ordered socket list.
///
/// # Arguments
///
/// * `socket_count` - Number of sockets requested by the machine.
/// * `harts` - Socket assignment of every hart, in any order.
///
/// # Errors
///
/// * [`ConfigError::TooManySockets`] if `socket_count` exceeds [`SOCKETS_MAX`].
/// * [`ConfigError::UnknownSocket`] if a hart names a socket `>= socket_count`.
/// * [`ConfigError::DuplicateHart`] if a hart id is listed more than once.
/// * [`ConfigError::DiscontinuousHartIds`] if a socket's hart ids have a gap.
/// * [`ConfigError::MissingBaseHartId`] / [`ConfigError::MissingHartCount`] for an empty socket.
/// * [`ConfigError::HartIdOverflow`] if a socket's id range ends past `u32::MAX`.
pub fn build_sockets(
    socket_count: usize,
    harts: &[HartDescriptor],
) -> Result<Vec<Socket>, ConfigError> {
    if socket_count > SOCKETS_MAX {
        return Err(ConfigError::TooManySockets {
            requested: socket_count,
            max: SOCKETS_MAX,
        });
    }
    if let Some(stray) = harts.iter().find(|h| h.socket >= socket_count) {
        return Err(ConfigError::UnknownSocket {
            hart: stray.hart_id,
            socket: stray.socket,
            count: socket_count,
        });
    }

    let mut ordered = harts.to_vec();
    ordered.sort_by_key(|h| h.hart_id);
    if let Some(pair) = ordered.windows(2).find(|pair| pair[0].hart_id == pair[1].hart_id) {
        return Err(ConfigError::DuplicateHart(pair[0].hart_id));
    }

    (0..socket_count)
        .map(|id| {
            if !hart_ids_contiguous(&ordered, id) {
                return Err(ConfigError::DiscontinuousHartIds(id));
            }
            let base_hart_id =
                first_hart_id(&ordered, id).ok_or(ConfigError::MissingBaseHartId(id))?;
            let hart_count =
                socket_hart_count(&ordered, id).ok_or(ConfigError::MissingHartCount(id))?;
            if base_hart_id.checked_add(hart_count).is_none() {
                return Err(ConfigError::HartIdOverflow(id));
            }
            debug!(socket = id, base_hart_id, hart_count, "socket validated");
            Ok(Socket {
                id,
                base_hart_id,
                hart_count,
            })
        })
        .collect()
}

/// Checks that the harts of `socket` appear as consecutive ids.
fn hart_ids_contiguous(ordered: &[HartDescriptor], socket: usize) -> bool {
    let mut prev: Option<u32> = None;
    for hart in ordered.iter().filter(|h| h.socket == socket) {
        if let Some(p) = prev {
            if p.checked_add(1) != Some(hart.hart_id) {
                return false;
            }
        }
        prev = Some(hart.hart_id);
    }
    true
}

fn first_hart_id(ordered: &[HartDescriptor], socket: usize) -> Option<u32> {
    ordered
        .iter()
        .filter(|h| h.socket == socket)
        .map(|h| h.hart_id)
        .min()
}

fn socket_hart_count(ordered: &[HartDescriptor], socket: usize) -> Option<u32> {
    let count = ordered.iter().filter(|h| h.socket == socket).count();
    (count > 0).then_some(count as u32)
}

/// A cluster of identical harts belonging to one socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HartArray {
    /// Socket index.
    pub socket: usize,
    /// Hart model.
    pub cpu_type: CpuType,
    /// First hart id.
    pub hartid_base: u32,
    /// Number of harts.
    pub num_harts: u32,
    /// Address every hart starts fetching from after reset.
    pub resetvec: u64,
}

impl HartArray {
    /// Creates the hart array for `socket`.
    pub fn new(socket: &Socket, cpu_type: CpuType, resetvec: u64) -> Self {
        Self {
            socket: socket.id,
            cpu_type,
            hartid_base: socket.base_hart_id,
            num_harts: socket.hart_count,
            resetvec,
        }
    }

    /// Object name of the array (`"soc0"`, `"soc1"`, ...).
    pub fn name(&self) -> String {
        format!("soc{}", self.socket)
    }

    /// Returns the hart ids in this array.
    pub fn hart_ids(&self) -> Range<u32> {
        self.hartid_base..self.hartid_base.saturating_add(self.num_harts)
    }
}
