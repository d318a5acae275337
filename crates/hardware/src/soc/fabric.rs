//! Interrupt fabric.
//!
//! This module replicates the interrupt controllers per socket and hands out interrupt
//! lines. It provides:
//! 1. **Replication:** One [`LocalTimer`] and one [`Plic`] per socket, each placed at its
//!    socket's copy of the CLINT and PLIC regions.
//! 2. **Default targets:** Resolves the controller serving a shared device class through
//!    the [`IrqRouting`] table.
//! 3. **Line allocation:** Claims PLIC sources for devices, rejecting reserved, out of
//!    range, and doubly used lines.
//! 4. **Reporting:** Summarizes the controllers as [`InterruptControllerInstance`] records.

use tracing::debug;

use crate::common::LayoutError;
use crate::soc::devices::{LocalTimer, Plic};
use crate::soc::memmap::{MemoryMap, RegionId};
use crate::soc::routing::{DeviceClass, IrqRouting};
use crate::soc::topology::Socket;

/// The two interrupt controllers of one socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketControllers {
    /// Software-interrupt and timer controller.
    pub local: LocalTimer,
    /// External interrupt controller.
    pub external: Plic,
}

/// Builds the controllers of every socket, indexed by socket id.
///
/// # Errors
///
/// Returns [`LayoutError::ContextOverflow`] if a socket has more harts than one PLIC
/// aperture can serve.
pub fn build_controllers(
    sockets: &[Socket],
    map: &MemoryMap,
) -> Result<Vec<SocketControllers>, LayoutError> {
    let plic_size = map.region(RegionId::Plic).size;
    sockets
        .iter()
        .map(|socket| {
            let local = LocalTimer::new(socket, map.instance_base(RegionId::Clint, socket.id));
            let external = Plic::new(
                socket,
                map.instance_base(RegionId::Plic, socket.id),
                plic_size,
            )?;
            debug!(
                socket = socket.id,
                clint = format_args!("{:#x}", local.base_address()),
                plic = format_args!("{:#x}", external.base_address()),
                contexts = external.context_count(),
                "interrupt controllers placed"
            );
            Ok(SocketControllers { local, external })
        })
        .collect()
}

/// Handle to one socket's external interrupt controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ControllerRef {
    /// Socket index.
    pub socket: usize,
}

/// An interrupt source on a specific controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IrqLine {
    /// Controller the line belongs to.
    pub controller: ControllerRef,
    /// Source number.
    pub line: u32,
}

/// Kind of an interrupt controller instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    /// ACLINT software-interrupt and timer block.
    LocalTimer,
    /// PLIC.
    External,
}

/// Summary of one controller instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptControllerInstance {
    /// Socket index.
    pub socket: usize,
    /// Controller kind.
    pub kind: ControllerKind,
    /// Base physical address.
    pub base_address: u64,
    /// Number of interrupt targets.
    pub context_count: u32,
    /// Number of interrupt sources (0 for local timers).
    pub source_count: u32,
}

/// All interrupt controllers of a board plus the routing table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterruptFabric {
    controllers: Vec<SocketControllers>,
    routing: IrqRouting,
}

impl InterruptFabric {
    /// Builds the controllers of `sockets` as laid out by `map`.
    ///
    /// # Errors
    ///
    /// See [`build_controllers`].
    pub fn new(sockets: &[Socket], map: &MemoryMap, routing: IrqRouting) -> Result<Self, LayoutError> {
        Ok(Self {
            controllers: build_controllers(sockets, map)?,
            routing,
        })
    }

    /// Controllers indexed by socket id.
    pub fn controllers(&self) -> &[SocketControllers] {
        &self.controllers
    }

    /// Number of sockets served.
    pub fn socket_count(&self) -> usize {
        self.controllers.len()
    }

    /// The routing table in effect.
    pub fn routing(&self) -> &IrqRouting {
        &self.routing
    }

    /// Controller that serves `class` by default.
    pub fn default_target(&self, class: DeviceClass) -> ControllerRef {
        ControllerRef {
            socket: self.routing.target(class, self.socket_count()),
        }
    }

    /// Looks up the PLIC behind `controller`.
    pub fn plic(&self, controller: ControllerRef) -> Option<&Plic> {
        self.controllers.get(controller.socket).map(|c| &c.external)
    }

    /// Resolves source `line` on the default controller of `class` without claiming it.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownController`] for a socket without controllers, plus the
    /// errors of [`Plic::check_source`].
    pub fn free_line(&self, class: DeviceClass, line: u32) -> Result<IrqLine, LayoutError> {
        let controller = self.default_target(class);
        self.plic(controller)
            .ok_or(LayoutError::UnknownController(controller.socket))?
            .check_source(line)?;
        Ok(IrqLine { controller, line })
    }

    /// Claims source `line` on the default controller of `class` for `owner`.
    ///
    /// # Errors
    ///
    /// See [`Self::attach_to`].
    pub fn attach(&mut self, class: DeviceClass, line: u32, owner: &str) -> Result<IrqLine, LayoutError> {
        let controller = self.default_target(class);
        self.attach_to(controller, line, owner)
    }

    /// Claims source `line` on `controller` for `owner`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::UnknownController`] for a socket without controllers, plus the
    /// errors of [`Plic::claim_source`].
    pub fn attach_to(
        &mut self,
        controller: ControllerRef,
        line: u32,
        owner: &str,
    ) -> Result<IrqLine, LayoutError> {
        let plic = &mut self
            .controllers
            .get_mut(controller.socket)
            .ok_or(LayoutError::UnknownController(controller.socket))?
            .external;
        plic.claim_source(line, owner)?;
        debug!(owner, socket = controller.socket, line, "interrupt line attached");
        Ok(IrqLine { controller, line })
    }

    /// One record per controller, local timers first within each socket.
    pub fn instances(&self) -> Vec<InterruptControllerInstance> {
        self.controllers
            .iter()
            .flat_map(|c| {
                [
                    InterruptControllerInstance {
                        socket: c.local.socket(),
                        kind: ControllerKind::LocalTimer,
                        base_address: c.local.base_address(),
                        context_count: c.local.swi.num_harts,
                        source_count: 0,
                    },
                    InterruptControllerInstance {
                        socket: c.external.socket(),
                        kind: ControllerKind::External,
                        base_address: c.external.base_address(),
                        context_count: c.external.context_count(),
                        source_count: c.external.source_count(),
                    },
                ]
            })
            .collect()
    }
}
