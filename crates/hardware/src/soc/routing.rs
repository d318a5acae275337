//! Interrupt routing policy.
//!
//! Peripherals shared by the whole board still have to raise their interrupts on one
//! particular socket's PLIC. Which socket that is depends on the device class and is
//! kept here as a named table instead of being buried in the wiring code.
//!
//! The default table sends serial ports to socket 0 and virtio-mmio slots to socket 1,
//! falling back to socket 0 on single-socket machines. Both entries can be overridden
//! from the machine configuration:
//!
//! ```json
//! { "routing": { "serial": "last", "virtio_mmio": { "preferred": 0 } } }
//! ```

use std::fmt;

use serde::Deserialize;

/// Class of a shared peripheral, used as the routing key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Directly mapped 16550 serial ports.
    Serial,
    /// Virtio-mmio transport slots.
    VirtioMmio,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serial => "serial",
            Self::VirtioMmio => "virtio-mmio",
        })
    }
}

/// Rule choosing a socket from the number of sockets present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerSelector {
    /// Socket 0.
    First,
    /// The highest-numbered socket.
    Last,
    /// The given socket if it exists, socket 0 otherwise.
    Preferred(usize),
}

impl ControllerSelector {
    /// Resolves the rule to a socket index; `socket_count` is at least 1.
    pub fn resolve(self, socket_count: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Last => socket_count.saturating_sub(1),
            Self::Preferred(socket) if socket < socket_count => socket,
            Self::Preferred(_) => 0,
        }
    }
}

/// Routing table: one selector per device class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IrqRouting {
    /// Target of the serial ports.
    pub serial: ControllerSelector,
    /// Target of the virtio-mmio slots.
    pub virtio_mmio: ControllerSelector,
}

impl IrqRouting {
    /// Returns the selector of `class`.
    pub fn selector(&self, class: DeviceClass) -> ControllerSelector {
        match class {
            DeviceClass::Serial => self.serial,
            DeviceClass::VirtioMmio => self.virtio_mmio,
        }
    }

    /// Socket whose PLIC serves `class` on a machine with `socket_count` sockets.
    pub fn target(&self, class: DeviceClass, socket_count: usize) -> usize {
        self.selector(class).resolve(socket_count)
    }
}

impl Default for IrqRouting {
    fn default() -> Self {
        Self {
            serial: ControllerSelector::First,
            virtio_mmio: ControllerSelector::Preferred(1),
        }
    }
}
