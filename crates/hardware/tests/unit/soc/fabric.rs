//! Interrupt Fabric Tests.
//!
//! Verifies per-socket controller placement, context counts, default targets, and
//! line attachment.

use pretty_assertions::assert_eq;
use quard_star_core::common::LayoutError;
use quard_star_core::soc::fabric::{
    ControllerKind, ControllerRef, InterruptControllerInstance, InterruptFabric, IrqLine,
    build_controllers,
};
use quard_star_core::soc::memmap::QUARD_STAR_MEMMAP;
use quard_star_core::soc::routing::{ControllerSelector, DeviceClass, IrqRouting};
use quard_star_core::soc::topology::Socket;
use rstest::rstest;

/// `count` sockets of `per_socket` harts each.
fn sockets(count: usize, per_socket: u32) -> Vec<Socket> {
    (0..count)
        .map(|id| Socket {
            id,
            base_hart_id: id as u32 * per_socket,
            hart_count: per_socket,
        })
        .collect()
}

fn fabric(count: usize) -> InterruptFabric {
    InterruptFabric::new(&sockets(count, 1), &QUARD_STAR_MEMMAP, IrqRouting::default()).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Placement
// ══════════════════════════════════════════════════════════

#[test]
fn controllers_are_strided_per_socket() {
    let controllers = build_controllers(&sockets(3, 2), &QUARD_STAR_MEMMAP).unwrap();
    let bases: Vec<_> = controllers
        .iter()
        .map(|c| (c.local.base_address(), c.local.timer_base(), c.external.base_address()))
        .collect();
    assert_eq!(
        bases,
        [
            (0x0200_0000, 0x0200_4000, 0x0c00_0000),
            (0x0201_0000, 0x0201_4000, 0x0c21_0000),
            (0x0202_0000, 0x0202_4000, 0x0c42_0000),
        ]
    );
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn external_context_count_is_twice_hart_count(#[case] harts: u32) {
    for controllers in build_controllers(&sockets(2, harts), &QUARD_STAR_MEMMAP).unwrap() {
        assert_eq!(controllers.external.context_count(), 2 * harts);
        assert_eq!(controllers.external.source_count(), 127);
        assert_eq!(controllers.local.swi.num_harts, harts);
    }
}

#[test]
fn instances_list_local_then_external_per_socket() {
    let fabric = InterruptFabric::new(&sockets(2, 2), &QUARD_STAR_MEMMAP, IrqRouting::default()).unwrap();
    assert_eq!(
        fabric.instances(),
        [
            InterruptControllerInstance {
                socket: 0,
                kind: ControllerKind::LocalTimer,
                base_address: 0x0200_0000,
                context_count: 2,
                source_count: 0,
            },
            InterruptControllerInstance {
                socket: 0,
                kind: ControllerKind::External,
                base_address: 0x0c00_0000,
                context_count: 4,
                source_count: 127,
            },
            InterruptControllerInstance {
                socket: 1,
                kind: ControllerKind::LocalTimer,
                base_address: 0x0201_0000,
                context_count: 2,
                source_count: 0,
            },
            InterruptControllerInstance {
                socket: 1,
                kind: ControllerKind::External,
                base_address: 0x0c21_0000,
                context_count: 4,
                source_count: 127,
            },
        ]
    );
}

// ══════════════════════════════════════════════════════════
// 2. Default targets
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1, 0, 0)]
#[case(2, 0, 1)]
#[case(4, 0, 1)]
fn default_targets(#[case] count: usize, #[case] serial: usize, #[case] virtio: usize) {
    let fabric = fabric(count);
    assert_eq!(fabric.default_target(DeviceClass::Serial), ControllerRef { socket: serial });
    assert_eq!(fabric.default_target(DeviceClass::VirtioMmio), ControllerRef { socket: virtio });
}

#[test]
fn custom_routing_changes_targets() {
    let routing = IrqRouting {
        serial: ControllerSelector::Last,
        virtio_mmio: ControllerSelector::First,
    };
    let fabric = InterruptFabric::new(&sockets(3, 1), &QUARD_STAR_MEMMAP, routing).unwrap();
    assert_eq!(fabric.routing(), &routing);
    assert_eq!(fabric.default_target(DeviceClass::Serial).socket, 2);
    assert_eq!(fabric.default_target(DeviceClass::VirtioMmio).socket, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Line attachment
// ══════════════════════════════════════════════════════════

#[test]
fn attach_claims_on_default_target() {
    let mut fabric = fabric(2);
    let line = fabric.attach(DeviceClass::VirtioMmio, 1, "virtio0").unwrap();
    assert_eq!(
        line,
        IrqLine {
            controller: ControllerRef { socket: 1 },
            line: 1
        }
    );
    let plic1 = fabric.plic(ControllerRef { socket: 1 }).unwrap();
    assert_eq!(plic1.source_owner(1), Some("virtio0"));
    let plic0 = fabric.plic(ControllerRef { socket: 0 }).unwrap();
    assert_eq!(plic0.source_owner(1), None);
}

#[test]
fn same_line_on_different_controllers_is_fine() {
    let mut fabric = fabric(2);
    assert!(fabric.attach_to(ControllerRef { socket: 0 }, 3, "a").is_ok());
    assert!(fabric.attach_to(ControllerRef { socket: 1 }, 3, "b").is_ok());
}

#[test]
fn attach_errors() {
    let mut fabric = fabric(1);
    let _ = fabric.attach(DeviceClass::Serial, 10, "uart0").unwrap();
    assert_eq!(
        fabric.attach(DeviceClass::VirtioMmio, 10, "virtio9"),
        Err(LayoutError::IrqInUse {
            socket: 0,
            line: 10,
            owner: "uart0".into()
        })
    );
    assert_eq!(
        fabric.attach_to(ControllerRef { socket: 5 }, 1, "dev"),
        Err(LayoutError::UnknownController(5))
    );
    assert!(matches!(
        fabric.attach(DeviceClass::Serial, 0, "dev"),
        Err(LayoutError::IrqOutOfRange { line: 0, .. })
    ));
}

#[test]
fn free_line_does_not_claim() {
    let mut fabric = fabric(2);
    let line = fabric.free_line(DeviceClass::VirtioMmio, 4).unwrap();
    assert_eq!(
        line,
        IrqLine {
            controller: ControllerRef { socket: 1 },
            line: 4
        }
    );
    assert_eq!(fabric.plic(line.controller).unwrap().source_owner(4), None);

    let _ = fabric.attach_to(line.controller, 4, "virtio3").unwrap();
    assert_eq!(
        fabric.free_line(DeviceClass::VirtioMmio, 4),
        Err(LayoutError::IrqInUse {
            socket: 1,
            line: 4,
            owner: "virtio3".into()
        })
    );
    assert!(matches!(
        fabric.free_line(DeviceClass::Serial, 128),
        Err(LayoutError::IrqOutOfRange { line: 128, .. })
    ));
}
