//! Peripheral Wiring Tests.
//!
//! Verifies device placement, interrupt line assignment per routing target, and the
//! parameters handed to the device factory.

use pretty_assertions::assert_eq;
use quard_star_core::common::LayoutError;
use quard_star_core::soc::devices::MmioWindow;
use quard_star_core::soc::devices::peripherals::fw_cfg_keys;
use quard_star_core::soc::fabric::{ControllerRef, InterruptFabric, IrqLine};
use quard_star_core::soc::factory::Placeholders;
use quard_star_core::soc::memmap::QUARD_STAR_MEMMAP;
use quard_star_core::soc::routing::{DeviceClass, IrqRouting};
use quard_star_core::soc::topology::Socket;
use quard_star_core::soc::wiring::{DeviceBinding, DeviceKind, DeviceWiring};
use quard_star_core::AddressSpace;

use crate::common::mocks::factory::{MockFactory, window};

fn fabric(sockets: usize) -> InterruptFabric {
    let sockets: Vec<_> = (0..sockets)
        .map(|id| Socket {
            id,
            base_hart_id: id as u32,
            hart_count: 1,
        })
        .collect();
    InterruptFabric::new(&sockets, &QUARD_STAR_MEMMAP, IrqRouting::default()).unwrap()
}

fn wire(fabric: &mut InterruptFabric, space: &mut AddressSpace) -> Vec<DeviceBinding> {
    let mut factory = Placeholders;
    let mut wiring = DeviceWiring::new(&QUARD_STAR_MEMMAP, fabric, space, &mut factory);
    wiring.wire_all(2, 0x4000_0000).unwrap();
    wiring.finish()
}

fn irq(socket: usize, line: u32) -> Option<IrqLine> {
    Some(IrqLine {
        controller: ControllerRef { socket },
        line,
    })
}

// ══════════════════════════════════════════════════════════
// 1. Placement and lines
// ══════════════════════════════════════════════════════════

#[test]
fn single_socket_bindings() {
    let mut fabric = fabric(1);
    let mut space = AddressSpace::new();
    let bindings = wire(&mut fabric, &mut space);

    assert_eq!(bindings.len(), 13);
    assert_eq!(
        bindings[..3],
        [
            DeviceBinding {
                kind: DeviceKind::Serial(0),
                region_base: 0x1000_0000,
                irq: irq(0, 10)
            },
            DeviceBinding {
                kind: DeviceKind::Serial(1),
                region_base: 0x1000_1000,
                irq: irq(0, 11)
            },
            DeviceBinding {
                kind: DeviceKind::Serial(2),
                region_base: 0x1000_2000,
                irq: irq(0, 12)
            },
        ]
    );
    for (slot, binding) in bindings[3..11].iter().enumerate() {
        assert_eq!(binding.kind, DeviceKind::VirtioMmio(slot));
        assert_eq!(binding.region_base, 0x1010_0000 + slot as u64 * 0x1000);
        assert_eq!(binding.irq, irq(0, 1 + slot as u32));
    }
    assert_eq!(
        bindings[11..],
        [
            DeviceBinding {
                kind: DeviceKind::Flash,
                region_base: 0x2000_0000,
                irq: None
            },
            DeviceBinding {
                kind: DeviceKind::FwCfg,
                region_base: 0x1001_0000,
                irq: None
            },
        ]
    );
}

#[test]
fn virtio_moves_to_second_socket() {
    let mut fabric = fabric(2);
    let mut space = AddressSpace::new();
    let bindings = wire(&mut fabric, &mut space);

    for binding in &bindings {
        match binding.kind {
            DeviceKind::Serial(_) => assert_eq!(binding.irq.map(|i| i.controller.socket), Some(0)),
            DeviceKind::VirtioMmio(_) => assert_eq!(binding.irq.map(|i| i.controller.socket), Some(1)),
            DeviceKind::Flash | DeviceKind::FwCfg => assert_eq!(binding.irq, None),
        }
    }
    let plic0 = fabric.plic(ControllerRef { socket: 0 }).unwrap();
    assert_eq!(plic0.claimed_sources().count(), 3);
    let plic1 = fabric.plic(ControllerRef { socket: 1 }).unwrap();
    assert_eq!(plic1.claimed_sources().count(), 8);
    assert_eq!(plic1.source_owner(8), Some("virtio7"));
}

#[test]
fn devices_are_mapped() {
    let mut fabric = fabric(1);
    let mut space = AddressSpace::new();
    let _ = wire(&mut fabric, &mut space);

    assert_eq!(space.regions().len(), 13);
    assert_eq!(space.device_name_at(0x1000_2080), Some("uart2"));
    assert_eq!(space.device_name_at(0x1010_7fff), Some("virtio7"));
    assert_eq!(space.device_name_at(0x1010_8000), None);
    assert_eq!(space.device_name_at(0x21ff_ffff), Some("flash"));
    assert_eq!(space.device_name_at(0x1001_0017), Some("fw_cfg"));
    assert_eq!(space.device_name_at(0x1001_0018), None);
}

#[test]
fn binding_names() {
    assert_eq!(DeviceKind::Serial(1).to_string(), "uart1");
    assert_eq!(DeviceKind::VirtioMmio(7).to_string(), "virtio7");
    assert_eq!(DeviceKind::Flash.to_string(), "flash");
    assert_eq!(DeviceKind::FwCfg.to_string(), "fw_cfg");
}

// ══════════════════════════════════════════════════════════
// 2. Factory parameters
// ══════════════════════════════════════════════════════════

#[test]
fn factory_receives_device_parameters() {
    let mut factory = MockFactory::new();
    let _ = factory
        .expect_serial()
        .withf(|serial, size| serial.regshift == 0 && serial.irq.line == 10 + serial.index as u32 && *size == 0x100)
        .times(3)
        .returning(|serial, size| window(&serial.name(), serial.base, size));
    let _ = factory
        .expect_virtio_mmio()
        .withf(|v| v.size == 0x1000 && v.irq.line == 1 + v.slot as u32)
        .times(8)
        .returning(|v| window(&v.name(), v.base, v.size));
    let _ = factory
        .expect_flash()
        .withf(|flash| flash.size == 0x200_0000 && flash.sector_count() == 128)
        .times(1)
        .returning(|flash| window("flash", flash.base, flash.size));
    let _ = factory
        .expect_fw_cfg()
        .withf(|fw, size| {
            *size == 0x18
                && fw.ctl_addr == 0x1001_0008
                && fw.dma_addr == 0x1001_0010
                && fw.item(fw_cfg_keys::NB_CPUS) == Some(&[2, 0][..])
                && fw.item(fw_cfg_keys::RAM_SIZE) == Some(&0x4000_0000u64.to_le_bytes()[..])
        })
        .times(1)
        .returning(|fw, size| window("fw_cfg", fw.base, size));

    let mut fabric = fabric(1);
    let mut space = AddressSpace::new();
    let mut wiring = DeviceWiring::new(&QUARD_STAR_MEMMAP, &mut fabric, &mut space, &mut factory);
    wiring.wire_all(2, 0x4000_0000).unwrap();
    assert_eq!(wiring.finish().len(), 13);
}

// ══════════════════════════════════════════════════════════
// 3. Failures
// ══════════════════════════════════════════════════════════

#[test]
fn occupied_serial_region_fails() {
    let mut fabric = fabric(1);
    let mut space = AddressSpace::new();
    space.map(Box::new(MmioWindow::new("squatter", 0x1000_1000, 0x10))).unwrap();

    let mut factory = Placeholders;
    let mut wiring = DeviceWiring::new(&QUARD_STAR_MEMMAP, &mut fabric, &mut space, &mut factory);
    assert!(matches!(wiring.serial_ports(), Err(LayoutError::Overlap { .. })));
    assert_eq!(wiring.finish().len(), 1);

    let plic = fabric.plic(ControllerRef { socket: 0 }).unwrap();
    assert_eq!(plic.source_owner(10), Some("uart0"));
    assert_eq!(plic.source_owner(11), None);
    assert_eq!(plic.claimed_sources().count(), 1);
}

#[test]
fn occupied_virtio_slot_leaves_its_line_free() {
    let mut fabric = fabric(1);
    let mut space = AddressSpace::new();
    space.map(Box::new(MmioWindow::new("squatter", 0x1010_2000, 0x10))).unwrap();

    let mut factory = Placeholders;
    let mut wiring = DeviceWiring::new(&QUARD_STAR_MEMMAP, &mut fabric, &mut space, &mut factory);
    assert!(matches!(wiring.virtio_slots(), Err(LayoutError::Overlap { .. })));

    let plic = fabric.plic(ControllerRef { socket: 0 }).unwrap();
    assert_eq!(plic.source_owner(2), Some("virtio1"));
    assert_eq!(plic.source_owner(3), None);
    assert!(fabric.free_line(DeviceClass::VirtioMmio, 3).is_ok());
}

#[test]
fn pre_claimed_line_fails() {
    let mut fabric = fabric(1);
    let _ = fabric
        .attach_to(ControllerRef { socket: 0 }, 3, "rogue")
        .unwrap();
    let mut space = AddressSpace::new();
    let mut factory = MockFactory::new();
    let _ = factory
        .expect_virtio_mmio()
        .times(2)
        .returning(|v| window(&v.name(), v.base, v.size));
    let mut wiring = DeviceWiring::new(&QUARD_STAR_MEMMAP, &mut fabric, &mut space, &mut factory);
    assert_eq!(
        wiring.virtio_slots(),
        Err(LayoutError::IrqInUse {
            socket: 0,
            line: 3,
            owner: "rogue".into()
        })
    );
}
