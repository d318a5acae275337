//! Board Construction Tests.
//!
//! End-to-end checks of `Board::build`: the resulting address map, boot ROM contents,
//! interrupt routing across sockets, failure atomicity, and repeatability.

use pretty_assertions::assert_eq;
use quard_star_core::common::{BoardError, ConfigError, LayoutError};
use quard_star_core::config::{CpuType, MachineConfig, NumaConfig};
use quard_star_core::soc::boot::RESET_VECTOR_BLOB;
use quard_star_core::soc::devices::MmioWindow;
use quard_star_core::soc::devices::peripherals::fw_cfg_keys;
use quard_star_core::soc::factory::Placeholders;
use quard_star_core::soc::interconnect::{MappedRegion, PlacedBlob};
use quard_star_core::soc::memmap::{QUARD_STAR_MEMMAP, RegionId};
use quard_star_core::soc::routing::{ControllerSelector, IrqRouting};
use quard_star_core::soc::wiring::DeviceKind;
use quard_star_core::{AddressSpace, Board};
use rstest::rstest;

use crate::common::harness::{TEST_RAM, build, config, config_with_cpu, init_tracing};
use crate::common::mocks::factory::{MockFactory, expect_controllers, expect_peripherals, window};

fn region(name: &str, base: u64, size: u64) -> MappedRegion {
    MappedRegion {
        name: name.into(),
        base,
        size,
    }
}

fn socket_of(board: &Board, kind: DeviceKind) -> Option<usize> {
    board
        .bindings
        .iter()
        .find(|b| b.kind == kind)
        .and_then(|b| b.irq)
        .map(|irq| irq.controller.socket)
}

// ══════════════════════════════════════════════════════════
// 1. Address map
// ══════════════════════════════════════════════════════════

#[test]
fn single_socket_address_map() {
    let (_, space) = build(&config(1, 1));
    let mut expected = vec![
        region("MROM", 0x0, 0x8000),
        region("SRAM", 0x8000, 0x8000),
        region("aclint-swi0", 0x0200_0000, 0x4000),
        region("aclint-mtimer0", 0x0200_4000, 0x8000),
        region("plic0", 0x0c00_0000, 0x21_0000),
        region("uart0", 0x1000_0000, 0x100),
        region("uart1", 0x1000_1000, 0x100),
        region("uart2", 0x1000_2000, 0x100),
        region("fw_cfg", 0x1001_0000, 0x18),
    ];
    expected.extend((0..8).map(|i| region(&format!("virtio{i}"), 0x1010_0000 + i * 0x1000, 0x1000)));
    expected.push(region("flash", 0x2000_0000, 0x200_0000));
    expected.push(region("DRAM", 0x8000_0000, TEST_RAM));

    assert_eq!(space.regions(), expected);
}

#[test]
fn zero_ram_maps_no_dram() {
    let config = MachineConfig {
        ram_size: 0,
        ..config(1, 1)
    };
    let (_, space) = build(&config);
    assert!(space.regions().iter().all(|r| r.name != "DRAM"));
    assert!(!space.is_valid_address(0x8000_0000));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn controllers_replicate_per_socket(#[case] sockets: usize) {
    let (board, space) = build(&config(8, sockets));
    assert_eq!(board.sockets.len(), sockets);
    assert_eq!(board.controller_instances().len(), 2 * sockets);
    for socket in 0..sockets {
        let clint = QUARD_STAR_MEMMAP.instance_base(RegionId::Clint, socket);
        let plic = QUARD_STAR_MEMMAP.instance_base(RegionId::Plic, socket);
        assert_eq!(space.device_name_at(clint), Some(format!("aclint-swi{socket}").as_str()));
        assert_eq!(space.device_name_at(plic), Some(format!("plic{socket}").as_str()));
    }
}

#[test]
fn second_socket_controllers() {
    let (board, space) = build(&config(4, 2));
    assert_eq!(space.device_name_at(0x0201_0000), Some("aclint-swi1"));
    assert_eq!(space.device_name_at(0x0201_4000), Some("aclint-mtimer1"));
    assert_eq!(space.device_name_at(0x0c21_0000), Some("plic1"));
    let instances = board.controller_instances();
    assert_eq!(instances[3].base_address, 0x0c21_0000);
    assert_eq!(instances[3].context_count, 4);
}

#[test]
fn hart_arrays_start_at_rom() {
    let (board, _) = build(&config_with_cpu(CpuType::SifiveE31, 4, 2));
    let names: Vec<_> = board.harts.iter().map(|h| h.name()).collect();
    assert_eq!(names, ["soc0", "soc1"]);
    assert!(board.harts.iter().all(|h| h.resetvec == 0 && h.cpu_type == CpuType::SifiveE31));
    assert_eq!(board.harts[1].hart_ids(), 2..4);
}

// ══════════════════════════════════════════════════════════
// 2. Boot ROM
// ══════════════════════════════════════════════════════════

#[test]
fn rom_holds_reset_vector() {
    let (board, mut space) = build(&config(1, 1));
    assert_eq!(space.read_u32(0x0), 0x297);
    assert_eq!(space.read_u32(0x18), 0x2000_0000);
    assert_eq!(space.read_u32(0x1c), 0);
    assert_eq!(space.read_u32(0x20), 0);
    assert_eq!(space.read_bytes(0, 40), board.rom_image());
    assert_eq!(
        space.blobs(),
        [PlacedBlob {
            name: RESET_VECTOR_BLOB.into(),
            addr: 0,
            len: 40
        }]
    );
}

#[test]
fn rv32_rom_uses_word_loads() {
    let (_, mut space) = build(&config_with_cpu(CpuType::Rv32, 1, 1));
    assert_eq!(space.read_u32(0xc), 0x0202_a583);
    assert_eq!(space.read_u32(0x10), 0x0182_a283);
}

#[test]
fn guest_cannot_overwrite_rom() {
    let (board, mut space) = build(&config(1, 1));
    space.write_u32(0x0, 0xffff_ffff);
    space.write_u64(0x18, 0);
    assert_eq!(space.read_bytes(0, 40), board.rom_image());
}

// ══════════════════════════════════════════════════════════
// 3. Interrupt routing
// ══════════════════════════════════════════════════════════

#[test]
fn single_socket_routes_everything_to_socket0() {
    let (board, _) = build(&config(2, 1));
    assert_eq!(socket_of(&board, DeviceKind::Serial(0)), Some(0));
    assert_eq!(socket_of(&board, DeviceKind::VirtioMmio(0)), Some(0));
}

#[test]
fn two_sockets_split_serial_and_virtio() {
    let (board, _) = build(&config(2, 2));
    for i in 0..3 {
        assert_eq!(socket_of(&board, DeviceKind::Serial(i)), Some(0));
    }
    for i in 0..8 {
        assert_eq!(socket_of(&board, DeviceKind::VirtioMmio(i)), Some(1));
    }
    assert_eq!(socket_of(&board, DeviceKind::Flash), None);
}

#[test]
fn configured_routing_is_honoured() {
    let config = MachineConfig {
        routing: IrqRouting {
            serial: ControllerSelector::Last,
            virtio_mmio: ControllerSelector::First,
        },
        ..config(3, 3)
    };
    let (board, _) = build(&config);
    assert_eq!(socket_of(&board, DeviceKind::Serial(2)), Some(2));
    assert_eq!(socket_of(&board, DeviceKind::VirtioMmio(7)), Some(0));
}

#[test]
fn routing_from_json() {
    let config = MachineConfig::from_json(
        r#"{ "smp": 2, "ram_size": 16777216, "numa": { "nodes": 2 },
             "routing": { "serial": "last", "virtio_mmio": "first" } }"#,
    )
    .unwrap();
    let (board, _) = build(&config);
    assert_eq!(socket_of(&board, DeviceKind::Serial(0)), Some(1));
    assert_eq!(socket_of(&board, DeviceKind::VirtioMmio(0)), Some(0));
}

// ══════════════════════════════════════════════════════════
// 4. Failure atomicity
// ══════════════════════════════════════════════════════════

#[test]
fn too_many_sockets_creates_nothing() {
    init_tracing();
    let mut space = AddressSpace::new();
    let err = Board::build(&config(8, 9), &mut space, &mut Placeholders).unwrap_err();
    assert!(matches!(
        err,
        BoardError::Config(ConfigError::TooManySockets { requested: 9, max: 8 })
    ));
    assert!(space.regions().is_empty());
}

#[test]
fn config_errors_skip_the_factory() {
    let mut factory = MockFactory::new();
    let mut space = AddressSpace::new();
    let config = MachineConfig {
        smp: 2,
        numa: Some(NumaConfig::Sockets(vec![vec![0], vec![0, 1]])),
        ..MachineConfig::default()
    };
    assert!(matches!(
        Board::build(&config, &mut space, &mut factory),
        Err(BoardError::Config(_))
    ));
}

#[test]
fn conflicting_premapped_device_leaves_space_untouched() {
    init_tracing();
    let mut space = AddressSpace::new();
    space.map(Box::new(MmioWindow::new("squatter", 0x1000_0000, 0x10))).unwrap();

    let err = Board::build(&config(1, 1), &mut space, &mut Placeholders).unwrap_err();
    assert!(matches!(err, BoardError::Layout(LayoutError::Overlap { .. })));
    assert_eq!(space.regions(), [region("squatter", 0x1000_0000, 0x10)]);
    assert!(space.blobs().is_empty());
    assert_eq!(space.read_u32(0), 0);
}

#[test]
fn ram_overflowing_address_space_is_rejected() {
    let config = MachineConfig {
        ram_size: u64::MAX,
        ..config(1, 1)
    };
    let mut space = AddressSpace::new();
    let err = Board::build(&config, &mut space, &mut Placeholders).unwrap_err();
    assert!(matches!(err, BoardError::Layout(LayoutError::RamOverflow { .. })));
    assert!(space.regions().is_empty());
}

// ══════════════════════════════════════════════════════════
// 5. Factory and repeatability
// ══════════════════════════════════════════════════════════

#[test]
fn factory_is_called_once_per_device() {
    init_tracing();
    let mut factory = MockFactory::new();
    expect_controllers(&mut factory, 2);
    expect_peripherals(&mut factory);
    let _ = factory
        .expect_fw_cfg()
        .withf(|fw, size| *size == 0x18 && fw.item(fw_cfg_keys::NB_CPUS) == Some(&[4, 0][..]))
        .times(1)
        .returning(|fw, size| window("fw_cfg", fw.base, size));

    let mut space = AddressSpace::new();
    let board = Board::build(&config(4, 2), &mut space, &mut factory).unwrap();
    assert_eq!(board.bindings.len(), 13);
    assert_eq!(space.device_name_at(0x0200_4000), Some("mtimer0"));
    assert_eq!(space.device_name_at(0x0c21_0000), Some("plic1"));
}

#[test]
fn independent_boards_in_one_process() {
    let (a, mut space_a) = build(&config(2, 2));
    let (b, mut space_b) = build(&config(2, 2));
    assert_eq!(a, b);
    assert_eq!(a.rom_image(), b.rom_image());
    assert_eq!(space_a.regions(), space_b.regions());
    assert_eq!(space_a.read_bytes(0, 40), space_b.read_bytes(0, 40));

    space_a.write_u32(0x8000, 0x1234_5678);
    assert_eq!(space_b.read_u32(0x8000), 0);
}

#[test]
fn building_twice_into_one_space_overlaps() {
    let (_, mut space) = build(&config(1, 1));
    let before = space.regions();
    let err = Board::build(&config(1, 1), &mut space, &mut Placeholders).unwrap_err();
    assert!(matches!(err, BoardError::Layout(LayoutError::Overlap { .. })));
    assert_eq!(space.regions(), before);
}
