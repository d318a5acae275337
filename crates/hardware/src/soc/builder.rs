//! Board construction and the top-level `Board` type.
//!
//! This module builds the complete machine from configuration. It performs, in order:
//! 1. **Topology:** Resolves hart sockets and validates them; nothing is created on failure.
//! 2. **Layout check:** Validates the memory map against the configured RAM size.
//! 3. **Controllers:** Places one ACLINT and one PLIC per socket.
//! 4. **Memories:** Maps mask ROM, SRAM, and DRAM.
//! 5. **Boot code:** Writes the reset vector at the mask ROM base.
//! 6. **Peripherals:** Wires serial ports, virtio-mmio slots, flash, and fw_cfg.
//!
//! Steps 3 to 6 run against a private staging space that is merged into the caller's
//! address space only once everything succeeded.

use tracing::info;

use crate::common::BoardError;
use crate::config::MachineConfig;
use crate::soc::boot::ResetVector;
use crate::soc::fabric::{InterruptControllerInstance, InterruptFabric};
use crate::soc::factory::DeviceFactory;
use crate::soc::interconnect::AddressSpace;
use crate::soc::memmap::{MemoryMap, QUARD_STAR_MEMMAP, RegionId};
use crate::soc::memory::{Ram, Rom};
use crate::soc::topology::{HartArray, Socket, build_sockets};
use crate::soc::wiring::{DeviceBinding, DeviceWiring};

/// Device-tree pointer handed to the next stage (none is generated).
const FDT_ADDR: u32 = 0;

/// A constructed Quard Star board.
///
/// The devices themselves live in the [`AddressSpace`] the board was built into; this
/// value describes how they were laid out and wired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// Configuration the board was built from.
    pub config: MachineConfig,
    /// Validated sockets, indexed by socket id.
    pub sockets: Vec<Socket>,
    /// Hart arrays, one per socket.
    pub harts: Vec<HartArray>,
    /// Interrupt controllers and claimed lines.
    pub fabric: InterruptFabric,
    /// Boot stub written at the mask ROM base.
    pub reset_vector: ResetVector,
    /// Peripheral bindings in wiring order.
    pub bindings: Vec<DeviceBinding>,
}

impl Board {
    /// Builds the board into `space` using the standard memory map.
    ///
    /// # Errors
    ///
    /// See [`Self::build_with_map`].
    pub fn build(
        config: &MachineConfig,
        space: &mut AddressSpace,
        factory: &mut dyn DeviceFactory,
    ) -> Result<Self, BoardError> {
        Self::build_with_map(config, &QUARD_STAR_MEMMAP, space, factory)
    }

    /// Builds the board into `space` with an explicit memory map.
    ///
    /// On error `space` is left exactly as it was.
    ///
    /// # Errors
    ///
    /// * [`BoardError::Config`] for an invalid hart or socket layout.
    /// * [`BoardError::Layout`] for an inconsistent memory map or interrupt wiring, or if
    ///   the board collides with something already mapped in `space`.
    /// * [`BoardError::RamAllocation`] if host memory for RAM cannot be reserved.
    pub fn build_with_map(
        config: &MachineConfig,
        map: &MemoryMap,
        space: &mut AddressSpace,
        factory: &mut dyn DeviceFactory,
    ) -> Result<Self, BoardError> {
        let descriptors = config.hart_descriptors()?;
        let sockets = build_sockets(config.socket_count(), &descriptors)?;
        info!(
            sockets = sockets.len(),
            harts = descriptors.len(),
            cpu = %config.cpu_type,
            "socket layout validated"
        );

        map.validate(config.ram_size)?;

        let mrom_base = map.region(RegionId::Mrom).base;
        let harts: Vec<_> = sockets
            .iter()
            .map(|socket| HartArray::new(socket, config.cpu_type, mrom_base))
            .collect();

        let mut staging = AddressSpace::new();
        let mut fabric = InterruptFabric::new(&sockets, map, config.routing)?;
        for controllers in fabric.controllers() {
            staging.map(factory.aclint_swi(&controllers.local.swi))?;
            staging.map(factory.aclint_mtimer(&controllers.local.mtimer))?;
            staging.map(factory.plic(controllers.external.config()))?;
        }

        map_memories(map, config.ram_size, &mut staging)?;

        let entry = map.region(RegionId::Flash).base;
        let reset_vector = ResetVector::synthesize(config.cpu_type.xlen(), entry, FDT_ADDR);
        reset_vector.place(&mut staging, mrom_base)?;
        info!(
            xlen = %config.cpu_type.xlen(),
            entry = format_args!("{entry:#x}"),
            "reset vector written"
        );

        let bindings = {
            let mut wiring = DeviceWiring::new(map, &mut fabric, &mut staging, factory);
            wiring.wire_all(config.smp as u16, config.ram_size)?;
            wiring.finish()
        };

        space.absorb(staging)?;
        info!(harts = config.smp, ram = config.ram_size, "board ready");

        Ok(Self {
            config: config.clone(),
            sockets,
            harts,
            fabric,
            reset_vector,
            bindings,
        })
    }

    /// The 40-byte mask ROM image.
    pub fn rom_image(&self) -> [u8; crate::soc::boot::RESET_VECTOR_BYTES] {
        self.reset_vector.to_le_bytes()
    }

    /// Summary of every interrupt controller.
    pub fn controller_instances(&self) -> Vec<InterruptControllerInstance> {
        self.fabric.instances()
    }
}

/// Maps mask ROM, SRAM, and DRAM; DRAM is skipped when `ram_size` is 0.
fn map_memories(map: &MemoryMap, ram_size: u64, space: &mut AddressSpace) -> Result<(), BoardError> {
    let mrom = map.region(RegionId::Mrom);
    space.map(Box::new(Rom::new("MROM", mrom.base, mrom.size as usize)))?;

    let sram = map.region(RegionId::Sram);
    space.map(Box::new(allocate("SRAM", sram.base, sram.size)?))?;

    if ram_size > 0 {
        let dram = map.region(RegionId::Dram);
        space.map(Box::new(allocate("DRAM", dram.base, ram_size)?))?;
    }
    Ok(())
}

fn allocate(name: &str, base: u64, size: u64) -> Result<Ram, BoardError> {
    Ram::new(name, base, size).map_err(|source| BoardError::RamAllocation {
        name: name.to_string(),
        size,
        source,
    })
}
