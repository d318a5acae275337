use quard_star_core::config::{CpuType, MachineConfig, NumaConfig};
use quard_star_core::soc::factory::Placeholders;
use quard_star_core::{AddressSpace, Board};

/// RAM size used by tests (16 MiB keeps the mapping small).
pub const TEST_RAM: u64 = 16 * 1024 * 1024;

/// Installs a test-friendly tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A config with `smp` harts spread over `nodes` sockets.
pub fn config(smp: u32, nodes: usize) -> MachineConfig {
    MachineConfig {
        smp,
        ram_size: TEST_RAM,
        numa: Some(NumaConfig::Nodes(nodes)),
        ..MachineConfig::default()
    }
}

/// Same as [`config`] with an explicit CPU type.
pub fn config_with_cpu(cpu_type: CpuType, smp: u32, nodes: usize) -> MachineConfig {
    MachineConfig {
        cpu_type,
        ..config(smp, nodes)
    }
}

/// Builds `config` into a fresh address space with placeholder devices.
pub fn build(config: &MachineConfig) -> (Board, AddressSpace) {
    init_tracing();
    let mut space = AddressSpace::new();
    let board = Board::build(config, &mut space, &mut Placeholders).unwrap();
    (board, space)
}
