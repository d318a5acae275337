//! Quard Star board inspector.
//!
//! This binary builds a board from a machine configuration and reports the result. It performs:
//! 1. **Configuration:** Reads a JSON config file and/or applies command-line overrides.
//! 2. **Construction:** Builds the board with placeholder device models.
//! 3. **Report:** Prints the address map, interrupt controllers, peripheral bindings, and
//!    reset vector, as text or JSON.
//! 4. **ROM export:** Optionally writes the 40-byte mask ROM image to a file.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use quard_star_core::config::{CpuType, NumaConfig};
use quard_star_core::soc::factory::Placeholders;
use quard_star_core::soc::fabric::ControllerKind;
use quard_star_core::{AddressSpace, Board, MachineConfig};

#[derive(Parser, Debug)]
#[command(
    name = "qstar",
    author,
    version,
    about = "Build a Quard Star board and report its layout",
    long_about = "Build a Quard Star board and report its layout.\n\nFlags override values read from --config.\n\nExamples:\n  qstar --smp 4 --sockets 2\n  qstar --config board.json --json\n  qstar --cpu rv32 --rom-out mrom.bin"
)]
struct Cli {
    /// Machine configuration file (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hart model (rv32, rv64, sifive-e31, sifive-u54).
    #[arg(long)]
    cpu: Option<CpuType>,

    /// Total number of harts.
    #[arg(long)]
    smp: Option<u32>,

    /// Number of sockets; harts are spread evenly across them.
    #[arg(long)]
    sockets: Option<usize>,

    /// Main RAM size in MiB.
    #[arg(long)]
    ram: Option<u64>,

    /// Write the mask ROM image to this file.
    #[arg(long)]
    rom_out: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qstar: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = machine_config(cli)?;
    let mut space = AddressSpace::new();
    let board = Board::build(&config, &mut space, &mut Placeholders)?;

    if cli.json {
        print_json(&board, &space)?;
    } else {
        print_text(&board, &space);
    }

    if let Some(path) = &cli.rom_out {
        fs::write(path, board.rom_image())?;
        eprintln!("[*] Wrote mask ROM to {}", path.display());
    }
    Ok(())
}

/// Loads `--config` (or the defaults) and applies flag overrides.
fn machine_config(cli: &Cli) -> Result<MachineConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => MachineConfig::from_json_file(path)?,
        None => MachineConfig::default(),
    };
    if let Some(cpu) = cli.cpu {
        config.cpu_type = cpu;
    }
    if let Some(smp) = cli.smp {
        config.smp = smp;
    }
    if let Some(nodes) = cli.sockets {
        config.numa = Some(NumaConfig::Nodes(nodes));
    }
    if let Some(mib) = cli.ram {
        config.ram_size = mib
            .checked_mul(1024 * 1024)
            .ok_or("RAM size does not fit in 64 bits")?;
    }
    Ok(config)
}

fn kind_name(kind: ControllerKind) -> &'static str {
    match kind {
        ControllerKind::LocalTimer => "aclint",
        ControllerKind::External => "plic",
    }
}

fn print_text(board: &Board, space: &AddressSpace) {
    println!(
        "Quard Star: {} x{} harts, {} socket(s), {} MiB RAM",
        board.config.cpu_type,
        board.config.smp,
        board.sockets.len(),
        board.config.ram_size / 1024 / 1024
    );
    println!();

    println!("Sockets:");
    for hart in &board.harts {
        println!(
            "  {:<6} harts {:>2}..{:<2} resetvec {:#x}",
            hart.name(),
            hart.hartid_base,
            hart.hartid_base + hart.num_harts,
            hart.resetvec
        );
    }
    println!();

    println!("Address map:");
    for region in space.regions() {
        println!(
            "  {:#012x}-{:#012x}  {}",
            region.base,
            region.base + region.size.saturating_sub(1),
            region.name
        );
    }
    println!();

    println!("Interrupt controllers:");
    for inst in board.controller_instances() {
        println!(
            "  socket{} {:<6} @ {:#x}  contexts {:>2}  sources {:>3}",
            inst.socket,
            kind_name(inst.kind),
            inst.base_address,
            inst.context_count,
            inst.source_count
        );
    }
    println!();

    println!("Bindings:");
    for binding in &board.bindings {
        match binding.irq {
            Some(irq) => println!(
                "  {:<8} @ {:#x}  plic{} line {}",
                binding.kind.to_string(),
                binding.region_base,
                irq.controller.socket,
                irq.line
            ),
            None => println!("  {:<8} @ {:#x}", binding.kind.to_string(), binding.region_base),
        }
    }
    println!();

    println!("Reset vector:");
    for (i, word) in board.reset_vector.words().iter().enumerate() {
        println!("  [{i}] {word:#010x}");
    }
}

fn print_json(board: &Board, space: &AddressSpace) -> Result<(), serde_json::Error> {
    let report = json!({
        "cpu_type": board.config.cpu_type.name(),
        "smp": board.config.smp,
        "ram_size": board.config.ram_size,
        "sockets": board.sockets.iter().map(|s| json!({
            "id": s.id,
            "base_hart_id": s.base_hart_id,
            "hart_count": s.hart_count,
        })).collect::<Vec<_>>(),
        "regions": space.regions().iter().map(|r| json!({
            "name": r.name,
            "base": r.base,
            "size": r.size,
        })).collect::<Vec<_>>(),
        "controllers": board.controller_instances().iter().map(|c| json!({
            "socket": c.socket,
            "kind": kind_name(c.kind),
            "base_address": c.base_address,
            "context_count": c.context_count,
            "source_count": c.source_count,
        })).collect::<Vec<_>>(),
        "bindings": board.bindings.iter().map(|b| json!({
            "device": b.kind.to_string(),
            "region_base": b.region_base,
            "socket": b.irq.map(|irq| irq.controller.socket),
            "line": b.irq.map(|irq| irq.line),
        })).collect::<Vec<_>>(),
        "reset_vector": board.reset_vector.words(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
