//! Platform Constants.
//!
//! Fixed parameters of the Quard Star board. It includes:
//! 1. **Topology limits:** Maximum sockets and harts.
//! 2. **ACLINT layout:** Software-interrupt and timer sub-block geometry.
//! 3. **PLIC layout:** Source/priority counts and register block offsets.
//! 4. **Interrupt lines:** Source numbers of the on-board peripherals.

/// Maximum number of sockets (NUMA nodes) the board supports.
pub const SOCKETS_MAX: usize = 8;

/// Maximum number of harts across all sockets.
pub const CPUS_MAX: u32 = 8;

/// Size of the ACLINT software-interrupt (MSWI) sub-block at the bottom of each CLINT window.
pub const ACLINT_SWI_SIZE: u64 = 0x4000;

/// Size of the ACLINT machine timer (MTIMER) sub-block.
pub const ACLINT_MTIMER_SIZE: u64 = 0x8000;

/// Offset of the first `mtimecmp` register inside the MTIMER sub-block.
pub const ACLINT_MTIMECMP_OFFSET: u64 = 0x0;

/// Offset of the `mtime` register inside the MTIMER sub-block.
pub const ACLINT_MTIME_OFFSET: u64 = 0x7ff8;

/// Machine timer frequency (10 MHz).
pub const ACLINT_TIMEBASE_FREQ: u64 = 10_000_000;

/// Per-hart privilege descriptor used to build the PLIC hart-config string.
pub const PLIC_HART_CONFIG: &str = "MS";

/// Number of PLIC interrupt sources (source 0 is reserved and not counted).
pub const PLIC_NUM_SOURCES: u32 = 127;

/// Number of PLIC priority levels.
pub const PLIC_NUM_PRIORITIES: u32 = 7;

/// Offset of the priority register for source 1.
pub const PLIC_PRIORITY_BASE: u64 = 0x04;

/// Offset of the pending bit array.
pub const PLIC_PENDING_BASE: u64 = 0x1000;

/// Offset of the first context's enable bit array.
pub const PLIC_ENABLE_BASE: u64 = 0x2000;

/// Distance between two contexts' enable arrays.
pub const PLIC_ENABLE_STRIDE: u64 = 0x80;

/// Offset of the first context's threshold/claim block.
pub const PLIC_CONTEXT_BASE: u64 = 0x20_0000;

/// Distance between two contexts' threshold/claim blocks.
pub const PLIC_CONTEXT_STRIDE: u64 = 0x1000;

/// Size of a PLIC aperture able to serve `contexts` targets.
pub const fn plic_size(contexts: u64) -> u64 {
    PLIC_CONTEXT_BASE + contexts * PLIC_CONTEXT_STRIDE
}

/// First interrupt line of the virtio-mmio slot array.
pub const VIRTIO_IRQ: u32 = 1;

/// Number of virtio-mmio transport slots.
pub const VIRTIO_COUNT: usize = 8;

/// Interrupt line of UART0 (UART1 and UART2 follow).
pub const UART0_IRQ: u32 = 10;

/// Number of on-board serial ports.
pub const UART_COUNT: usize = 3;

/// Baud base of the 16550 serial ports.
pub const UART_BAUDBASE: u32 = 399_193;

/// Sector size of the CFI boot flash (256 KiB).
pub const FLASH_SECTOR_SIZE: u64 = 256 * 1024;

/// Bank width of the CFI boot flash in bytes.
pub const FLASH_BANK_WIDTH: u32 = 4;
