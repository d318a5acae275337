//! Advanced Core Local Interruptor (ACLINT) descriptors.
//!
//! Each socket owns one CLINT window split into two sub-blocks:
//!
//! * `0x0000`: MSWI, one 32-bit `msip` register per hart
//! * `0x4000`: MTIMER, one 64-bit `mtimecmp` per hart and a shared `mtime` at `+0x7ff8`
//!
//! Only placement and register addresses are described here; the timer and
//! software-interrupt behaviour belongs to the device model that the
//! [`DeviceFactory`](crate::soc::factory::DeviceFactory) maps at these addresses.

use crate::common::constants::{
    ACLINT_MTIME_OFFSET, ACLINT_MTIMECMP_OFFSET, ACLINT_MTIMER_SIZE, ACLINT_SWI_SIZE,
    ACLINT_TIMEBASE_FREQ,
};
use crate::soc::topology::Socket;

/// Machine-level software interrupt (MSWI) sub-block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AclintSwi {
    /// Socket index.
    pub socket: usize,
    /// Base physical address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
    /// First hart served.
    pub hartid_base: u32,
    /// Number of harts served.
    pub num_harts: u32,
    /// `true` for a supervisor-level (SSWI) block.
    pub sswi: bool,
}

/// Machine timer (MTIMER) sub-block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AclintMtimer {
    /// Socket index.
    pub socket: usize,
    /// Base physical address.
    pub base: u64,
    /// Size in bytes.
    pub size: u64,
    /// First hart served.
    pub hartid_base: u32,
    /// Number of harts served.
    pub num_harts: u32,
    /// Offset of the first `mtimecmp` register.
    pub timecmp_base: u64,
    /// Offset of the `mtime` register.
    pub time_base: u64,
    /// Timer frequency in Hz.
    pub timebase_freq: u64,
    /// Whether harts may read `mtime` through the `time` CSR.
    pub provide_rdtime: bool,
}

/// The local timer / software-interrupt controller of one socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalTimer {
    /// Software-interrupt sub-block (lower part of the window).
    pub swi: AclintSwi,
    /// Timer sub-block (follows the software-interrupt block).
    pub mtimer: AclintMtimer,
}

impl LocalTimer {
    /// Describes the controller of `socket` whose CLINT window starts at `window_base`.
    pub fn new(socket: &Socket, window_base: u64) -> Self {
        Self {
            swi: AclintSwi {
                socket: socket.id,
                base: window_base,
                size: ACLINT_SWI_SIZE,
                hartid_base: socket.base_hart_id,
                num_harts: socket.hart_count,
                sswi: false,
            },
            mtimer: AclintMtimer {
                socket: socket.id,
                base: window_base + ACLINT_SWI_SIZE,
                size: ACLINT_MTIMER_SIZE,
                hartid_base: socket.base_hart_id,
                num_harts: socket.hart_count,
                timecmp_base: ACLINT_MTIMECMP_OFFSET,
                time_base: ACLINT_MTIME_OFFSET,
                timebase_freq: ACLINT_TIMEBASE_FREQ,
                provide_rdtime: true,
            },
        }
    }

    /// Socket index.
    pub fn socket(&self) -> usize {
        self.swi.socket
    }

    /// Base of the CLINT window (the software-interrupt block).
    pub fn base_address(&self) -> u64 {
        self.swi.base
    }

    /// Base of the timer sub-block.
    pub fn timer_base(&self) -> u64 {
        self.mtimer.base
    }

    /// Address of the `mtime` register.
    pub fn mtime_addr(&self) -> u64 {
        self.mtimer.base + self.mtimer.time_base
    }

    /// Address of `msip` for `hart_id`, or `None` if the hart is not served here.
    pub fn msip_addr(&self, hart_id: u32) -> Option<u64> {
        self.local_index(hart_id)
            .map(|idx| self.swi.base + u64::from(idx) * 4)
    }

    /// Address of `mtimecmp` for `hart_id`, or `None` if the hart is not served here.
    pub fn mtimecmp_addr(&self, hart_id: u32) -> Option<u64> {
        self.local_index(hart_id)
            .map(|idx| self.mtimer.base + self.mtimer.timecmp_base + u64::from(idx) * 8)
    }

    fn local_index(&self, hart_id: u32) -> Option<u32> {
        hart_id
            .checked_sub(self.swi.hartid_base)
            .filter(|&idx| idx < self.swi.num_harts)
    }
}
