//! Platform-Level Interrupt Controller (PLIC) descriptors.
//!
//! One PLIC serves each socket. Its targets ("contexts") are derived from a hart-config
//! string holding one group of privilege letters per hart, groups separated by commas:
//! `"MS,MS"` describes two harts with a machine-mode and a supervisor-mode context each.
//!
//! # Memory Map
//!
//! * `0x000004`: Source priorities (source 1 first, source 0 is reserved)
//! * `0x001000`: Pending bits
//! * `0x002000`: Enable bits, `0x80` bytes per context
//! * `0x200000`: Threshold and claim/complete, `0x1000` bytes per context
//!
//! The register behaviour lives in the device model mapped by the
//! [`DeviceFactory`](crate::soc::factory::DeviceFactory). This type owns the board-level
//! view: geometry, context layout, and which device drives each interrupt source.

use crate::common::LayoutError;
use crate::common::constants::{
    PLIC_CONTEXT_BASE, PLIC_CONTEXT_STRIDE, PLIC_ENABLE_BASE, PLIC_ENABLE_STRIDE,
    PLIC_HART_CONFIG, PLIC_NUM_PRIORITIES, PLIC_NUM_SOURCES, PLIC_PENDING_BASE,
    PLIC_PRIORITY_BASE,
};
use crate::isa::mode::PrivilegeMode;
use crate::soc::topology::Socket;

/// Builds the hart-config string: [`PLIC_HART_CONFIG`] once per hart, comma separated.
pub fn hart_config_string(num_harts: u32) -> String {
    vec![PLIC_HART_CONFIG; num_harts as usize].join(",")
}

/// One interrupt target: a (hart, privilege level) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlicContext {
    /// Context number (index into the enable and threshold/claim arrays).
    pub index: u32,
    /// Hart receiving the interrupt.
    pub hart_id: u32,
    /// Privilege level receiving the interrupt.
    pub mode: PrivilegeMode,
}

/// Parses a hart-config string into the ordered context list.
///
/// # Errors
///
/// [`LayoutError::HartConfig`] if the string contains anything but `M`, `S`, `U`, and `,`.
pub fn parse_hart_config(config: &str, hartid_base: u32) -> Result<Vec<PlicContext>, LayoutError> {
    let mut contexts = Vec::new();
    let mut hart_id = hartid_base;
    for c in config.chars() {
        if c == ',' {
            hart_id += 1;
            continue;
        }
        let mode =
            PrivilegeMode::from_letter(c).ok_or_else(|| LayoutError::HartConfig(config.to_string()))?;
        contexts.push(PlicContext {
            index: contexts.len() as u32,
            hart_id,
            mode,
        });
    }
    Ok(contexts)
}

/// Creation parameters of a PLIC instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlicConfig {
    /// Socket index.
    pub socket: usize,
    /// Base physical address.
    pub base: u64,
    /// Aperture size in bytes.
    pub aperture_size: u64,
    /// Per-hart privilege descriptor string (e.g., `"MS,MS"`).
    pub hart_config: String,
    /// First hart served.
    pub hartid_base: u32,
    /// Number of harts served.
    pub num_harts: u32,
    /// Number of interrupt sources.
    pub num_sources: u32,
    /// Number of priority levels.
    pub num_priorities: u32,
    /// Offset of the source 1 priority register.
    pub priority_base: u64,
    /// Offset of the pending array.
    pub pending_base: u64,
    /// Offset of context 0's enable array.
    pub enable_base: u64,
    /// Distance between enable arrays.
    pub enable_stride: u64,
    /// Offset of context 0's threshold/claim block.
    pub context_base: u64,
    /// Distance between threshold/claim blocks.
    pub context_stride: u64,
}

/// The external interrupt controller of one socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plic {
    config: PlicConfig,
    contexts: Vec<PlicContext>,
    /// Owner of each source; index 0 is the reserved "no interrupt" source.
    sources: Vec<Option<String>>,
}

impl Plic {
    /// Describes the PLIC of `socket` at `base` with an aperture of `aperture_size` bytes.
    ///
    /// # Errors
    ///
    /// [`LayoutError::ContextOverflow`] if the socket has more contexts than the aperture
    /// can address.
    pub fn new(socket: &Socket, base: u64, aperture_size: u64) -> Result<Self, LayoutError> {
        let config = PlicConfig {
            socket: socket.id,
            base,
            aperture_size,
            hart_config: hart_config_string(socket.hart_count),
            hartid_base: socket.base_hart_id,
            num_harts: socket.hart_count,
            num_sources: PLIC_NUM_SOURCES,
            num_priorities: PLIC_NUM_PRIORITIES,
            priority_base: PLIC_PRIORITY_BASE,
            pending_base: PLIC_PENDING_BASE,
            enable_base: PLIC_ENABLE_BASE,
            enable_stride: PLIC_ENABLE_STRIDE,
            context_base: PLIC_CONTEXT_BASE,
            context_stride: PLIC_CONTEXT_STRIDE,
        };
        Self::from_config(config)
    }

    /// Builds a PLIC from explicit creation parameters.
    ///
    /// # Errors
    ///
    /// [`LayoutError::HartConfig`] for a malformed hart-config string and
    /// [`LayoutError::ContextOverflow`] if the contexts do not fit the aperture.
    pub fn from_config(config: PlicConfig) -> Result<Self, LayoutError> {
        let contexts = parse_hart_config(&config.hart_config, config.hartid_base)?;
        let needed = config.context_base + contexts.len() as u64 * config.context_stride;
        if needed > config.aperture_size {
            return Err(LayoutError::ContextOverflow {
                contexts: contexts.len() as u32,
                aperture: config.aperture_size,
            });
        }
        let sources = vec![None; config.num_sources as usize + 1];
        Ok(Self {
            config,
            contexts,
            sources,
        })
    }

    /// Creation parameters handed to the device model.
    pub fn config(&self) -> &PlicConfig {
        &self.config
    }

    /// Socket index.
    pub fn socket(&self) -> usize {
        self.config.socket
    }

    /// Base physical address.
    pub fn base_address(&self) -> u64 {
        self.config.base
    }

    /// Number of interrupt targets (two per hart on this board).
    pub fn context_count(&self) -> u32 {
        self.contexts.len() as u32
    }

    /// Number of interrupt sources.
    pub fn source_count(&self) -> u32 {
        self.config.num_sources
    }

    /// Per-hart privilege descriptor string.
    pub fn hart_config(&self) -> &str {
        &self.config.hart_config
    }

    /// All contexts in index order.
    pub fn contexts(&self) -> &[PlicContext] {
        &self.contexts
    }

    /// Finds the context delivering `mode` interrupts to `hart_id`.
    pub fn context_for(&self, hart_id: u32, mode: PrivilegeMode) -> Option<&PlicContext> {
        self.contexts
            .iter()
            .find(|ctx| ctx.hart_id == hart_id && ctx.mode == mode)
    }

    /// Address of the priority register of `source` (1-based).
    pub fn priority_addr(&self, source: u32) -> Option<u64> {
        self.valid_source(source)
            .then(|| self.config.base + self.config.priority_base + u64::from(source - 1) * 4)
    }

    /// Address of the pending word holding `source`.
    pub fn pending_addr(&self, source: u32) -> Option<u64> {
        self.valid_source(source)
            .then(|| self.config.base + self.config.pending_base + u64::from(source / 32) * 4)
    }

    /// Address of the enable array of `context`.
    pub fn enable_addr(&self, context: u32) -> Option<u64> {
        (context < self.context_count()).then(|| {
            self.config.base + self.config.enable_base + u64::from(context) * self.config.enable_stride
        })
    }

    /// Address of the priority-threshold register of `context`.
    pub fn threshold_addr(&self, context: u32) -> Option<u64> {
        (context < self.context_count()).then(|| {
            self.config.base + self.config.context_base + u64::from(context) * self.config.context_stride
        })
    }

    /// Address of the claim/complete register of `context`.
    pub fn claim_addr(&self, context: u32) -> Option<u64> {
        self.threshold_addr(context).map(|addr| addr + 4)
    }

    /// Checks that source `line` exists and is not driven yet.
    ///
    /// # Errors
    ///
    /// [`LayoutError::IrqOutOfRange`] for source 0 or a line above the source count, and
    /// [`LayoutError::IrqInUse`] if another device already drives the line.
    pub fn check_source(&self, line: u32) -> Result<(), LayoutError> {
        let socket = self.config.socket;
        if !self.valid_source(line) {
            return Err(LayoutError::IrqOutOfRange {
                socket,
                line,
                sources: self.config.num_sources,
            });
        }
        match self.source_owner(line) {
            Some(existing) => Err(LayoutError::IrqInUse {
                socket,
                line,
                owner: existing.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Records `owner` as the device driving source `line`.
    ///
    /// # Errors
    ///
    /// See [`Self::check_source`]; the table is unchanged on error.
    pub fn claim_source(&mut self, line: u32, owner: &str) -> Result<(), LayoutError> {
        self.check_source(line)?;
        if let Some(slot) = self.sources.get_mut(line as usize) {
            *slot = Some(owner.to_string());
        }
        Ok(())
    }

    /// Returns the device driving source `line`, if any.
    pub fn source_owner(&self, line: u32) -> Option<&str> {
        self.sources.get(line as usize)?.as_deref()
    }

    /// Iterates over `(line, owner)` for every claimed source.
    pub fn claimed_sources(&self) -> impl Iterator<Item = (u32, &str)> {
        self.sources
            .iter()
            .zip(0u32..)
            .filter_map(|(owner, line)| owner.as_deref().map(|o| (line, o)))
    }

    fn valid_source(&self, source: u32) -> bool {
        source >= 1 && source <= self.config.num_sources
    }
}
