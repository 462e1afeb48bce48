//! SysTick timer and system handler priorities.
//!
//! The System Control Space layout is fixed by the architecture, so the
//! registers live here rather than in a chip crate.

use bitflags::bitflags;
use bootcore::num::{fits, round_div};
use bootcore::{Error, Register, Registers, Result};

/// SysTick control and status.
pub const SYST_CSR: Register = Register::word("SYST.CSR", 0xE000_E010);
/// SysTick reload value.
pub const SYST_RVR: Register = Register::word("SYST.RVR", 0xE000_E014);
/// SysTick current value.
pub const SYST_CVR: Register = Register::word("SYST.CVR", 0xE000_E018);
/// System handler priority register 2 (SVCall).
pub const SCB_SHPR2: Register = Register::word("SCB.SHPR2", 0xE000_ED1C);
/// System handler priority register 3 (PendSV, SysTick).
pub const SCB_SHPR3: Register = Register::word("SCB.SHPR3", 0xE000_ED20);

/// Priority bits implemented by ARMv6-M.
pub const PRIO_BITS: u32 = 2;

/// Lowest (numerically highest) priority level.
pub const LOWEST_PRIORITY: u8 = (1 << PRIO_BITS) - 1;

/// Width of the reload counter.
pub const RELOAD_BITS: u32 = 24;

bitflags! {
    /// SYST_CSR fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Csr: u32 {
        const ENABLE = 1 << 0;
        const TICKINT = 1 << 1;
        const CLKSOURCE = 1 << 2;
        const COUNTFLAG = 1 << 16;
    }
}

/// System handlers with a programmable priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemHandler {
    SvCall,
    PendSv,
    SysTick,
}

impl SystemHandler {
    const fn location(self) -> (Register, u32) {
        match self {
            SystemHandler::SvCall => (SCB_SHPR2, 24),
            SystemHandler::PendSv => (SCB_SHPR3, 16),
            SystemHandler::SysTick => (SCB_SHPR3, 24),
        }
    }
}

/// A SysTick reload value that fits the 24-bit counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reload(u32);

impl Reload {
    /// Reload for a period of `ticks` core cycles.
    pub const fn new(ticks: u32) -> Result<Self> {
        if ticks == 0 || !fits(ticks - 1, RELOAD_BITS) {
            return Err(Error::ReloadOutOfRange);
        }
        Ok(Self(ticks - 1))
    }

    /// Reload for `tick_hz` interrupts per second from a `core_hz` clock,
    /// rounded to the nearest cycle.
    pub const fn for_rate(core_hz: u32, tick_hz: u32) -> Result<Self> {
        if core_hz == 0 || tick_hz == 0 {
            return Err(Error::ZeroFrequency);
        }
        Self::new(round_div(core_hz, tick_hz))
    }

    /// Value written to SYST_RVR.
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Start SysTick from the core clock with its interrupt enabled and at
/// the lowest priority.
pub fn start<R: Registers + ?Sized>(regs: &mut R, reload: Reload) {
    regs.write(SYST_RVR, reload.value());
    set_priority(regs, SystemHandler::SysTick, LOWEST_PRIORITY);
    regs.write(SYST_CVR, 0);
    regs.write(SYST_CSR, (Csr::CLKSOURCE | Csr::TICKINT | Csr::ENABLE).bits());
}

/// Set a system handler's priority level (0 is highest).
/// Levels beyond [`LOWEST_PRIORITY`] are truncated to the implemented bits.
pub fn set_priority<R: Registers + ?Sized>(regs: &mut R, handler: SystemHandler, level: u8) {
    let (reg, shift) = handler.location();
    let encoded = ((level as u32) << (8 - PRIO_BITS)) & 0xFF;
    regs.modify(reg, |v| (v & !(0xFF << shift)) | (encoded << shift));
}
