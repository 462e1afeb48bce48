//! SAMD21 register map.
//!
//! Only the registers touched during bring-up. Addresses, widths and
//! bit positions follow the SAMD21 datasheet (DS40001882) and must not
//! be "tidied": a wrong bit here is a silent hardware misconfiguration.

use bitflags::bitflags;
use bootcore::Register;

// ============================================================================
// Peripheral Base Addresses
// ============================================================================

pub const PM_BASE: usize = 0x4000_0400;
pub const SYSCTRL_BASE: usize = 0x4000_0800;
pub const GCLK_BASE: usize = 0x4000_0C00;
pub const NVMCTRL_BASE: usize = 0x4100_4000;

// ============================================================================
// NVMCTRL
// ============================================================================

pub const NVMCTRL_CTRLB: Register = Register::word("NVMCTRL.CTRLB", NVMCTRL_BASE + 0x04);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NvmCtrlB: u32 {
        /// Manual write: no automatic page write on the last word.
        const MANW = 1 << 7;
        const CACHEDIS = 1 << 18;
    }
}

/// CTRLB.RWS, flash read wait states.
pub mod rws {
    pub const MASK: u32 = 0xF << 1;
    /// Half wait state, enough for 48 MHz at 3.3 V.
    pub const HALF: u8 = 1;

    pub const fn value(wait_states: u8) -> u32 {
        ((wait_states as u32) << 1) & MASK
    }
}

// ============================================================================
// PM
// ============================================================================

pub const PM_CPUSEL: Register = Register::byte("PM.CPUSEL", PM_BASE + 0x08);
pub const PM_APBASEL: Register = Register::byte("PM.APBASEL", PM_BASE + 0x09);
pub const PM_APBBSEL: Register = Register::byte("PM.APBBSEL", PM_BASE + 0x0A);
pub const PM_APBCSEL: Register = Register::byte("PM.APBCSEL", PM_BASE + 0x0B);
pub const PM_APBAMASK: Register = Register::word("PM.APBAMASK", PM_BASE + 0x18);

/// CPUSEL / APBxSEL divider value for "divide by 1".
pub const PM_DIV1: u32 = 0;

bitflags! {
    /// APB bridge A clock gates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ApbAMask: u32 {
        const PAC0 = 1 << 0;
        const PM = 1 << 1;
        const SYSCTRL = 1 << 2;
        const GCLK = 1 << 3;
        const WDT = 1 << 4;
        const RTC = 1 << 5;
        const EIC = 1 << 6;
    }
}

// ============================================================================
// SYSCTRL
// ============================================================================

pub const SYSCTRL_PCLKSR: Register = Register::word("SYSCTRL.PCLKSR", SYSCTRL_BASE + 0x0C);
pub const SYSCTRL_XOSC32K: Register = Register::half("SYSCTRL.XOSC32K", SYSCTRL_BASE + 0x14);
pub const SYSCTRL_OSC8M: Register = Register::word("SYSCTRL.OSC8M", SYSCTRL_BASE + 0x20);
pub const SYSCTRL_DFLLCTRL: Register = Register::half("SYSCTRL.DFLLCTRL", SYSCTRL_BASE + 0x24);
pub const SYSCTRL_DFLLMUL: Register = Register::word("SYSCTRL.DFLLMUL", SYSCTRL_BASE + 0x2C);

bitflags! {
    /// Power and clocks status.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Pclksr: u32 {
        const XOSCRDY = 1 << 0;
        const XOSC32KRDY = 1 << 1;
        const OSC32KRDY = 1 << 2;
        const OSC8MRDY = 1 << 3;
        const DFLLRDY = 1 << 4;
        const DFLLOOB = 1 << 5;
        const DFLLLCKF = 1 << 6;
        const DFLLLCKC = 1 << 7;
        const DFLLRCS = 1 << 8;
        const BOD33RDY = 1 << 9;
        const BOD33DET = 1 << 10;
        const B33SRDY = 1 << 11;
    }
}

bitflags! {
    /// 32 kHz external crystal oscillator control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Xosc32k: u32 {
        const ENABLE = 1 << 1;
        const XTALEN = 1 << 2;
        const EN32K = 1 << 3;
        const EN1K = 1 << 4;
        const AAMPEN = 1 << 5;
        const RUNSTDBY = 1 << 6;
        const ONDEMAND = 1 << 7;
        const WRTLOCK = 1 << 12;
    }
}

/// XOSC32K.STARTUP, crystal start-up time selector.
pub mod xosc32k_startup {
    pub const MASK: u32 = 0x7 << 8;

    pub const fn value(startup: u8) -> u32 {
        ((startup as u32) << 8) & MASK
    }
}

bitflags! {
    /// 8 MHz internal oscillator control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Osc8m: u32 {
        const ENABLE = 1 << 1;
        const RUNSTDBY = 1 << 6;
        const ONDEMAND = 1 << 7;
    }
}

/// OSC8M.PRESC, prescaler (0 = divide by 1).
pub mod osc8m_presc {
    pub const MASK: u32 = 0x3 << 8;
}

bitflags! {
    /// DFLL48M control.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Dfllctrl: u32 {
        const ENABLE = 1 << 1;
        /// Closed-loop mode.
        const MODE = 1 << 2;
        const STABLE = 1 << 3;
        const LLAW = 1 << 4;
        const USBCRM = 1 << 5;
        const RUNSTDBY = 1 << 6;
        const ONDEMAND = 1 << 7;
        const CCDIS = 1 << 8;
        /// Quick lock disable.
        const QLDIS = 1 << 9;
        const BPLCKC = 1 << 10;
        /// Output gated until lock.
        const WAITLOCK = 1 << 11;
    }
}

/// DFLLMUL fields.
pub mod dfllmul {
    /// Half the CSTEP range, the largest step the datasheet recommends.
    pub const CSTEP_HALF: u32 = 0x3F >> 1;
    /// Half the FSTEP range, the largest step the datasheet recommends.
    pub const FSTEP_HALF: u32 = 0x3FF >> 1;
    pub const MUL_BITS: u32 = 16;

    pub const fn mul(factor: u32) -> u32 {
        factor & 0xFFFF
    }

    pub const fn fstep(step: u32) -> u32 {
        (step & 0x3FF) << 16
    }

    pub const fn cstep(step: u32) -> u32 {
        (step & 0x3F) << 26
    }
}

// ============================================================================
// GCLK
// ============================================================================

pub const GCLK_CTRL: Register = Register::byte("GCLK.CTRL", GCLK_BASE + 0x0);
pub const GCLK_STATUS: Register = Register::byte("GCLK.STATUS", GCLK_BASE + 0x1);
pub const GCLK_CLKCTRL: Register = Register::half("GCLK.CLKCTRL", GCLK_BASE + 0x2);
pub const GCLK_GENCTRL: Register = Register::word("GCLK.GENCTRL", GCLK_BASE + 0x4);
pub const GCLK_GENDIV: Register = Register::word("GCLK.GENDIV", GCLK_BASE + 0x8);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GclkCtrl: u32 {
        const SWRST = 1 << 0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GclkStatus: u32 {
        const SYNCBUSY = 1 << 7;
    }
}

bitflags! {
    /// Generic clock channel control flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Clkctrl: u32 {
        const CLKEN = 1 << 14;
        const WRTLOCK = 1 << 15;
    }
}

/// CLKCTRL.ID / CLKCTRL.GEN fields.
pub mod clkctrl {
    /// Generic clock channel feeding the DFLL48M reference.
    pub const ID_DFLL48M_REF: u8 = 0x00;

    pub const fn id(channel: u8) -> u32 {
        (channel as u32) & 0x3F
    }

    pub const fn generator(number: u8) -> u32 {
        ((number as u32) & 0xF) << 8
    }
}

bitflags! {
    /// Generator control flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Genctrl: u32 {
        const GENEN = 1 << 16;
        /// Improve duty cycle.
        const IDC = 1 << 17;
        const OOV = 1 << 18;
        const OE = 1 << 19;
        const DIVSEL = 1 << 20;
        const RUNSTDBY = 1 << 21;
    }
}

/// GENCTRL.ID / GENCTRL.SRC fields.
pub mod genctrl {
    pub const SRC_MASK: u32 = 0x1F << 8;

    pub const fn id(number: u8) -> u32 {
        (number as u32) & 0xF
    }

    pub const fn source(src: super::GenSource) -> u32 {
        ((src as u32) << 8) & SRC_MASK
    }
}

/// GENDIV.ID / GENDIV.DIV fields.
pub mod gendiv {
    pub const fn id(number: u8) -> u32 {
        (number as u32) & 0xF
    }

    pub const fn div(div: u16) -> u32 {
        (div as u32) << 8
    }
}

/// Generator clock sources (GENCTRL.SRC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GenSource {
    Xosc = 0x00,
    Gclkin = 0x01,
    Gclkgen1 = 0x02,
    Osculp32k = 0x03,
    Osc32k = 0x04,
    Xosc32k = 0x05,
    Osc8m = 0x06,
    Dfll48m = 0x07,
    Fdpll = 0x08,
}

impl GenSource {
    /// Decode a GENCTRL value's source field.
    pub const fn from_genctrl(value: u32) -> Option<Self> {
        Some(match (value & genctrl::SRC_MASK) >> 8 {
            0x00 => GenSource::Xosc,
            0x01 => GenSource::Gclkin,
            0x02 => GenSource::Gclkgen1,
            0x03 => GenSource::Osculp32k,
            0x04 => GenSource::Osc32k,
            0x05 => GenSource::Xosc32k,
            0x06 => GenSource::Osc8m,
            0x07 => GenSource::Dfll48m,
            0x08 => GenSource::Fdpll,
            _ => return None,
        })
    }
}
