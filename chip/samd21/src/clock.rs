//! Clock tree bring-up.
//!
//! Takes the chip from its reset clocking (OSC8M / 8 = 1 MHz) to a
//! 48 MHz core clock from the DFLL48M locked to the 32.768 kHz crystal:
//!
//! ```text
//! XOSC32K ─► GCLK1 ─► DFLL48M ref ─► DFLL48M (closed loop) ─► GCLK0 ─► CPU/APB
//! OSC8M ───► GCLK3 (undivided, auxiliary)
//! ```
//!
//! Every step depends on the one before it, and every dependency is a
//! hardware flag polled through the [`Barrier`]. A source may only feed
//! another node after its ready or lock flag was observed set.

use arch_armv6m::systick::{self, LOWEST_PRIORITY, Reload, SystemHandler};
use bootcore::num::{fits, round_div};
use bootcore::{Barrier, Error, Register, Registers, Result};

use crate::regs::*;

/// Main clock generator (CPU and bus clocks).
pub const GCLK_MAIN: u8 = 0;
/// Generator driven by the 32 kHz crystal.
pub const GCLK_XOSC32K: u8 = 1;
/// Generator driven by OSC8M.
pub const GCLK_OSC8M: u8 = 3;

/// Board clock parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Target core clock.
    pub cpu_hz: u32,
    /// External crystal frequency, the DFLL reference.
    pub crystal_hz: u32,
    /// XOSC32K.STARTUP selector.
    pub crystal_startup: u8,
    /// NVMCTRL.CTRLB.RWS value safe at `cpu_hz`.
    pub flash_wait_states: u8,
    /// SysTick rate.
    pub tick_hz: u32,
}

impl ClockConfig {
    /// Adafruit Feather M0: 48 MHz from a 32.768 kHz crystal, 1 ms tick.
    pub const FEATHER_M0: ClockConfig = ClockConfig {
        cpu_hz: 48_000_000,
        crystal_hz: 32_768,
        crystal_startup: 6,
        flash_wait_states: rws::HALF,
        tick_hz: 1_000,
    };

    /// DFLL48M multiplication factor, rounded to nearest.
    pub const fn dfll_multiplier(&self) -> Result<u32> {
        if self.crystal_hz == 0 || self.cpu_hz == 0 {
            return Err(Error::ZeroFrequency);
        }
        let factor = round_div(self.cpu_hz, self.crystal_hz);
        if factor == 0 || !fits(factor, dfllmul::MUL_BITS) {
            return Err(Error::MultiplierOutOfRange);
        }
        Ok(factor)
    }

    /// Check everything the clock tree programs before the tick timer.
    ///
    /// The tick reload is deliberately not checked here: an unusable
    /// tick rate is caught (and parks) when the timer is programmed.
    pub const fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 {
            return Err(Error::ZeroFrequency);
        }
        if !fits(self.crystal_startup as u32, 3) || !fits(self.flash_wait_states as u32, 4) {
            return Err(Error::FieldOutOfRange);
        }
        match self.dfll_multiplier() {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// SysTick reload for `tick_hz` at `cpu_hz`.
    pub const fn systick_reload(&self) -> Result<Reload> {
        Reload::for_rate(self.cpu_hz, self.tick_hz)
    }
}

const _: () = assert!(ClockConfig::FEATHER_M0.validate().is_ok());

/// Bring-up steps, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    FlashWaitStates,
    GclkBusClock,
    Crystal,
    GclkReset,
    CrystalGenerator,
    DfllReference,
    DfllLock,
    MainClock,
    AuxOscillator,
    BusDividers,
    NvmManualWrite,
    TickTimer,
    TickPriority,
}

/// One-shot clock tree configurator.
pub struct ClockTree<'a, R: Registers + ?Sized, B: Barrier> {
    regs: &'a mut R,
    barrier: &'a mut B,
    config: ClockConfig,
}

impl<'a, R: Registers + ?Sized, B: Barrier> ClockTree<'a, R, B> {
    pub fn new(regs: &'a mut R, barrier: &'a mut B, config: ClockConfig) -> Self {
        Self { regs, barrier, config }
    }

    /// Run the whole bring-up. Parks on an unusable configuration.
    pub fn configure(mut self) {
        let multiplier = match self.config.validate().and(self.config.dfll_multiplier()) {
            Ok(m) => m,
            Err(e) => {
                log::error!("clock: {}", e);
                self.barrier.park()
            }
        };

        self.step(Step::FlashWaitStates);
        let wait_states = rws::value(self.config.flash_wait_states);
        self.regs.modify(NVMCTRL_CTRLB, |v| (v & !rws::MASK) | wait_states);

        self.step(Step::GclkBusClock);
        self.regs.set_bits(PM_APBAMASK, ApbAMask::GCLK.bits());

        self.step(Step::Crystal);
        self.regs.write(
            SYSCTRL_XOSC32K,
            xosc32k_startup::value(self.config.crystal_startup)
                | (Xosc32k::XTALEN | Xosc32k::EN32K).bits(),
        );
        self.regs.set_bits(SYSCTRL_XOSC32K, Xosc32k::ENABLE.bits());
        self.wait_pclksr(Pclksr::XOSC32KRDY);

        self.step(Step::GclkReset);
        self.regs.write(GCLK_CTRL, GclkCtrl::SWRST.bits());
        self.barrier.until(&mut *self.regs, |r| {
            r.bits_clear(GCLK_CTRL, GclkCtrl::SWRST.bits())
                && r.bits_clear(GCLK_STATUS, GclkStatus::SYNCBUSY.bits())
        });

        self.step(Step::CrystalGenerator);
        self.generator(GCLK_XOSC32K, GenSource::Xosc32k, Genctrl::GENEN);

        self.step(Step::DfllReference);
        self.gclk_write(
            GCLK_CLKCTRL,
            clkctrl::id(clkctrl::ID_DFLL48M_REF)
                | clkctrl::generator(GCLK_XOSC32K)
                | Clkctrl::CLKEN.bits(),
        );

        self.step(Step::DfllLock);
        self.lock_dfll(multiplier);

        self.step(Step::MainClock);
        self.generator(GCLK_MAIN, GenSource::Dfll48m, Genctrl::IDC | Genctrl::GENEN);

        self.step(Step::AuxOscillator);
        self.regs.clear_bits(SYSCTRL_OSC8M, osc8m_presc::MASK | Osc8m::ONDEMAND.bits());
        self.generator(GCLK_OSC8M, GenSource::Osc8m, Genctrl::GENEN);

        self.step(Step::BusDividers);
        self.regs.write(PM_CPUSEL, PM_DIV1);
        self.regs.write(PM_APBASEL, PM_DIV1);
        self.regs.write(PM_APBBSEL, PM_DIV1);
        self.regs.write(PM_APBCSEL, PM_DIV1);

        self.step(Step::NvmManualWrite);
        self.regs.set_bits(NVMCTRL_CTRLB, NvmCtrlB::MANW.bits());

        self.step(Step::TickTimer);
        match self.config.systick_reload() {
            Ok(reload) => systick::start(&mut *self.regs, reload),
            Err(e) => {
                log::error!("clock: tick timer: {}", e);
                self.barrier.park()
            }
        }

        self.step(Step::TickPriority);
        systick::set_priority(&mut *self.regs, SystemHandler::SysTick, LOWEST_PRIORITY - 1);
    }

    fn step(&self, step: Step) {
        log::trace!("clock: {:?}", step);
    }

    /// DFLL48M: open loop first, then closed loop against the GCLK1
    /// reference. Every DFLL register write must see DFLLRDY before the
    /// next one.
    fn lock_dfll(&mut self, multiplier: u32) {
        // A lone ENABLE write clears ONDEMAND; with ONDEMAND set the DFLL
        // registers are not accessible and DFLLRDY never asserts.
        self.regs.write(SYSCTRL_DFLLCTRL, Dfllctrl::ENABLE.bits());
        self.wait_pclksr(Pclksr::DFLLRDY);

        self.regs.write(
            SYSCTRL_DFLLMUL,
            dfllmul::cstep(dfllmul::CSTEP_HALF)
                | dfllmul::fstep(dfllmul::FSTEP_HALF)
                | dfllmul::mul(multiplier),
        );
        self.wait_pclksr(Pclksr::DFLLRDY);

        self.regs.set_bits(
            SYSCTRL_DFLLCTRL,
            (Dfllctrl::MODE | Dfllctrl::WAITLOCK | Dfllctrl::QLDIS).bits(),
        );
        self.wait_pclksr(Pclksr::DFLLRDY);

        self.regs.set_bits(SYSCTRL_DFLLCTRL, Dfllctrl::ENABLE.bits());
        self.wait_pclksr(Pclksr::DFLLLCKC);
        self.wait_pclksr(Pclksr::DFLLLCKF);
        self.wait_pclksr(Pclksr::DFLLRDY);
    }

    /// Program an undivided generator. Its source must already be ready.
    fn generator(&mut self, id: u8, source: GenSource, flags: Genctrl) {
        self.gclk_write(GCLK_GENDIV, gendiv::id(id) | gendiv::div(0));
        self.gclk_write(GCLK_GENCTRL, genctrl::id(id) | genctrl::source(source) | flags.bits());
    }

    /// GCLK writes cross a clock domain; each one is followed by a wait
    /// for SYNCBUSY to clear.
    fn gclk_write(&mut self, reg: Register, value: u32) {
        self.regs.write(reg, value);
        self.barrier
            .until(&mut *self.regs, |r| r.bits_clear(GCLK_STATUS, GclkStatus::SYNCBUSY.bits()));
    }

    fn wait_pclksr(&mut self, flag: Pclksr) {
        self.barrier
            .until(&mut *self.regs, |r| r.bits_set(SYSCTRL_PCLKSR, flag.bits()));
    }
}
