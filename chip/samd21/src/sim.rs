//! Simulated SAMD21 clock registers for host tests.
//!
//! Models just enough of SYSCTRL, GCLK and PM to check the bring-up
//! protocol: status flags assert only after `latency` polls, and any
//! write that the real hardware would mishandle is recorded as a
//! violation instead of silently succeeding.
//!
//! DFLL lock is modelled in two phases: fine lock (DFLLLCKF) only starts
//! counting down once a poll has observed coarse lock (DFLLLCKC).

use std::collections::HashMap;

use bootcore::{Register, Registers};

use crate::regs::*;

/// Frequency the simulated crystal runs at.
const CRYSTAL_HZ: u32 = 32_768;

/// Highest core clock the flash serves without wait states.
const ZERO_WAIT_STATE_HZ: u32 = 24_000_000;

/// One register access, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read { reg: Register, value: u32 },
    Write { reg: Register, value: u32 },
}

pub struct SimRegisters {
    latency: u32,
    values: HashMap<usize, u32>,
    trace: Vec<Access>,
    violations: Vec<String>,
    /// PCLKSR flags currently asserted.
    ready: Pclksr,
    /// PCLKSR flags still counting down, with polls remaining.
    pending: Vec<(Pclksr, u32)>,
    sync_busy: u32,
    swrst: u32,
    generators: [Option<GenSource>; 9],
    dfll_reference: bool,
    dfll_lock_started: bool,
    coarse_lock_seen: bool,
    /// PCLKSR masks polled for, one entry per run of identical polls.
    awaited: Vec<Pclksr>,
    dfll_hz: u32,
}

impl SimRegisters {
    /// Register file in its reset state. Every status flag takes
    /// `latency` polls to assert after the write that triggers it.
    pub fn new(latency: u32) -> Self {
        let mut values = HashMap::new();
        values.insert(PM_APBAMASK.addr, 0x0000_007F);
        values.insert(SYSCTRL_XOSC32K.addr, Xosc32k::ONDEMAND.bits());
        values.insert(SYSCTRL_DFLLCTRL.addr, Dfllctrl::ONDEMAND.bits());
        values.insert(
            SYSCTRL_OSC8M.addr,
            (0x3 << 8) | (Osc8m::ONDEMAND | Osc8m::ENABLE).bits(),
        );

        let mut generators = [None; 9];
        // GCLK0 runs from OSC8M out of reset.
        generators[0] = Some(GenSource::Osc8m);

        Self {
            latency,
            values,
            trace: Vec::new(),
            violations: Vec::new(),
            ready: Pclksr::OSC8MRDY,
            pending: Vec::new(),
            sync_busy: 0,
            swrst: 0,
            generators,
            dfll_reference: false,
            dfll_lock_started: false,
            coarse_lock_seen: false,
            awaited: Vec::new(),
            dfll_hz: 0,
        }
    }

    pub fn trace(&self) -> &[Access] {
        &self.trace
    }

    /// Writes only, as `(register name, value)`.
    pub fn writes(&self) -> Vec<(&'static str, u32)> {
        self.trace
            .iter()
            .filter_map(|a| match a {
                Access::Write { reg, value } => Some((reg.name, *value)),
                Access::Read { .. } => None,
            })
            .collect()
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// PCLKSR flags waited for, in order. Back-to-back waits on the same
    /// flag collapse into one entry.
    pub fn awaited(&self) -> &[Pclksr] {
        &self.awaited
    }

    fn await_pclksr(&mut self, mask: Pclksr) {
        if self.awaited.last() != Some(&mask) {
            self.awaited.push(mask);
        }
        if mask.contains(Pclksr::DFLLLCKF) && !self.coarse_lock_seen {
            self.violation("DFLL fine lock awaited before coarse lock".into());
        }
    }

    fn observed_pclksr(&mut self, mask: Pclksr) {
        if mask.contains(Pclksr::DFLLLCKC) && !self.coarse_lock_seen {
            self.coarse_lock_seen = true;
            self.schedule(Pclksr::DFLLLCKF, self.latency);
        }
    }

    fn stored(&self, reg: Register) -> u32 {
        self.values.get(&reg.addr).copied().unwrap_or(0)
    }

    fn violation(&mut self, what: String) {
        self.violations.push(what);
    }

    fn schedule(&mut self, flag: Pclksr, polls: u32) {
        self.ready.remove(flag);
        self.pending.retain(|(f, _)| *f != flag);
        if polls == 0 {
            self.ready.insert(flag);
        } else {
            self.pending.push((flag, polls));
        }
    }

    fn pending(&self, flag: Pclksr) -> bool {
        self.pending.iter().any(|(f, _)| *f == flag)
    }

    fn poll_pclksr(&mut self) -> u32 {
        let value = self.ready.bits();
        for (_, remaining) in self.pending.iter_mut() {
            *remaining -= 1;
        }
        let mut asserted = Pclksr::empty();
        self.pending.retain(|&(flag, remaining)| {
            if remaining == 0 {
                asserted.insert(flag);
            }
            remaining != 0
        });
        self.ready.insert(asserted);
        value
    }

    fn poll_countdown(counter: &mut u32, bit: u32) -> u32 {
        if *counter > 0 {
            *counter -= 1;
            bit
        } else {
            0
        }
    }

    fn write_gclk(&mut self, reg: Register, value: u32) {
        if self.stored(PM_APBAMASK) & ApbAMask::GCLK.bits() == 0 {
            self.violation(format!("{} written with the GCLK bus clock gated", reg.name));
        }
        if self.sync_busy > 0 {
            self.violation(format!("{} written while SYNCBUSY", reg.name));
        }
        if self.swrst > 0 {
            self.violation(format!("{} written during software reset", reg.name));
        }
        self.sync_busy = self.latency;

        if reg == GCLK_CTRL {
            if value & GclkCtrl::SWRST.bits() != 0 {
                self.swrst = self.latency;
                self.generators = [None; 9];
                self.generators[0] = Some(GenSource::Osc8m);
                self.dfll_reference = false;
                for r in [GCLK_CLKCTRL, GCLK_GENCTRL, GCLK_GENDIV] {
                    self.values.remove(&r.addr);
                }
            }
            self.values.insert(reg.addr, value & !GclkCtrl::SWRST.bits());
            return;
        }

        if reg == GCLK_GENCTRL {
            let id = (value & 0xF) as usize;
            let Some(source) = GenSource::from_genctrl(value) else {
                self.violation(format!("GENCTRL{id}: unknown source"));
                return;
            };
            self.check_source(id, source);
            if value & Genctrl::GENEN.bits() != 0 && id < self.generators.len() {
                self.generators[id] = Some(source);
            }
        }

        if reg == GCLK_CLKCTRL && value & Clkctrl::CLKEN.bits() != 0 {
            let generator = ((value >> 8) & 0xF) as usize;
            if self.generators.get(generator).copied().flatten().is_none() {
                self.violation(format!("CLKCTRL fed from disabled GCLK{generator}"));
            }
            if value & 0x3F == clkctrl::ID_DFLL48M_REF as u32 {
                self.dfll_reference = true;
            }
        }

        self.values.insert(reg.addr, value);
    }

    fn check_source(&mut self, id: usize, source: GenSource) {
        let required = match source {
            GenSource::Xosc32k => Pclksr::XOSC32KRDY,
            GenSource::Osc8m => Pclksr::OSC8MRDY,
            GenSource::Dfll48m => Pclksr::DFLLRDY | Pclksr::DFLLLCKC | Pclksr::DFLLLCKF,
            _ => Pclksr::empty(),
        };
        if !self.ready.contains(required) {
            self.violation(format!("GCLK{id} switched to {source:?} before it was ready"));
        }
        if id == 0 && source == GenSource::Dfll48m {
            let rws = (self.stored(NVMCTRL_CTRLB) & rws::MASK) >> 1;
            if self.dfll_hz > ZERO_WAIT_STATE_HZ && rws == 0 {
                self.violation(format!("core at {} Hz with no flash wait states", self.dfll_hz));
            }
        }
    }

    fn write_dfll(&mut self, reg: Register, value: u32) {
        if self.pending(Pclksr::DFLLRDY) {
            self.violation(format!("{} written before DFLLRDY", reg.name));
        }
        let ctrl = if reg == SYSCTRL_DFLLCTRL { value } else { self.stored(SYSCTRL_DFLLCTRL) };
        if reg != SYSCTRL_DFLLCTRL && ctrl & Dfllctrl::ONDEMAND.bits() != 0 {
            self.violation(format!("{} written while DFLL is on demand", reg.name));
        }
        if reg == SYSCTRL_DFLLMUL {
            self.dfll_hz = (value & 0xFFFF) * CRYSTAL_HZ;
        }

        let closed_loop = (Dfllctrl::MODE | Dfllctrl::ENABLE).bits();
        if reg == SYSCTRL_DFLLCTRL && value & closed_loop == closed_loop && !self.dfll_lock_started {
            if !self.dfll_reference {
                self.violation("DFLL closed loop without a reference clock".into());
            }
            self.dfll_lock_started = true;
            self.schedule(Pclksr::DFLLLCKC, 2 * self.latency);
        }

        self.schedule(Pclksr::DFLLRDY, self.latency);
        self.values.insert(reg.addr, value);
    }
}

impl Registers for SimRegisters {
    fn read(&mut self, reg: Register) -> u32 {
        let value = if reg == SYSCTRL_PCLKSR {
            self.poll_pclksr()
        } else if reg == GCLK_STATUS {
            Self::poll_countdown(&mut self.sync_busy, GclkStatus::SYNCBUSY.bits())
        } else if reg == GCLK_CTRL {
            self.stored(reg) | Self::poll_countdown(&mut self.swrst, GclkCtrl::SWRST.bits())
        } else {
            self.stored(reg)
        };
        self.trace.push(Access::Read { reg, value });
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        let value = value & reg.width.mask();
        self.trace.push(Access::Write { reg, value });

        if reg.addr >= GCLK_BASE && reg.addr < GCLK_BASE + 0x10 {
            self.write_gclk(reg, value);
        } else if reg == SYSCTRL_DFLLCTRL || reg == SYSCTRL_DFLLMUL {
            self.write_dfll(reg, value);
        } else if reg == SYSCTRL_XOSC32K {
            let was_enabled = self.stored(reg) & Xosc32k::ENABLE.bits() != 0;
            if value & Xosc32k::ENABLE.bits() != 0 && !was_enabled {
                self.schedule(Pclksr::XOSC32KRDY, self.latency);
            }
            self.values.insert(reg.addr, value);
        } else {
            self.values.insert(reg.addr, value);
        }
    }

    fn bits_set(&mut self, reg: Register, bits: u32) -> bool {
        let mask = Pclksr::from_bits_truncate(bits);
        if reg == SYSCTRL_PCLKSR {
            self.await_pclksr(mask);
        }
        let set = self.read(reg) & bits == bits;
        if reg == SYSCTRL_PCLKSR && set {
            self.observed_pclksr(mask);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_assert_after_latency_polls() {
        let mut sim = SimRegisters::new(3);
        sim.write(SYSCTRL_XOSC32K, Xosc32k::ENABLE.bits());
        let polls: Vec<bool> = (0..5)
            .map(|_| sim.bits_set(SYSCTRL_PCLKSR, Pclksr::XOSC32KRDY.bits()))
            .collect();
        assert_eq!(polls, [false, false, false, true, true]);
    }

    #[test]
    fn fine_lock_waits_for_observed_coarse_lock() {
        let mut sim = SimRegisters::new(0);
        sim.write(SYSCTRL_DFLLCTRL, Dfllctrl::ENABLE.bits());
        sim.write(SYSCTRL_DFLLMUL, 1465);
        sim.write(SYSCTRL_DFLLCTRL, (Dfllctrl::MODE | Dfllctrl::ENABLE).bits());
        // Coarse lock asserted, fine lock not yet started.
        assert!(!sim.bits_set(SYSCTRL_PCLKSR, Pclksr::DFLLLCKF.bits()));
        assert!(sim.violations().iter().any(|v| v.contains("fine lock awaited before coarse")));

        assert!(sim.bits_set(SYSCTRL_PCLKSR, Pclksr::DFLLLCKC.bits()));
        assert!(sim.bits_set(SYSCTRL_PCLKSR, Pclksr::DFLLLCKF.bits()));
        assert_eq!(sim.awaited(), [Pclksr::DFLLLCKF, Pclksr::DFLLLCKC, Pclksr::DFLLLCKF]);
    }

    #[test]
    fn gclk_write_while_busy_is_a_violation() {
        let mut sim = SimRegisters::new(2);
        sim.write(GCLK_GENDIV, 1);
        sim.write(GCLK_GENDIV, 2);
        assert_eq!(sim.violations().len(), 1);
    }

    #[test]
    fn gated_gclk_is_a_violation() {
        let mut sim = SimRegisters::new(0);
        sim.write(PM_APBAMASK, 0);
        sim.write(GCLK_CTRL, GclkCtrl::SWRST.bits());
        assert!(sim.violations()[0].contains("gated"));
    }
}
