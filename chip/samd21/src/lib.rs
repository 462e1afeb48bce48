//! # samd21
//!
//! Bring-up for the Microchip SAMD21 (Cortex-M0+): the device vector
//! table and handler registry, the reset sequence, and the clock tree
//! that takes the core from 1 MHz on OSC8M to 48 MHz on the DFLL48M.
//!
//! Everything that touches hardware goes through
//! [`bootcore::Registers`] and [`bootcore::Barrier`]; only [`rt`] binds
//! them to real MMIO, and only on the target.

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod interrupt;
pub mod mmio;
pub mod regs;
pub mod reset;
pub mod timer;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod rt;

#[cfg(test)]
pub(crate) mod sim;

pub use clock::{ClockConfig, ClockTree};
pub use interrupt::{DeviceVectors, Handlers, IRQ_COUNT, Interrupt};
pub use reset::{ResetSequencer, ResetStage};
pub use timer::{elapsed_since, millis};
