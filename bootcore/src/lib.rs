//! # bootcore
//!
//! Chip-agnostic abstractions for the samboot bring-up path.
//! Chip crates drive their hardware through the [`Registers`] and
//! [`Barrier`] traits so the same sequencing code runs against real
//! MMIO on target and against a simulated register file on the host.

#![cfg_attr(not(test), no_std)]

pub mod traits;
pub mod num;
pub mod panic;
pub mod segment;
pub mod sync;

pub use traits::*;
pub use segment::{BssSegment, DataSegment};
