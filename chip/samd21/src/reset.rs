//! Reset sequencing.
//!
//! The reset handler runs with nothing initialised: `.data` still holds
//! whatever was in RAM and `.bss` is not zero. The sequencer fixes both
//! before any code can observe a global, brings up the clock tree, and
//! hands control to the application entry point. It never returns.

use bootcore::{Barrier, BssSegment, DataSegment, Registers};

use crate::clock::{ClockConfig, ClockTree};

/// Reset stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStage {
    /// Copy the `.data` image from flash to RAM.
    CopyData,
    /// Zero `.bss`.
    ZeroBss,
    /// Run the clock tree configurator.
    ClockBringUp,
    /// Call the application entry point.
    Transfer,
}

pub struct ResetSequencer<'a, R: Registers + ?Sized, B: Barrier> {
    regs: &'a mut R,
    barrier: &'a mut B,
    data: DataSegment,
    bss: BssSegment,
    config: ClockConfig,
}

impl<'a, R: Registers + ?Sized, B: Barrier> ResetSequencer<'a, R, B> {
    pub fn new(
        regs: &'a mut R,
        barrier: &'a mut B,
        data: DataSegment,
        bss: BssSegment,
        config: ClockConfig,
    ) -> Self {
        Self { regs, barrier, data, bss, config }
    }

    /// Run every stage and transfer to `entry`.
    ///
    /// # Safety
    /// `data` and `bss` must describe the linker's segments (or, in
    /// tests, memory nobody else is using), and nothing may have read a
    /// global yet.
    pub unsafe fn run(self, entry: fn() -> !) -> ! {
        // No logging until both segments are valid: the logger itself
        // lives in them.
        unsafe {
            self.data.init();
            self.bss.init();
        }

        log::debug!("reset: {:?} {} bytes", ResetStage::CopyData, self.data.len());
        log::debug!("reset: {:?} {} bytes", ResetStage::ZeroBss, self.bss.len());

        log::debug!("reset: {:?}", ResetStage::ClockBringUp);
        ClockTree::new(self.regs, self.barrier, self.config).configure();

        log::debug!("reset: {:?}", ResetStage::Transfer);
        entry()
    }
}
