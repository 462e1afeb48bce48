//! Target runtime glue: linker symbols and the real reset path.

use bootcore::sync::Spin;
use bootcore::{BssSegment, DataSegment};

use crate::clock::ClockConfig;
use crate::mmio::Mmio;
use crate::reset::ResetSequencer;

// Provided by link.x.
unsafe extern "C" {
    /// Initial stack pointer, the top of RAM.
    pub static _stack_top: u32;

    static __data_load: u32;
    static mut __data_start: u32;
    static mut __data_end: u32;
    static mut __bss_start: u32;
    static mut __bss_end: u32;
}

/// Body of the reset handler generated by [`boot!`](crate::boot).
///
/// # Safety
/// Must only be called once, from the reset vector.
pub unsafe fn start(entry: fn() -> !, config: ClockConfig) -> ! {
    let (data, bss) = unsafe {
        (
            DataSegment::new(&raw const __data_load, &raw mut __data_start, &raw mut __data_end),
            BssSegment::new(&raw mut __bss_start, &raw mut __bss_end),
        )
    };
    let mut regs = unsafe { Mmio::new() };
    let mut barrier = Spin;
    unsafe { ResetSequencer::new(&mut regs, &mut barrier, data, bss, config).run(entry) }
}
