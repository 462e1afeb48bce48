//! Park utilities.
//!
//! Every fatal path in bring-up ends here: unhandled interrupts,
//! an unusable tick configuration, and the firmware panic handler.

/// Infinite loop for non-recoverable situations.
/// Uses architecture-specific wait instructions when possible so a
/// debugger attached to a parked core finds it idle in this loop.
#[inline(always)]
pub fn halt_loop() -> ! {
    loop {
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        unsafe {
            core::arch::asm!("wfe", options(nomem, nostack));
        }

        #[cfg(not(all(target_arch = "arm", target_os = "none")))]
        core::hint::spin_loop();
    }
}
