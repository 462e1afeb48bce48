//! ARMv6-M architecture support.
//!
//! Provides the vector table layout, the default handler registry for
//! the architectural exceptions, SysTick programming, and CPU utilities
//! for Cortex-M0+ platforms.

#![cfg_attr(not(test), no_std)]

pub mod systick;
pub mod vectors;

pub use vectors::{CoreHandlers, Exception, Handler, ResetHandler, Vector, VectorTable, trap};

/// Wait for interrupt.
#[inline]
pub fn wfi() {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    core::hint::spin_loop();
}
