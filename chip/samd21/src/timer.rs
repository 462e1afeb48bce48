//! Millisecond tick counter driven by SysTick.
//!
//! The runtime binds [`on_tick`] to the SysTick slot unless the
//! application supplies its own handler.

use core::sync::atomic::{AtomicU32, Ordering};

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// SysTick handler: one tick per millisecond at the default rate.
///
/// ARMv6-M has no atomic read-modify-write; a load and a store are
/// enough since only this handler writes the counter.
pub extern "C" fn on_tick() {
    let now = MILLIS.load(Ordering::Relaxed);
    MILLIS.store(now.wrapping_add(1), Ordering::Relaxed);
}

/// Ticks since the timer started. Wraps after about 49 days.
#[inline]
pub fn millis() -> u32 {
    MILLIS.load(Ordering::Relaxed)
}

/// Ticks elapsed since `start`, correct across one wrap.
#[inline]
pub fn elapsed_since(start: u32) -> u32 {
    millis().wrapping_sub(start)
}
