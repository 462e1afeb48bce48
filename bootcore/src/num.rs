//! Integer helpers for frequency and divisor math.
//!
//! Clock math rounds to nearest instead of truncating so the
//! steady-state frequency error stays below half a step.

/// Divide rounding to nearest, ties away from zero.
///
/// Computed in 64 bits so `n + d / 2` cannot overflow.
///
/// # Panics
/// Panics if `d` is zero. In a `const` context this is a build error.
#[inline]
pub const fn round_div(n: u32, d: u32) -> u32 {
    let n = n as u64;
    let d = d as u64;
    ((n + d / 2) / d) as u32
}

/// Whether `value` fits an unsigned field of `bits` width.
#[inline]
pub const fn fits(value: u32, bits: u32) -> bool {
    bits >= 32 || value < (1 << bits)
}
