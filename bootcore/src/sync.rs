//! Barrier implementations.
//!
//! [`Spin`] is the production barrier: it polls forever and parks in
//! [`halt_loop`](crate::panic::halt_loop). [`Bounded`] is for host-side
//! tests: it gives up after a fixed number of polls and turns every
//! park into a panic, so a test can observe a wedged or parked sequence
//! instead of hanging.

use crate::traits::{Barrier, Registers};

/// Unbounded busy-wait barrier.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Barrier for Spin {
    #[inline]
    fn until<R: Registers + ?Sized>(&mut self, regs: &mut R, mut ready: impl FnMut(&mut R) -> bool) {
        while !ready(regs) {
            core::hint::spin_loop();
        }
    }

    fn park(&mut self) -> ! {
        crate::panic::halt_loop()
    }
}

// Literal macros so `panic!` keeps a `&'static str` payload without std.
macro_rules! parked {
    () => {
        "bring-up parked"
    };
}

macro_rules! wedged {
    () => {
        "barrier never released"
    };
}

/// Panic message raised by [`Bounded::park`].
pub const PARKED: &str = parked!();

/// Panic message raised when a [`Bounded`] wait runs out of polls.
pub const WEDGED: &str = wedged!();

/// Poll-limited barrier for host tests.
#[derive(Debug, Clone, Copy)]
pub struct Bounded {
    limit: usize,
    waits: usize,
    polls: usize,
}

impl Bounded {
    /// Create a barrier that allows at most `limit` polls per wait.
    pub const fn new(limit: usize) -> Self {
        Self { limit, waits: 0, polls: 0 }
    }

    /// Number of completed waits.
    pub fn waits(&self) -> usize {
        self.waits
    }

    /// Total number of predicate evaluations across all waits.
    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl Barrier for Bounded {
    fn until<R: Registers + ?Sized>(&mut self, regs: &mut R, mut ready: impl FnMut(&mut R) -> bool) {
        for _ in 0..self.limit {
            self.polls += 1;
            if ready(regs) {
                self.waits += 1;
                return;
            }
        }
        panic!(wedged!());
    }

    fn park(&mut self) -> ! {
        panic!(parked!());
    }
}
