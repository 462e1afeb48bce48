//! Memory segment initialisation.
//!
//! Runs before any global is read, so it only uses raw pointers and
//! volatile accesses; nothing here may touch `.data` or `.bss` itself.

use core::ptr::{read_volatile, write_volatile};

const WORD: usize = core::mem::size_of::<u32>();

/// Initialised-data segment: an image in flash copied to RAM.
#[derive(Debug, Clone, Copy)]
pub struct DataSegment {
    load: *const u32,
    start: *mut u32,
    end: *mut u32,
}

impl DataSegment {
    /// Describe a segment whose image lives at `load` and runs at
    /// `start..end`.
    ///
    /// # Safety
    /// `load` must be readable and `start..end` writable for the whole
    /// range, all word aligned, and `end >= start`.
    pub const unsafe fn new(load: *const u32, start: *mut u32, end: *mut u32) -> Self {
        Self { load, start, end }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        (self.end as usize).saturating_sub(self.start as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy is needed only for a non-empty image that is not already
    /// in place.
    pub fn needs_copy(&self) -> bool {
        !self.is_empty() && self.load != self.start as *const u32
    }

    /// Copy the image word by word in ascending address order.
    ///
    /// # Safety
    /// See [`DataSegment::new`]. Nothing may be reading the destination.
    pub unsafe fn init(&self) {
        if !self.needs_copy() {
            return;
        }
        let words = self.len() / WORD;
        for i in 0..words {
            unsafe {
                let value = read_volatile(self.load.add(i));
                write_volatile(self.start.add(i), value);
            }
        }
    }
}

/// Zero-initialised segment.
#[derive(Debug, Clone, Copy)]
pub struct BssSegment {
    start: *mut u32,
    end: *mut u32,
}

impl BssSegment {
    /// # Safety
    /// `start..end` must be writable, word aligned, with `end >= start`.
    pub const unsafe fn new(start: *mut u32, end: *mut u32) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        (self.end as usize).saturating_sub(self.start as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero the range word by word in ascending address order.
    ///
    /// # Safety
    /// See [`BssSegment::new`].
    pub unsafe fn init(&self) {
        let words = self.len() / WORD;
        for i in 0..words {
            unsafe { write_volatile(self.start.add(i), 0) };
        }
    }
}
