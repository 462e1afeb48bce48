//! Memory-Mapped I/O (MMIO) Operations
//!
//! Volatile register access for the SAMD21 peripherals. Every access
//! uses the register's own width: the byte-wide GCLK and PM registers
//! must not be touched with word accesses.

use core::ptr::{read_volatile, write_volatile};

use bootcore::{Register, Registers, Width};

/// Direct hardware access.
///
/// Zero-sized; holding one is a claim that the bring-up code owns the
/// peripherals it touches.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    /// Only one `Mmio` may be in use at a time, and only on the target
    /// the register map describes.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl Registers for Mmio {
    #[inline(always)]
    fn read(&mut self, reg: Register) -> u32 {
        unsafe {
            match reg.width {
                Width::Byte => read_volatile(reg.addr as *const u8) as u32,
                Width::Half => read_volatile(reg.addr as *const u16) as u32,
                Width::Word => read_volatile(reg.addr as *const u32),
            }
        }
    }

    #[inline(always)]
    fn write(&mut self, reg: Register, value: u32) {
        unsafe {
            match reg.width {
                Width::Byte => write_volatile(reg.addr as *mut u8, value as u8),
                Width::Half => write_volatile(reg.addr as *mut u16, value as u16),
                Width::Word => write_volatile(reg.addr as *mut u32, value),
            }
        }
    }
}
