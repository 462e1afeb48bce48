//! Hardware abstraction traits.
//!
//! These traits define the interface that the bring-up code uses to
//! reach the hardware. Production code binds them to memory-mapped
//! registers; host tests bind them to a simulated register file.

/// Result type for bring-up helpers.
pub type Result<T> = core::result::Result<T, Error>;

/// Bring-up error types.
///
/// None of these are recoverable on target. They exist so helpers can
/// report *why* a configuration is unusable before the caller parks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(u8)]
pub enum Error {
    /// A frequency in the configuration is zero
    #[error("clock frequency must be non-zero")]
    ZeroFrequency,
    /// Multiplication factor does not fit the multiplier's MUL field
    #[error("multiplier factor does not fit the MUL field")]
    MultiplierOutOfRange,
    /// A value does not fit the register field it is written to
    #[error("value does not fit its register field")]
    FieldOutOfRange,
    /// Tick reload value does not fit the 24-bit counter
    #[error("tick reload value does not fit the 24-bit counter")]
    ReloadOutOfRange,
}

/// Access width of a memory-mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 8-bit access
    Byte,
    /// 16-bit access
    Half,
    /// 32-bit access
    Word,
}

impl Width {
    /// Mask covering every bit the register can hold.
    #[inline]
    pub const fn mask(self) -> u32 {
        match self {
            Width::Byte => 0xFF,
            Width::Half => 0xFFFF,
            Width::Word => 0xFFFF_FFFF,
        }
    }
}

/// A named memory-mapped register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    /// Vendor name, e.g. `"GCLK.STATUS"`.
    pub name: &'static str,
    /// Absolute address.
    pub addr: usize,
    /// Access width.
    pub width: Width,
}

impl Register {
    pub const fn byte(name: &'static str, addr: usize) -> Self {
        Self { name, addr, width: Width::Byte }
    }

    pub const fn half(name: &'static str, addr: usize) -> Self {
        Self { name, addr, width: Width::Half }
    }

    pub const fn word(name: &'static str, addr: usize) -> Self {
        Self { name, addr, width: Width::Word }
    }
}

/// Read/write access to hardware registers.
///
/// Reads take `&mut self`: a status read is an observable event on
/// real hardware (and a counted poll in the simulator).
pub trait Registers {
    /// Read the register, zero-extended to 32 bits.
    fn read(&mut self, reg: Register) -> u32;

    /// Write the register. Bits beyond its width are discarded.
    fn write(&mut self, reg: Register, value: u32);

    /// Read-modify-write.
    fn modify(&mut self, reg: Register, f: impl FnOnce(u32) -> u32) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set the given bits, leaving the others untouched.
    fn set_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, |v| v | bits);
    }

    /// Clear the given bits, leaving the others untouched.
    fn clear_bits(&mut self, reg: Register, bits: u32) {
        self.modify(reg, |v| v & !bits);
    }

    /// Check whether all of `bits` read back as set.
    fn bits_set(&mut self, reg: Register, bits: u32) -> bool {
        self.read(reg) & bits == bits
    }

    /// Check whether all of `bits` read back as clear.
    fn bits_clear(&mut self, reg: Register, bits: u32) -> bool {
        self.read(reg) & bits == 0
    }
}

impl<R: Registers + ?Sized> Registers for &mut R {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }

    fn bits_set(&mut self, reg: Register, bits: u32) -> bool {
        (**self).bits_set(reg, bits)
    }

    fn bits_clear(&mut self, reg: Register, bits: u32) -> bool {
        (**self).bits_clear(reg, bits)
    }
}

/// Synchronisation barrier used between dependent hardware steps.
///
/// On target a barrier blocks without timeout: the hardware either
/// asserts the flag or the device never finishes bring-up.
pub trait Barrier {
    /// Block until `ready` returns `true`. `ready` is polled repeatedly
    /// and must not write registers.
    fn until<R: Registers + ?Sized>(&mut self, regs: &mut R, ready: impl FnMut(&mut R) -> bool);

    /// Stop forever on a non-recoverable condition.
    fn park(&mut self) -> !;
}
