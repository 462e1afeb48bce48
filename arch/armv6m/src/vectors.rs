//! Vector table and default handler registry.
//!
//! The processor reads the vector table directly on reset and on every
//! exception. Slot 0 is the initial stack pointer, slot 1 the reset
//! handler, slots 2..16 the architectural exceptions and everything
//! after that the vendor's peripheral interrupts. Positions are fixed by
//! the hardware; nothing checks them at run time.
//!
//! Handlers are chosen when the table is built, in `const` context:
//! every slot starts out bound to [`trap`] and the application replaces
//! the ones it implements. Binding a source twice fails const
//! evaluation and therefore the build. Reserved slots have no
//! [`Exception`] variant and cannot be bound.

use static_assertions::const_assert_eq;

/// Exception and interrupt handlers are plain C-ABI functions.
pub type Handler = unsafe extern "C" fn();

/// The reset handler must never return.
pub type ResetHandler = unsafe extern "C" fn() -> !;

/// Number of architectural exception slots after the reset vector.
pub const EXCEPTION_SLOTS: usize = 14;

/// Slot index of the first vendor interrupt.
pub const FIRST_IRQ_SLOT: usize = 16;

/// One pointer-sized vector table entry.
#[derive(Clone, Copy)]
#[repr(C)]
pub union Vector {
    handler: Handler,
    reserved: usize,
}

const_assert_eq!(core::mem::size_of::<Vector>(), core::mem::size_of::<usize>());

impl Vector {
    /// A reserved entry; reads as zero.
    pub const RESERVED: Vector = Vector { reserved: 0 };

    pub const fn handler(handler: Handler) -> Self {
        Vector { handler }
    }

    /// Address stored in the slot, 0 for reserved entries.
    pub fn address(&self) -> usize {
        // Both fields are pointer sized.
        unsafe { self.reserved }
    }

    pub fn is_reserved(&self) -> bool {
        self.address() == 0
    }
}

impl core::fmt::Debug for Vector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Vector({:#010x})", self.address())
    }
}

/// Trap body bound to every source the application leaves alone.
///
/// Parks the core so an attached debugger shows exactly which source
/// fired without a handler.
pub extern "C" fn trap() {
    bootcore::panic::halt_loop()
}

/// Architectural exceptions with a vector slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Exception {
    Nmi = 2,
    HardFault = 3,
    SvCall = 11,
    PendSv = 14,
    SysTick = 15,
}

impl Exception {
    pub const ALL: [Exception; 5] = [
        Exception::Nmi,
        Exception::HardFault,
        Exception::SvCall,
        Exception::PendSv,
        Exception::SysTick,
    ];

    /// Vector table slot.
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Index into the exception block (slot minus 2).
    const fn index(self) -> usize {
        self as usize - 2
    }
}

/// Whether an exception slot (2..16) is reserved on ARMv6-M.
pub const fn is_reserved_exception_slot(slot: usize) -> bool {
    matches!(slot, 4..=10 | 12 | 13)
}

/// Handler registry for the architectural exceptions.
#[derive(Clone, Copy, Debug)]
pub struct CoreHandlers {
    slots: [Vector; EXCEPTION_SLOTS],
    bound: u16,
}

impl CoreHandlers {
    /// Every exception traps.
    pub const DEFAULT: CoreHandlers = CoreHandlers::new(trap);

    /// Registry with `fallback` in every non-reserved slot.
    pub const fn new(fallback: Handler) -> Self {
        let mut slots = [Vector::RESERVED; EXCEPTION_SLOTS];
        let mut i = 0;
        while i < EXCEPTION_SLOTS {
            if !is_reserved_exception_slot(i + 2) {
                slots[i] = Vector::handler(fallback);
            }
            i += 1;
        }
        Self { slots, bound: 0 }
    }

    /// Bind the application's handler for `exception`.
    ///
    /// # Panics
    /// If `exception` already has an application handler.
    pub const fn on(mut self, exception: Exception, handler: Handler) -> Self {
        let bit = 1u16 << exception.slot();
        assert!(self.bound & bit == 0, "exception handler bound twice");
        self.bound |= bit;
        self.slots[exception.index()] = Vector::handler(handler);
        self
    }

    /// Replace the fallback for `exception` without counting as an
    /// application binding. Runtime crates use this for sources they
    /// service themselves.
    pub const fn with_fallback(mut self, exception: Exception, handler: Handler) -> Self {
        self.slots[exception.index()] = Vector::handler(handler);
        self
    }

    /// Whether the application bound `exception`.
    pub const fn is_bound(&self, exception: Exception) -> bool {
        self.bound & (1u16 << exception.slot()) != 0
    }

    pub const fn slots(&self) -> [Vector; EXCEPTION_SLOTS] {
        self.slots
    }
}

/// The table the processor reads, `N` vendor interrupts long.
#[repr(C)]
pub struct VectorTable<const N: usize> {
    stack_top: *const u32,
    reset: ResetHandler,
    exceptions: [Vector; EXCEPTION_SLOTS],
    interrupts: [Vector; N],
}

// Read-only after link; the raw pointer is only an address.
unsafe impl<const N: usize> Sync for VectorTable<N> {}

impl<const N: usize> VectorTable<N> {
    /// Total number of slots.
    pub const LEN: usize = FIRST_IRQ_SLOT + N;

    pub const fn new(
        stack_top: *const u32,
        reset: ResetHandler,
        core: CoreHandlers,
        interrupts: [Vector; N],
    ) -> Self {
        Self {
            stack_top,
            reset,
            exceptions: core.slots(),
            interrupts,
        }
    }

    /// Address held by slot `index`, `None` for reserved or
    /// out-of-range slots.
    pub fn slot(&self, index: usize) -> Option<usize> {
        let address = match index {
            0 => self.stack_top as usize,
            1 => self.reset as usize,
            2..FIRST_IRQ_SLOT => self.exceptions[index - 2].address(),
            _ => self.interrupts.get(index - FIRST_IRQ_SLOT)?.address(),
        };
        (address != 0).then_some(address)
    }
}
