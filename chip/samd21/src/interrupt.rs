//! SAMD21 peripheral interrupts and the device handler registry.
//!
//! [`Handlers::DEFAULT`] traps every source except SysTick, which
//! drives the millisecond counter. Applications start from it and bind
//! their own handlers in a `const`:
//!
//! ```ignore
//! const HANDLERS: Handlers = Handlers::DEFAULT
//!     .on(Interrupt::Sercom0, uart_rx)
//!     .on_exception(Exception::HardFault, fault);
//! ```
//!
//! Binding a source twice is a const-evaluation panic, so the mistake
//! surfaces as a build error rather than a silently replaced handler.

use arch_armv6m::vectors::FIRST_IRQ_SLOT;
use arch_armv6m::{CoreHandlers, Exception, Handler, ResetHandler, Vector, VectorTable, trap};
use static_assertions::assert_eq_size;

use crate::timer;

/// Number of peripheral interrupt slots on the SAMD21.
pub const IRQ_COUNT: usize = 29;

/// The SAMD21 vector table: 16 core slots plus [`IRQ_COUNT`] interrupts.
pub type DeviceVectors = VectorTable<IRQ_COUNT>;

assert_eq_size!(DeviceVectors, [usize; 45]);

/// Peripheral interrupt lines (SAMD21 datasheet, NVIC table).
/// Lines 21, 22 and 28 are reserved on the SAMD21G.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Interrupt {
    Pm = 0,
    Sysctrl = 1,
    Wdt = 2,
    Rtc = 3,
    Eic = 4,
    Nvmctrl = 5,
    Dmac = 6,
    Usb = 7,
    Evsys = 8,
    Sercom0 = 9,
    Sercom1 = 10,
    Sercom2 = 11,
    Sercom3 = 12,
    Sercom4 = 13,
    Sercom5 = 14,
    Tcc0 = 15,
    Tcc1 = 16,
    Tcc2 = 17,
    Tc3 = 18,
    Tc4 = 19,
    Tc5 = 20,
    Adc = 23,
    Ac = 24,
    Dac = 25,
    Ptc = 26,
    I2s = 27,
}

impl Interrupt {
    pub const ALL: [Interrupt; 26] = [
        Interrupt::Pm,
        Interrupt::Sysctrl,
        Interrupt::Wdt,
        Interrupt::Rtc,
        Interrupt::Eic,
        Interrupt::Nvmctrl,
        Interrupt::Dmac,
        Interrupt::Usb,
        Interrupt::Evsys,
        Interrupt::Sercom0,
        Interrupt::Sercom1,
        Interrupt::Sercom2,
        Interrupt::Sercom3,
        Interrupt::Sercom4,
        Interrupt::Sercom5,
        Interrupt::Tcc0,
        Interrupt::Tcc1,
        Interrupt::Tcc2,
        Interrupt::Tc3,
        Interrupt::Tc4,
        Interrupt::Tc5,
        Interrupt::Adc,
        Interrupt::Ac,
        Interrupt::Dac,
        Interrupt::Ptc,
        Interrupt::I2s,
    ];

    /// NVIC line number.
    pub const fn number(self) -> usize {
        self as usize
    }

    /// Vector table slot.
    pub const fn slot(self) -> usize {
        FIRST_IRQ_SLOT + self.number()
    }
}

/// Handler registry for the whole device.
#[derive(Clone, Copy, Debug)]
pub struct Handlers {
    core: CoreHandlers,
    irqs: [Vector; IRQ_COUNT],
    bound: u32,
}

impl Handlers {
    /// Every source traps; SysTick counts milliseconds.
    pub const DEFAULT: Handlers = Handlers::new();

    const fn new() -> Self {
        let mut irqs = [Vector::RESERVED; IRQ_COUNT];
        let mut i = 0;
        while i < Interrupt::ALL.len() {
            irqs[Interrupt::ALL[i].number()] = Vector::handler(trap);
            i += 1;
        }
        Self {
            core: CoreHandlers::DEFAULT.with_fallback(Exception::SysTick, timer::on_tick),
            irqs,
            bound: 0,
        }
    }

    /// Bind the application's handler for `irq`.
    ///
    /// # Panics
    /// If `irq` already has an application handler.
    pub const fn on(mut self, irq: Interrupt, handler: Handler) -> Self {
        let bit = 1u32 << irq.number();
        assert!(self.bound & bit == 0, "interrupt handler bound twice");
        self.bound |= bit;
        self.irqs[irq.number()] = Vector::handler(handler);
        self
    }

    /// Bind the application's handler for an architectural exception.
    pub const fn on_exception(mut self, exception: Exception, handler: Handler) -> Self {
        self.core = self.core.on(exception, handler);
        self
    }

    pub const fn is_bound(&self, irq: Interrupt) -> bool {
        self.bound & (1u32 << irq.number()) != 0
    }

    /// Lay the registry out as the table the processor reads.
    pub const fn vector_table(self, stack_top: *const u32, reset: ResetHandler) -> DeviceVectors {
        VectorTable::new(stack_top, reset, self.core, self.irqs)
    }
}

/// Define the firmware's reset handler and vector table.
///
/// `entry` is the application's `fn() -> !`, called once the clock tree
/// is up. `handlers` is a const [`Handlers`]. `clocks` defaults to
/// [`ClockConfig::FEATHER_M0`](crate::ClockConfig::FEATHER_M0) and is
/// checked at build time.
#[macro_export]
macro_rules! boot {
    (entry = $entry:path, handlers = $handlers:expr, clocks = $clocks:expr $(,)?) => {
        const _: () = assert!(
            $crate::ClockConfig::validate(&$clocks).is_ok(),
            "unusable clock configuration"
        );

        #[unsafe(export_name = "Reset")]
        unsafe extern "C" fn __samboot_reset() -> ! {
            const CLOCKS: $crate::ClockConfig = $clocks;
            unsafe { $crate::rt::start($entry, CLOCKS) }
        }

        #[unsafe(link_section = ".vector_table")]
        #[unsafe(no_mangle)]
        #[used]
        static __VECTOR_TABLE: $crate::DeviceVectors = $crate::Handlers::vector_table(
            $handlers,
            &raw const $crate::rt::_stack_top,
            __samboot_reset,
        );
    };
    (entry = $entry:path, handlers = $handlers:expr $(,)?) => {
        $crate::boot!(
            entry = $entry,
            handlers = $handlers,
            clocks = $crate::ClockConfig::FEATHER_M0
        );
    };
}
