//! Adafruit Feather M0 firmware image.
//!
//! Brings the SAMD21 up at 48 MHz and idles on the millisecond tick.
//! On the host this builds as an empty program so the workspace can be
//! checked and tested without a cross toolchain.

#![cfg_attr(all(target_arch = "arm", target_os = "none"), no_std, no_main)]

#[cfg(all(target_arch = "arm", target_os = "none"))]
mod firmware {
    use arch_armv6m::Exception;
    use samd21::Handlers;

    const HANDLERS: Handlers = Handlers::DEFAULT.on_exception(Exception::HardFault, hard_fault);

    samd21::boot!(entry = app_main, handlers = HANDLERS);

    extern "C" fn hard_fault() {
        bootcore::panic::halt_loop()
    }

    fn app_main() -> ! {
        let mut last = samd21::millis();
        loop {
            arch_armv6m::wfi();
            if samd21::elapsed_since(last) >= 1_000 {
                last = last.wrapping_add(1_000);
            }
        }
    }

    #[panic_handler]
    fn panic(_: &core::panic::PanicInfo) -> ! {
        bootcore::panic::halt_loop()
    }
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
fn main() {}
