//! Fatal-fault handling.
//!
//! A panic anywhere is unrecoverable: the hook forces the error LED on,
//! logs the reason and stops all progress.  There is no automatic restart;
//! the stuck-on LED is the signal that the board needs attention.

use core::any::Any;

use crate::drivers::hw_init;
use crate::pins;

/// Best-effort text of a panic payload.
pub fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

/// Install the fatal-fault panic hook.  Call once during bring-up, after
/// the LED outputs are configured.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        hw_init::gpio_write(pins::LED_ERROR_GPIO, true);

        let task = std::thread::current();
        let location = info
            .location()
            .map(|l| (l.file(), l.line()))
            .unwrap_or(("?", 0));
        log::error!(
            "FATAL in '{}' at {}:{}: {}",
            task.name().unwrap_or("?"),
            location.0,
            location.1,
            panic_reason(info.payload())
        );

        halt();
    }));
}

/// Stop scheduling every task and spin forever.
#[cfg(target_os = "espidf")]
pub fn halt() -> ! {
    // SAFETY: suspending the scheduler from task context is always valid;
    // nothing resumes it.
    unsafe { esp_idf_svc::sys::vTaskSuspendAll() };
    #[allow(clippy::empty_loop)]
    loop {}
}

/// Park the faulting thread forever.
#[cfg(not(target_os = "espidf"))]
pub fn halt() -> ! {
    loop {
        std::thread::park();
    }
}
