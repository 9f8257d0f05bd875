//! One-shot wake from the echo ISR to the ranging task.
//!
//! - **`target_os = "espidf"`**: FreeRTOS direct-to-task notification.  The
//!   waiting task registers its handle in [`EchoSignal::reset`]; the ISR
//!   notifies it and yields if the woken task has higher priority.
//! - **all other targets**: an `embassy_sync` [`Signal`] raced against an
//!   `async-io-mini` timer.
//!
//! At most one task waits on a given signal.

use core::time::Duration;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicPtr, Ordering};

#[cfg(not(target_os = "espidf"))]
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};

pub struct EchoSignal {
    #[cfg(target_os = "espidf")]
    waiter: AtomicPtr<core::ffi::c_void>,
    #[cfg(not(target_os = "espidf"))]
    fired: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for EchoSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl EchoSignal {
    pub const fn new() -> Self {
        Self {
            waiter: AtomicPtr::new(core::ptr::null_mut()),
        }
    }

    /// Register the calling task as the waiter and drop any stale wake.
    pub fn reset(&self) {
        if let Some(handle) = esp_idf_hal::task::current() {
            self.waiter.store(handle.cast(), Ordering::Release);
        }
        while esp_idf_hal::task::wait_notification(0).is_some() {}
    }

    /// Wake the waiter.  ISR-safe.
    pub fn notify_from_isr(&self) {
        let handle = self.waiter.load(Ordering::Acquire);
        if handle.is_null() {
            return;
        }
        // SAFETY: the handle was taken from a live task in reset(); ranging
        // tasks never exit, so the TCB outlives every notification.
        unsafe {
            esp_idf_hal::task::notify_and_yield(handle.cast(), core::num::NonZeroU32::MIN);
        }
    }

    /// Block until notified or `timeout` elapses.  `true` when notified.
    pub fn wait(&self, timeout: Duration) -> bool {
        let ticks = esp_idf_hal::delay::TickType::new_millis(timeout.as_millis() as u64).ticks();
        esp_idf_hal::task::wait_notification(ticks).is_some()
    }
}

// ── Host ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl EchoSignal {
    pub const fn new() -> Self {
        Self {
            fired: Signal::new(),
        }
    }

    pub fn reset(&self) {
        self.fired.reset();
    }

    pub fn notify_from_isr(&self) {
        self.fired.signal(());
    }

    pub fn wait(&self, timeout: Duration) -> bool {
        futures_lite::future::block_on(futures_lite::future::or(
            async {
                self.fired.wait().await;
                true
            },
            async {
                async_io_mini::Timer::after(timeout).await;
                false
            },
        ))
    }
}
