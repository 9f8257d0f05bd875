//! Single-slot alert hand-off from the evaluator to the notifier.
//!
//! Backed by an `embassy_sync` [`Signal`]: publishing never blocks and
//! replaces any undelivered event, and a take consumes whatever is in the
//! slot.  The notifier is the only consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future::block_on;

use crate::app::events::AlertEvent;

pub struct Mailbox {
    slot: Signal<CriticalSectionRawMutex, AlertEvent>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            slot: Signal::new(),
        }
    }

    /// Store `event`, overwriting any event not yet taken.
    pub fn publish(&self, event: AlertEvent) {
        self.slot.signal(event);
    }

    /// Block the calling thread until an event is available, then take it.
    pub fn take_blocking(&self) -> AlertEvent {
        block_on(self.slot.wait())
    }

    /// Take the pending event, if any, without blocking.
    pub fn try_take(&self) -> Option<AlertEvent> {
        self.slot.try_take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.signaled()
    }
}
