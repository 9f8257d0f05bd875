//! Shared "link up" flag.
//!
//! Written by Wi-Fi bring-up, read by the notifier and the heartbeat.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::app::ports::LinkPort;

#[derive(Debug, Default)]
pub struct LinkStatus {
    up: AtomicBool,
}

impl LinkStatus {
    pub const fn new() -> Self {
        Self {
            up: AtomicBool::new(false),
        }
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::Release);
    }
}

impl LinkPort for LinkStatus {
    fn is_link_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }
}
