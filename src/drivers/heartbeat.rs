//! Status LED heartbeat.
//!
//! A short pulse followed by a long dark phase while the link is up, or a
//! short one while it is down, so a fast blink means Wi-Fi failed.

use core::time::Duration;
use std::thread;

use embedded_hal::digital::OutputPin;

use crate::app::ports::LinkPort;
use crate::config::{HEARTBEAT_OFF_LINKED_MS, HEARTBEAT_OFF_UNLINKED_MS, HEARTBEAT_ON_MS};

pub struct Heartbeat<P, L> {
    led: P,
    link: L,
}

impl<P: OutputPin, L: LinkPort> Heartbeat<P, L> {
    pub fn new(led: P, link: L) -> Self {
        Self { led, link }
    }

    /// Dark time for the current link state.
    pub fn off_time(&self) -> Duration {
        let ms = if self.link.is_link_up() {
            HEARTBEAT_OFF_LINKED_MS
        } else {
            HEARTBEAT_OFF_UNLINKED_MS
        };
        Duration::from_millis(u64::from(ms))
    }

    pub fn run(mut self) -> ! {
        let on = Duration::from_millis(u64::from(HEARTBEAT_ON_MS));
        loop {
            let _ = self.led.set_high();
            thread::sleep(on);
            let _ = self.led.set_low();
            thread::sleep(self.off_time());
        }
    }
}
