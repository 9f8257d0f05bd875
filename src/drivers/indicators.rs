//! Indicator LED driver.
//!
//! A bank maps [`Indicator`]s to output pins.  At boot one bank holds all
//! three LEDs for the self-test; it is then split so each task owns only the
//! indicators it is allowed to write.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`: on ESP-IDF the pins are
//! [`GpioOut`](super::hw_init::GpioOut) register writes, on host the same
//! type lands in the simulation bitmask, and tests use recording mocks.

use core::time::Duration;
use std::thread;

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, info};

use crate::app::ports::{Indicator, IndicatorPort};

pub struct IndicatorLeds<P> {
    pins: heapless::Vec<(Indicator, P), 3>,
}

impl<P: OutputPin> Default for IndicatorLeds<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> IndicatorLeds<P> {
    pub fn new() -> Self {
        Self {
            pins: heapless::Vec::new(),
        }
    }

    /// Attach `pin` to `indicator`, replacing any earlier pin for it.
    #[must_use]
    pub fn with(mut self, indicator: Indicator, pin: P) -> Self {
        self.pins.retain(|(i, _)| *i != indicator);
        // Three indicators, three slots: a push after retain cannot overflow.
        let _ = self.pins.push((indicator, pin));
        self
    }

    /// Move the pins for `indicators` into a new bank.
    pub fn split(self, indicators: &[Indicator]) -> (Self, Self) {
        let mut taken = Self::new();
        let mut kept = Self::new();
        for (indicator, pin) in self.pins {
            let dest = if indicators.contains(&indicator) {
                &mut taken
            } else {
                &mut kept
            };
            let _ = dest.pins.push((indicator, pin));
        }
        (taken, kept)
    }

    pub fn owns(&self, indicator: Indicator) -> bool {
        self.pins.iter().any(|(i, _)| *i == indicator)
    }

    fn set_all(&mut self, on: bool) {
        for (_, pin) in &mut self.pins {
            let _ = pin.set_state(PinState::from(on));
        }
    }
}

impl<P: OutputPin> IndicatorPort for IndicatorLeds<P> {
    fn set(&mut self, indicator: Indicator, on: bool) {
        match self.pins.iter_mut().find(|(i, _)| *i == indicator) {
            Some((_, pin)) => {
                let _ = pin.set_state(PinState::from(on));
            }
            None => debug!("indicator {indicator:?} not owned by this bank"),
        }
    }
}

/// Blink every LED in `leds` together so a dead one is visible at boot.
pub fn self_test<P: OutputPin>(leds: &mut IndicatorLeds<P>, blinks: u32, half_period: Duration) {
    info!("indicators: self-test ({blinks} blinks)");
    for _ in 0..blinks {
        leds.set_all(true);
        thread::sleep(half_period);
        leds.set_all(false);
        thread::sleep(half_period);
    }
}
