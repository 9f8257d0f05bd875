//! Threshold evaluator: the decision core.
//!
//! Every period it snapshots the shared readings and drives the proximity
//! and warning indicators.  When an object is close *and* the light is low
//! it publishes an [`AlertEvent`] and backs off for the cooldown so a single
//! approach raises a single notification.

use core::time::Duration;
use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::app::events::AlertEvent;
use crate::app::ports::{Indicator, IndicatorPort};
use crate::config::MonitorConfig;
use crate::mailbox::Mailbox;
use crate::sensors::{Reading, ReadingStore};

/// What one evaluation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing within range.
    Clear,
    /// Something within range, enough light.
    Proximity,
    /// Something within range in the dark; an event was published.
    Alert,
}

pub struct ThresholdEvaluator<I> {
    indicators: I,
    store: Arc<ReadingStore>,
    mailbox: Arc<Mailbox>,
    distance_threshold: f32,
    light_threshold: f32,
    period: Duration,
    cooldown: Duration,
}

impl<I: IndicatorPort> ThresholdEvaluator<I> {
    pub fn new(
        indicators: I,
        store: Arc<ReadingStore>,
        mailbox: Arc<Mailbox>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            indicators,
            store,
            mailbox,
            distance_threshold: config.distance_threshold_cm,
            light_threshold: config.light_threshold_v,
            period: config.evaluate_period(),
            cooldown: config.alert_cooldown(),
        }
    }

    /// Apply the thresholds to `reading`.
    pub fn evaluate(&mut self, reading: Reading) -> Outcome {
        if reading.distance > self.distance_threshold {
            self.indicators.clear(Indicator::Proximity);
            self.indicators.clear(Indicator::Warning);
            return Outcome::Clear;
        }
        self.indicators.set(Indicator::Proximity, true);

        if reading.illuminance > self.light_threshold {
            self.indicators.clear(Indicator::Warning);
            return Outcome::Proximity;
        }
        self.indicators.set(Indicator::Warning, true);

        match AlertEvent::new(reading.illuminance, reading.distance) {
            Ok(event) => {
                warn!(
                    "alert: object at {:.2} cm in low light ({:.2} V)",
                    reading.distance, reading.illuminance
                );
                self.mailbox.publish(event);
            }
            Err(_) => warn!(
                "alert: readings too wide to encode (d={}, v={})",
                reading.distance, reading.illuminance
            ),
        }
        Outcome::Alert
    }

    /// Evaluate the current readings once.  Returns how long to wait before
    /// the next evaluation.
    pub fn step(&mut self) -> Duration {
        match self.evaluate(self.store.snapshot()) {
            Outcome::Alert => self.cooldown + self.period,
            Outcome::Clear | Outcome::Proximity => self.period,
        }
    }

    pub fn run(mut self) -> ! {
        info!(
            "evaluator: every {} ms, cooldown {} ms",
            self.period.as_millis(),
            self.cooldown.as_millis()
        );
        loop {
            let wait = self.step();
            thread::sleep(wait);
        }
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }
}
