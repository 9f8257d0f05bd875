//! Light-dependent resistor sampler.
//!
//! One raw ADC read per period, scaled to volts.  No averaging: the
//! evaluator runs faster than this task and reacts to each new value.

use core::time::Duration;
use std::sync::Arc;
use std::thread;

use log::info;

use crate::app::ports::AnalogPort;
use crate::config::MonitorConfig;
use crate::sensors::ReadingStore;

pub struct LightSampler<A> {
    adc: A,
    store: Arc<ReadingStore>,
    volts_per_code: f32,
    period: Duration,
}

impl<A: AnalogPort> LightSampler<A> {
    pub fn new(adc: A, store: Arc<ReadingStore>, config: &MonitorConfig) -> Self {
        Self {
            adc,
            store,
            volts_per_code: config.adc_volts_per_code(),
            period: config.sample_period(),
        }
    }

    /// Read, scale and store one sample.  Returns the stored voltage.
    pub fn sample(&mut self) -> f32 {
        let volts = f32::from(self.adc.read_raw()) * self.volts_per_code;
        self.store.set_illuminance(volts);
        volts
    }

    pub fn run(mut self) -> ! {
        info!("light: sampling every {} ms", self.period.as_millis());
        loop {
            self.sample();
            thread::sleep(self.period);
        }
    }
}
