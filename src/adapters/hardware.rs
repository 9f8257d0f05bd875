//! Hardware adapter: bridges the raw pin and ADC helpers to the sensor
//! port traits.
//!
//! Zero-sized and `Copy`: the light sampler and the ranging task each take
//! their own copy.  On non-espidf targets the underlying `hw_init` calls hit
//! the simulation instead of registers.

use core::time::Duration;

use crate::app::ports::{AnalogPort, TriggerPort};
use crate::drivers::hw_init;
use crate::pins;

#[derive(Debug, Default, Clone, Copy)]
pub struct HardwareAdapter;

impl HardwareAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl AnalogPort for HardwareAdapter {
    fn read_raw(&mut self) -> u16 {
        hw_init::adc1_read(pins::LDR_ADC_CHANNEL)
    }
}

impl TriggerPort for HardwareAdapter {
    fn pulse(&mut self, width: Duration) {
        hw_init::trigger_pulse(width);
    }
}
