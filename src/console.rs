//! Periodic serial readout of the shared readings.

use core::fmt::Write;
use std::sync::Arc;
use std::thread;

use log::info;

use crate::config::MonitorConfig;
use crate::sensors::{Reading, ReadingStore};

/// `ADC: 1.80 V | Distance: 035.00 cm`
pub fn format_readout(reading: &Reading) -> heapless::String<64> {
    let mut line = heapless::String::new();
    // Physical readings always fit.
    let _ = write!(
        line,
        "ADC: {:04.2} V | Distance: {:06.2} cm",
        reading.illuminance, reading.distance
    );
    line
}

pub fn run(store: Arc<ReadingStore>, config: &MonitorConfig) -> ! {
    let period = config.console_period();
    loop {
        info!("{}", format_readout(&store.snapshot()));
        thread::sleep(period);
    }
}
