//! GPIO / peripheral pin assignments for the proxalert board (ESP32-S3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const TRIG_GPIO: i32 = 4;
/// Digital input, any-edge interrupt.  HIGH for the echo round-trip time.
/// Level-shifted from 5 V through a resistive divider.
pub const ECHO_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Light-dependent resistor (ADC1)
// ---------------------------------------------------------------------------

/// LDR voltage divider midpoint.  Brighter light gives a higher voltage.
pub const LDR_ADC_GPIO: i32 = 2;
/// ADC1 channel for [`LDR_ADC_GPIO`] on the ESP32-S3.
pub const LDR_ADC_CHANNEL: u32 = 1;

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

pub const LED_PROXIMITY_GPIO: i32 = 15;
pub const LED_WARNING_GPIO: i32 = 16;
pub const LED_ERROR_GPIO: i32 = 17;

/// Heartbeat LED: slow blink with link, fast blink without.
pub const STATUS_LED_GPIO: i32 = 38;
