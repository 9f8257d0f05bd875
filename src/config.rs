//! System configuration parameters
//!
//! Thresholds and timings are compile-time constants.  [`MonitorConfig`]
//! groups them so tasks receive their parameters explicitly (and tests can
//! shorten the long waits); the firmware always runs with
//! [`MonitorConfig::default()`].

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// --- Thresholds ---

/// Objects at or closer than this (cm) raise the proximity indicator.
pub const DISTANCE_THRESHOLD_CM: f32 = 40.0;
/// Light sensor voltage at or below this counts as "dark".
pub const LIGHT_THRESHOLD_V: f32 = 2.2;

// --- Analog front end ---

/// ADC reference voltage.
pub const ADC_REFERENCE_V: f32 = 3.3;
/// 12-bit converter full-scale code count.
pub const ADC_FULL_SCALE: u16 = 1 << 12;

// --- Ranging ---

/// HC-SR04 trigger pulse width.
pub const TRIGGER_PULSE_US: u32 = 10;
/// Echo microseconds per centimetre (round trip, datasheet constant).
pub const ECHO_US_PER_CM: f32 = 58.0;
/// Longest wait for an echo before the cycle is reported as unknown.
pub const RANGING_TIMEOUT_MS: u32 = 250;

// --- Task periods ---

pub const SAMPLE_PERIOD_MS: u32 = 250;
pub const EVALUATE_PERIOD_MS: u32 = 50;
/// Evaluator suspension after an alert fires.
pub const ALERT_COOLDOWN_MS: u32 = 5000;
pub const CONSOLE_PERIOD_MS: u32 = 500;

// --- Notification ---

/// Error indicator flash when the connection cannot be opened.
pub const CONNECT_FAIL_FLASH_MS: u32 = 500;
/// Error indicator flash when an open connection errors out.
pub const IO_FAIL_FLASH_MS: u32 = 200;
/// Bound on connect and on waiting for the collector's response.
pub const TRANSPORT_TIMEOUT_MS: u32 = 5000;

// --- Bring-up and status ---

/// Boot self-test: all indicators blink this many times.
pub const SELF_TEST_BLINKS: u32 = 5;
/// On and off time of each self-test blink.
pub const SELF_TEST_BLINK_MS: u32 = 200;
/// Heartbeat LED pulse width.
pub const HEARTBEAT_ON_MS: u32 = 20;
/// Heartbeat dark time while the link is up.
pub const HEARTBEAT_OFF_LINKED_MS: u32 = 1980;
/// Heartbeat dark time while the link is down (fast blink).
pub const HEARTBEAT_OFF_UNLINKED_MS: u32 = 300;

/// Collector address used when `PROXALERT_API_ADDR` is not set at build time.
pub const DEFAULT_API_ADDR: &str = "192.168.1.100:8080";

/// Boot-time value for the shared readings: far away and bright, so no
/// indicator lights before the first real samples arrive.
pub const INITIAL_DISTANCE_CM: f32 = 999.0;
pub const INITIAL_ILLUMINANCE_V: f32 = ADC_REFERENCE_V;

/// Runtime view of the constants above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    // --- Thresholds ---
    pub distance_threshold_cm: f32,
    pub light_threshold_v: f32,

    // --- Analog front end ---
    pub adc_reference_v: f32,
    pub adc_full_scale: u16,

    // --- Ranging ---
    pub trigger_pulse_us: u32,
    pub ranging_timeout_ms: u32,

    // --- Timing ---
    pub sample_period_ms: u32,
    pub evaluate_period_ms: u32,
    pub alert_cooldown_ms: u32,
    pub console_period_ms: u32,

    // --- Notification ---
    pub connect_fail_flash_ms: u32,
    pub io_fail_flash_ms: u32,
    pub transport_timeout_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            distance_threshold_cm: DISTANCE_THRESHOLD_CM,
            light_threshold_v: LIGHT_THRESHOLD_V,

            adc_reference_v: ADC_REFERENCE_V,
            adc_full_scale: ADC_FULL_SCALE,

            trigger_pulse_us: TRIGGER_PULSE_US,
            ranging_timeout_ms: RANGING_TIMEOUT_MS,

            sample_period_ms: SAMPLE_PERIOD_MS,     // 4 Hz
            evaluate_period_ms: EVALUATE_PERIOD_MS, // 20 Hz
            alert_cooldown_ms: ALERT_COOLDOWN_MS,
            console_period_ms: CONSOLE_PERIOD_MS,

            connect_fail_flash_ms: CONNECT_FAIL_FLASH_MS,
            io_fail_flash_ms: IO_FAIL_FLASH_MS,
            transport_timeout_ms: TRANSPORT_TIMEOUT_MS,
        }
    }
}

impl MonitorConfig {
    /// Volts per ADC code.
    pub fn adc_volts_per_code(&self) -> f32 {
        self.adc_reference_v / f32::from(self.adc_full_scale)
    }

    pub fn ranging_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.ranging_timeout_ms))
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.sample_period_ms))
    }

    pub fn evaluate_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.evaluate_period_ms))
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_millis(u64::from(self.alert_cooldown_ms))
    }

    pub fn console_period(&self) -> Duration {
        Duration::from_millis(u64::from(self.console_period_ms))
    }

    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.transport_timeout_ms))
    }

    /// Reject values that would stall a task or make a threshold meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.distance_threshold_cm.is_finite() && self.distance_threshold_cm > 0.0) {
            return Err(ConfigError::ValidationFailed("distance_threshold_cm must be > 0"));
        }
        if !(self.light_threshold_v.is_finite() && self.light_threshold_v >= 0.0) {
            return Err(ConfigError::ValidationFailed("light_threshold_v must be >= 0"));
        }
        if self.adc_full_scale == 0 || !(self.adc_reference_v > 0.0) {
            return Err(ConfigError::ValidationFailed("ADC scale must be positive"));
        }
        if self.trigger_pulse_us == 0 {
            return Err(ConfigError::ValidationFailed("trigger_pulse_us must be > 0"));
        }
        if self.ranging_timeout_ms == 0
            || self.sample_period_ms == 0
            || self.evaluate_period_ms == 0
            || self.console_period_ms == 0
        {
            return Err(ConfigError::ValidationFailed("task periods must be > 0"));
        }
        if self.transport_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("transport_timeout_ms must be > 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Collector endpoint
// ---------------------------------------------------------------------------

/// IPv4 address and TCP port of the remote collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub ipv4: [u8; 4],
    pub port: u16,
}

impl ApiEndpoint {
    /// Parse `a.b.c.d:port`.
    pub fn parse(addr: &str) -> Result<Self, ConfigError> {
        let (ip, port) = addr
            .trim()
            .rsplit_once(':')
            .ok_or(ConfigError::InvalidEndpoint("missing ':port'"))?;

        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::InvalidEndpoint("port is not a number"))?;
        if port == 0 {
            return Err(ConfigError::InvalidEndpoint("port must be non-zero"));
        }

        let mut ipv4 = [0u8; 4];
        let mut octets = ip.split('.');
        for slot in &mut ipv4 {
            *slot = octets
                .next()
                .and_then(|o| o.parse().ok())
                .ok_or(ConfigError::InvalidEndpoint("malformed IPv4 address"))?;
        }
        if octets.next().is_some() {
            return Err(ConfigError::InvalidEndpoint("malformed IPv4 address"));
        }

        Ok(Self { ipv4, port })
    }

    /// The endpoint baked in at build time, falling back to [`DEFAULT_API_ADDR`].
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::parse(option_env!("PROXALERT_API_ADDR").unwrap_or(DEFAULT_API_ADDR))
    }

    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from((self.ipv4, self.port))
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.ipv4;
        write!(f, "{a}.{b}.{c}.{d}:{}", self.port)
    }
}

/// Validated runtime config plus the collector endpoint baked into the
/// build.  The one place bring-up reads its parameters.
pub fn load() -> crate::Result<(MonitorConfig, ApiEndpoint)> {
    let config = MonitorConfig::default();
    config.validate()?;
    let endpoint = ApiEndpoint::from_build_env()?;
    Ok((config, endpoint))
}
