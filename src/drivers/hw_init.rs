//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures the LDR ADC channel, the trigger and LED outputs, and the echo
//! input using raw ESP-IDF sys calls.  Called once from `main()` before any
//! task starts.
//!
//! On host targets the same functions drive an in-memory simulation: the
//! ADC returns the value set by [`sim_set_ldr_adc`], output levels land in a
//! bitmask readable through [`sim_gpio_level`], and a trigger pulse
//! synthesises echo edges [`sim_set_echo_us`] microseconds apart.

use core::time::Duration;
use std::sync::Arc;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;
use crate::sensors::ranging::EchoCapture;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR install failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// Every push-pull output on the board, driven low at init.
const OUTPUT_PINS: [i32; 5] = [
    pins::TRIG_GPIO,
    pins::LED_PROXIMITY_GPIO,
    pins::LED_WARNING_GPIO,
    pins::LED_ERROR_GPIO,
    pins::STATUS_LED_GPIO,
];

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> crate::Result<()> {
    // SAFETY: Called once from main() before any task is spawned.
    unsafe {
        init_adc()?;
        init_gpio_outputs()?;
        init_echo_input()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> crate::Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    for pin in OUTPUT_PINS {
        gpio_write(pin, false);
    }
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once in `init_adc()` before the light
/// sampler starts; afterwards it is only read, by that single task.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    // 12 dB attenuation covers the full 0–3.3 V divider swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::LDR_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=LDR)", pins::LDR_ADC_CHANNEL);
    Ok(())
}

/// One raw 12-bit read.  A failed conversion reads as 0 (darkest).
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single reader after init.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    sim::LDR_ADC.load(core::sync::atomic::Ordering::Relaxed)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &OUTPUT_PINS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an output configured in
    // init_gpio_outputs(); each pin has a single writer.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    use core::sync::atomic::Ordering;
    let bit = 1u64 << pin;
    if high {
        sim::GPIO_LEVELS.fetch_or(bit, Ordering::AcqRel);
    } else {
        sim::GPIO_LEVELS.fetch_and(!bit, Ordering::AcqRel);
    }
}

/// A raw output pin exposed through `embedded-hal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioOut(pub i32);

impl embedded_hal::digital::ErrorType for GpioOut {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for GpioOut {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, true);
        Ok(())
    }
}

// ── Trigger ───────────────────────────────────────────────────

/// Drive TRIG high for `width` (busy-wait), then low.
#[cfg(target_os = "espidf")]
pub fn trigger_pulse(width: Duration) {
    gpio_write(pins::TRIG_GPIO, true);
    // SAFETY: ROM busy-wait; no shared state.
    unsafe { esp_rom_delay_us(width.as_micros() as u32) };
    gpio_write(pins::TRIG_GPIO, false);
}

#[cfg(not(target_os = "espidf"))]
pub fn trigger_pulse(width: Duration) {
    use core::sync::atomic::Ordering;

    gpio_write(pins::TRIG_GPIO, true);
    std::thread::sleep(width);
    gpio_write(pins::TRIG_GPIO, false);

    let echo_us = sim::ECHO_US.load(Ordering::Relaxed);
    if echo_us == 0 {
        return;
    }
    let capture = match sim::ECHO_CAPTURE.lock() {
        Ok(slot) => slot.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    if let Some(capture) = capture {
        let start = crate::adapters::time::uptime_us() as u32;
        std::thread::sleep(Duration::from_micros(u64::from(echo_us)));
        capture.on_edge(true, start);
        capture.on_edge(false, start.wrapping_add(echo_us));
    }
}

// ── Echo ISR ──────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_echo_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: ECHO input configured (any edge)");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn echo_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the EchoCapture leaked in install_echo_isr(); it is
    // never freed.  gpio_get_level and esp_timer_get_time are ISR-safe
    // register reads.
    let capture = unsafe { &*arg.cast::<EchoCapture>() };
    let rising = unsafe { gpio_get_level(pins::ECHO_GPIO) } != 0;
    let now_us = unsafe { esp_timer_get_time() } as u32;
    capture.on_edge(rising, now_us);
}

/// Route ECHO edges to `capture`.
/// Call after init_peripherals() and before the ranging task starts.
#[cfg(target_os = "espidf")]
pub fn install_echo_isr(capture: &Arc<EchoCapture>) -> crate::Result<()> {
    // The ISR holds this reference for the lifetime of the firmware.
    let arg = Arc::into_raw(Arc::clone(capture)).cast_mut().cast::<core::ffi::c_void>();

    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable).  The handler only
    // touches atomics and the FreeRTOS notification API.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret).into());
        }

        let ret = gpio_isr_handler_add(pins::ECHO_GPIO, Some(echo_gpio_isr), arg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrInstallFailed(ret).into());
        }
        gpio_intr_enable(pins::ECHO_GPIO);
    }
    info!("hw_init: ECHO ISR installed");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn install_echo_isr(capture: &Arc<EchoCapture>) -> crate::Result<()> {
    let mut slot = match sim::ECHO_CAPTURE.lock() {
        Ok(slot) => slot,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(Arc::clone(capture));
    log::info!("hw_init(sim): echo edges routed to capture");
    Ok(())
}

// ── Simulation state ──────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU64};
    use std::sync::{Arc, Mutex};

    use crate::sensors::ranging::EchoCapture;

    /// Full scale (bright) until a test says otherwise.
    pub static LDR_ADC: AtomicU16 = AtomicU16::new(4095);
    /// Echo high time in µs; 0 = no echo.
    pub static ECHO_US: AtomicU32 = AtomicU32::new(0);
    pub static GPIO_LEVELS: AtomicU64 = AtomicU64::new(0);
    pub static ECHO_CAPTURE: Mutex<Option<Arc<EchoCapture>>> = Mutex::new(None);
}

/// Set the simulated raw LDR reading.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ldr_adc(raw: u16) {
    sim::LDR_ADC.store(raw.min(4095), core::sync::atomic::Ordering::Relaxed);
}

/// Set the simulated echo high time.  `0` simulates no echo at all.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_echo_us(echo_us: u32) {
    sim::ECHO_US.store(echo_us, core::sync::atomic::Ordering::Relaxed);
}

/// Last level written to a simulated output.
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    sim::GPIO_LEVELS.load(core::sync::atomic::Ordering::Acquire) & (1u64 << pin) != 0
}
