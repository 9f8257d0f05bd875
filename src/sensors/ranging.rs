//! HC-SR04 ultrasonic ranging.
//!
//! ```text
//!   task                      ISR (ECHO any-edge)
//!   ────                      ───────────────────
//!   arm(): window ← 0,0
//!   trigger 10 µs ──────────▶ rising:  start ← now   (if unset)
//!   wait ≤ 250 ms             falling: end ← now     (if start set, end unset)
//!        ◀──────────────────  notify (once)
//!   distance = (end-start)/58
//! ```
//!
//! Timestamps are 32-bit microsecond counters; durations use wrapping
//! subtraction so a counter rollover mid-pulse still measures correctly.
//! `0` means "not captured", so a capture landing exactly on zero is
//! nudged to `1`.

use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;
use std::sync::Arc;

use log::{debug, info};

use crate::app::ports::TriggerPort;
use crate::config::{ECHO_US_PER_CM, MonitorConfig};
use crate::drivers::echo_signal::EchoSignal;
use crate::sensors::ReadingStore;

const UNSET: u32 = 0;

// ── Pulse window ──────────────────────────────────────────────

/// Echo pulse edges captured by the ISR for the current cycle.
pub struct PulseWindow {
    start: AtomicU32,
    end: AtomicU32,
}

impl Default for PulseWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseWindow {
    pub const fn new() -> Self {
        Self {
            start: AtomicU32::new(UNSET),
            end: AtomicU32::new(UNSET),
        }
    }

    pub fn reset(&self) {
        self.end.store(UNSET, Ordering::Release);
        self.start.store(UNSET, Ordering::Release);
    }

    /// Record the rising edge.  Later rising edges in the same cycle are ignored.
    pub fn on_rising(&self, now_us: u32) {
        let _ = self.start.compare_exchange(
            UNSET,
            now_us.max(1),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Record the falling edge.  Returns `true` only for the edge that
    /// completes the window.
    pub fn on_falling(&self, now_us: u32) -> bool {
        if self.start.load(Ordering::Acquire) == UNSET {
            return false;
        }
        self.end
            .compare_exchange(UNSET, now_us.max(1), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Echo high time, once both edges are in.
    pub fn duration_us(&self) -> Option<u32> {
        let start = self.start.load(Ordering::Acquire);
        let end = self.end.load(Ordering::Acquire);
        (start != UNSET && end != UNSET).then(|| end.wrapping_sub(start))
    }
}

// ── ISR-facing capture ────────────────────────────────────────

/// Everything the echo ISR touches: the window and the task wake.
pub struct EchoCapture {
    pub window: PulseWindow,
    pub signal: EchoSignal,
}

impl Default for EchoCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoCapture {
    pub const fn new() -> Self {
        Self {
            window: PulseWindow::new(),
            signal: EchoSignal::new(),
        }
    }

    /// Clear the window and any pending wake before a new trigger.
    pub fn arm(&self) {
        self.window.reset();
        self.signal.reset();
    }

    /// Called from interrupt context on every ECHO edge.  Never blocks.
    pub fn on_edge(&self, rising: bool, now_us: u32) {
        if rising {
            self.window.on_rising(now_us);
        } else if self.window.on_falling(now_us) {
            self.signal.notify_from_isr();
        }
    }
}

/// Convert echo high time to centimetres.
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 / ECHO_US_PER_CM
}

// ── Driver task ───────────────────────────────────────────────

pub struct RangingDriver<T> {
    trigger: T,
    capture: Arc<EchoCapture>,
    store: Arc<ReadingStore>,
    pulse_width: Duration,
    timeout: Duration,
}

impl<T: TriggerPort> RangingDriver<T> {
    pub fn new(
        trigger: T,
        capture: Arc<EchoCapture>,
        store: Arc<ReadingStore>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            trigger,
            capture,
            store,
            pulse_width: Duration::from_micros(u64::from(config.trigger_pulse_us)),
            timeout: config.ranging_timeout(),
        }
    }

    /// Fire one measurement.  `None` when no complete echo arrived in time.
    pub fn trigger_and_measure(&mut self) -> Option<f32> {
        self.capture.arm();
        self.trigger.pulse(self.pulse_width);

        if !self.capture.signal.wait(self.timeout) {
            debug!("ranging: no echo within {} ms", self.timeout.as_millis());
            return None;
        }
        self.capture.window.duration_us().map(echo_to_cm)
    }

    /// One cycle: measure and store.  A miss keeps the previous distance.
    pub fn run_cycle(&mut self) -> Option<f32> {
        let distance = self.trigger_and_measure();
        if let Some(cm) = distance {
            self.store.set_distance(cm);
        }
        distance
    }

    /// Back-to-back cycles; the wait inside each is the only pacing.
    pub fn run(mut self) -> ! {
        info!("ranging: started (timeout {} ms)", self.timeout.as_millis());
        loop {
            self.run_cycle();
        }
    }
}
