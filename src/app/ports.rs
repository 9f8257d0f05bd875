//! Port traits: the hexagonal boundary between the monitoring logic and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Evaluator / Notifier / Samplers (domain)
//! ```
//!
//! Driven adapters (ADC, trigger line, indicator LEDs, network link, TCP
//! transport) implement these traits.  The tasks consume them via generics,
//! so the domain never touches hardware directly and every task runs on the
//! host against mocks.

use core::time::Duration;

use crate::error::TransportError;

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// The three user-visible indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Object within the distance threshold.
    Proximity,
    /// Proximity and low light: an alert was raised.
    Warning,
    /// Notification failure or fatal fault.
    Error,
}

/// Write-side port for the indicator LEDs.
///
/// Each indicator has exactly one writer: the evaluator owns proximity and
/// warning, the notification client owns error.
pub trait IndicatorPort {
    fn set(&mut self, indicator: Indicator, on: bool);

    fn clear(&mut self, indicator: Indicator) {
        self.set(indicator, false);
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor-side ports (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One-shot analog read of the light sensor.
pub trait AnalogPort {
    /// Raw 12-bit converter code.
    fn read_raw(&mut self) -> u16;
}

/// The ranger's trigger line.
pub trait TriggerPort {
    /// Drive the trigger high for `width`, then low.
    fn pulse(&mut self, width: Duration);
}

// ───────────────────────────────────────────────────────────────
// Network ports (domain → collector)
// ───────────────────────────────────────────────────────────────

/// Whether the network link is currently associated.
pub trait LinkPort {
    fn is_link_up(&self) -> bool;
}

/// Opens connections to the fixed collector endpoint.
pub trait Connector {
    type Conn: Connection;

    fn connect(&mut self) -> Result<Self::Conn, TransportError>;
}

/// An open request/response exchange.  Dropped after `close`.
pub trait Connection {
    /// Write all of `data`.
    fn send(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Wait for response bytes.  `Ok(0)` means the peer closed.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    fn close(self);
}

impl<T: IndicatorPort + ?Sized> IndicatorPort for &mut T {
    fn set(&mut self, indicator: Indicator, on: bool) {
        (**self).set(indicator, on);
    }
}

impl<T: LinkPort + ?Sized> LinkPort for &T {
    fn is_link_up(&self) -> bool {
        (**self).is_link_up()
    }
}

impl<T: LinkPort + ?Sized> LinkPort for std::sync::Arc<T> {
    fn is_link_up(&self) -> bool {
        (**self).is_link_up()
    }
}
