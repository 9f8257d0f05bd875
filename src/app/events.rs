//! Alert events handed from the evaluator to the notification client.

use core::fmt::{self, Write};

/// Capacity of the formatted JSON body.
pub const PAYLOAD_CAPACITY: usize = 64;

pub type Payload = heapless::String<PAYLOAD_CAPACITY>;

/// An alert raised when an object is close and the light is low.
///
/// The payload is rendered once, at creation, from the same readings it
/// carries, so the notifier never re-formats.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub illuminance: f32,
    pub distance: f32,
    pub payload: Payload,
}

impl AlertEvent {
    /// Build the event and its JSON body:
    /// `{"Info": "Voltage 1.80 --- Distance 035.00"}`.
    ///
    /// Fails only when the readings are too wide for the payload buffer.
    pub fn new(illuminance: f32, distance: f32) -> Result<Self, fmt::Error> {
        let mut payload = Payload::new();
        write!(
            payload,
            "{{\"Info\": \"Voltage {:04.2} --- Distance {:06.2}\"}}",
            illuminance, distance
        )?;
        Ok(Self {
            illuminance,
            distance,
            payload,
        })
    }

    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_bytes()
    }
}
