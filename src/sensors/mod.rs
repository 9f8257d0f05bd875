//! Sensor subsystem: the two sampling tasks and the store they share
//! with the evaluator.
//!
//! Each field of the [`ReadingStore`] has exactly one writer: distance is
//! written by the ranging task, illuminance by the light sampler.  The
//! evaluator reads both fields in one critical section so it never pairs a
//! fresh distance with a half-written illuminance.

pub mod light;
pub mod ranging;

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::config::{INITIAL_DISTANCE_CM, INITIAL_ILLUMINANCE_V};

/// Latest known sensor values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Centimetres to the nearest object.
    pub distance: f32,
    /// Light sensor voltage.  Lower is darker.
    pub illuminance: f32,
}

impl Reading {
    /// Far and bright: raises no indicator.
    pub const BOOT: Self = Self {
        distance: INITIAL_DISTANCE_CM,
        illuminance: INITIAL_ILLUMINANCE_V,
    };
}

impl Default for Reading {
    fn default() -> Self {
        Self::BOOT
    }
}

/// Guarded shared [`Reading`].
pub struct ReadingStore {
    inner: CriticalSectionMutex<Cell<Reading>>,
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingStore {
    pub const fn new() -> Self {
        Self::with_reading(Reading::BOOT)
    }

    pub const fn with_reading(reading: Reading) -> Self {
        Self {
            inner: CriticalSectionMutex::new(Cell::new(reading)),
        }
    }

    pub fn set_distance(&self, distance: f32) {
        self.inner.lock(|cell| {
            let mut r = cell.get();
            r.distance = distance;
            cell.set(r);
        });
    }

    pub fn set_illuminance(&self, illuminance: f32) {
        self.inner.lock(|cell| {
            let mut r = cell.get();
            r.illuminance = illuminance;
            cell.set(r);
        });
    }

    /// Both fields, read together.
    pub fn snapshot(&self) -> Reading {
        self.inner.lock(Cell::get)
    }
}
