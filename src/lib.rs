//! proxalert firmware library.
//!
//! Watches an ultrasonic ranger and a light sensor, lights indicators when
//! an object comes close, and POSTs an alert to a collector when that
//! happens in the dark.  Everything ESP-IDF-specific is guarded by
//! `#[cfg(target_os = "espidf")]` inside each module; host builds get a
//! simulation so the whole pipeline runs under `cargo test`.
//!
//! The ESP-IDF crates are optional, so device builds must enable them:
//! `cargo build --release --features espidf`.

#![deny(unused_must_use)]

#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("device builds need `--features espidf`");

// Link the host embassy-time driver that backs `async_io_mini::Timer`.
#[cfg(not(target_os = "espidf"))]
use embassy_time as _;

pub mod adapters;
pub mod app;
pub mod config;
pub mod console;
pub mod drivers;
pub mod error;
pub mod fault;
pub mod mailbox;
pub mod pins;
pub mod scheduler;
pub mod sensors;

pub use error::{Error, Result};
