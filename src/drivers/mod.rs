//! Pin-level drivers, hardware initialisation, and task placement.

pub mod echo_signal;
pub mod heartbeat;
pub mod hw_init;
pub mod indicators;
pub mod task_pin;
