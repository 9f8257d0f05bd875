//! Application core: the monitoring logic, free of hardware access.
//!
//! The evaluator decides, the notifier reports.  Both reach hardware and the
//! network only through the **port traits** in [`ports`], so they run on the
//! host against mocks.

pub mod evaluator;
pub mod events;
pub mod notifier;
pub mod ports;
pub mod request;
