//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements              | Connects to              |
//! |------------|-------------------------|--------------------------|
//! | `hardware` | AnalogPort, TriggerPort | ESP32 ADC1, TRIG GPIO    |
//! | `link`     | LinkPort                | WiFi bring-up status     |
//! | `tcp`      | Connector, Connection   | lwIP sockets (`std::net`)|
//! | `time`     | -                       | ESP32 system timer       |
//! | `wifi`     | -                       | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod link;
pub mod tcp;
pub mod time;
pub mod wifi;
