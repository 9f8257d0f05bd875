//! Unified error types for the proxalert firmware.
//!
//! Only bring-up and the network path can fail.  Bring-up failures
//! (configuration, peripherals) funnel into [`Error`] so `main()` can report
//! them uniformly; transport failures stay inside the notification client,
//! which reports them on the error LED.  Sensor reads degrade to "no new
//! value" instead of erroring.

use core::fmt;
use std::io;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level bring-up error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Build-time or runtime configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Failures on the collector connection.
///
/// `Refused` and `TimedOut` can only come out of connection setup; the
/// remaining variants describe a connection that was open and then failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The collector actively refused the connection.
    Refused,
    /// Connect or response wait exceeded the transport timeout.
    TimedOut,
    /// The peer reset an established connection.
    Reset,
    /// The connection was closed before the request was fully written.
    Closed,
    /// Any other socket error.
    Io,
    /// The composed request does not fit the request buffer.
    RequestTooLarge,
}

impl TransportError {
    /// Classify an I/O error raised while opening the connection.
    pub fn from_connect(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::TimedOut,
            _ => Self::Io,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            // Read timeouts surface as WouldBlock on some platforms.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::TimedOut,
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => Self::Reset,
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected
            | io::ErrorKind::WriteZero
            | io::ErrorKind::UnexpectedEof => Self::Closed,
            _ => Self::Io,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refused => write!(f, "connection refused"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Reset => write!(f, "connection reset by peer"),
            Self::Closed => write!(f, "connection closed"),
            Self::Io => write!(f, "socket I/O error"),
            Self::RequestTooLarge => write!(f, "request exceeds buffer"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// The collector address could not be parsed.
    InvalidEndpoint(&'static str),
    /// WiFi SSID or passphrase is malformed.
    InvalidCredentials(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::InvalidEndpoint(msg) => write!(f, "invalid collector endpoint: {msg}"),
            Self::InvalidCredentials(msg) => write!(f, "invalid WiFi credentials: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}
