//! Unified error types for the escape-room firmware.
//!
//! Per-subsystem error kinds (`PeripheralError`, `CommsError`) plus the
//! start-up `Error` that peripheral and configuration failures convert into.
//! All variants are `Copy` so they can be passed through the ports and logged
//! without allocation.
//!
//! None of these ever stop the loop: a failing peripheral or broker degrades
//! the matching feature and the game keeps running.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Start-up failures funnel into this type; `main` hands them to `anyhow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A peripheral (GPIO, keypad, display, LED strip) failed.
    Peripheral(PeripheralError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peripheral(e) => write!(f, "peripheral: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Peripheral errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeripheralError {
    /// The I2C keypad expander did not acknowledge its address.
    KeypadNotResponding,
    /// The 7-segment display controller did not acknowledge a write.
    DisplayWriteFailed,
    /// The addressable LED strip could not be flushed.
    PixelWriteFailed,
    /// `gpio_config` rejected a pin; carries the ESP-IDF return code.
    GpioConfigFailed(i32),
}

impl fmt::Display for PeripheralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeypadNotResponding => write!(f, "keypad not responding"),
            Self::DisplayWriteFailed => write!(f, "display write failed"),
            Self::PixelWriteFailed => write!(f, "LED strip write failed"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
        }
    }
}

impl From<PeripheralError> for Error {
    fn from(e: PeripheralError) -> Self {
        Self::Peripheral(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

/// Broker transport failures, returned by every
/// [`TransportPort`](crate::app::ports::TransportPort) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    BrokerConnectFailed,
    NotConnected,
    PublishFailed,
    SubscribeFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokerConnectFailed => write!(f, "MQTT broker connect failed"),
            Self::NotConnected => write!(f, "not connected to broker"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
