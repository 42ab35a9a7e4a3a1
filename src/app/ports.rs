//! Port traits: the hexagonal boundary between game logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GameService (domain)
//! ```
//!
//! Driven adapters (room hardware, broker, event sinks) implement these
//! traits.  The [`GameService`](super::service::GameService) consumes them
//! via generics, so the domain core never touches hardware directly.

use crate::drivers::led_patterns::Rgb;
use crate::error::CommsError;
use crate::fsm::context::RawInputs;
use crate::inbox::CommandText;
use crate::pins::PIXEL_COUNT;
use crate::puzzles::PuzzleId;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: sampled once per tick.
pub trait InputPort {
    fn read_inputs(&mut self) -> RawInputs;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  The service calls every method each tick; adapters
/// are expected to skip writes that change nothing.
pub trait OutputPort {
    fn set_relay(&mut self, puzzle: PuzzleId, energised: bool);

    fn set_transfer_led(&mut self, on: bool);

    /// Flush a full frame to the LED strip.  Only called when it changed.
    fn show_pixels(&mut self, pixels: &[Rgb; PIXEL_COUNT]);

    fn show_clock(&mut self, segments: [u8; 4]);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`GameEvent`](super::events::GameEvent)s
/// through this port.  Adapters decide where they go (serial log, MQTT).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::GameEvent);
}

impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::GameEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &super::events::GameEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Command source (driving adapter: broker → domain)
// ───────────────────────────────────────────────────────────────

/// Pending remote command payloads, drained at the start of each tick.
pub trait CommandSource {
    fn next_command(&mut self) -> Option<CommandText>;
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain ↔ message broker)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe transport.  Incoming messages are delivered out of
/// band (into the [`CommandInbox`](crate::inbox::CommandInbox)).
pub trait TransportPort {
    /// One connection attempt.  Must not block longer than the attempt.
    fn connect(&mut self) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError>;
}
