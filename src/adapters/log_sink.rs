//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured game events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).  The
//! broker link implements the same trait; the binary fans events out to
//! both.

use log::{debug, info};

use crate::app::events::GameEvent;
use crate::app::ports::EventSink;
use crate::countdown::format_mmss;

/// Adapter that logs every [`GameEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { emitted: 0 }
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &GameEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match *event {
            GameEvent::Started(stage) => {
                info!("START | stage={}", stage.name());
            }
            GameEvent::StageChanged { from, to } => {
                info!("STAGE | {} -> {}", from.name(), to.name());
            }
            GameEvent::PuzzleSolved(id) => {
                info!("SOLVED | {} | compartment {}", id, id.compartment_number());
            }
            GameEvent::GlobalReset { announce } => {
                info!("RESET | global{}", if announce { " (broadcast)" } else { "" });
            }
            GameEvent::CompartmentOpened(id) => {
                info!("OPEN | compartment {} ({})", id.compartment_number(), id);
            }
            // Twice a second; keep it out of the default log level.
            GameEvent::TimerUpdate { remaining_secs } => {
                debug!("TIMER | {}", format_mmss(remaining_secs));
            }
            GameEvent::GameCompleted { elapsed_secs } => {
                info!("FINISH | escaped in {}", format_mmss(elapsed_secs));
            }
        }
    }
}
