//! Outbound game events.
//!
//! Stage handlers and the [`GameService`](super::service::GameService)
//! queue these on the context; the service hands them to the
//! [`EventSink`](super::ports::EventSink) port at the end of every tick.
//! Adapters decide what to do with them: log to serial, publish over
//! MQTT, etc.

use crate::fsm::Stage;
use crate::puzzles::PuzzleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The service has started (carries the initial stage).
    Started(Stage),

    /// The sequencer moved between stages.
    StageChanged { from: Stage, to: Stage },

    /// A puzzle was solved by the players.  Remote solves are not reported.
    PuzzleSolved(PuzzleId),

    /// Everything went back to power-on state.  `announce` is set when the
    /// reset came from the room rather than from the broker.
    GlobalReset { announce: bool },

    /// A compartment pulse was requested outside of a solve.
    CompartmentOpened(PuzzleId),

    /// Rate-limited remaining-time update.
    TimerUpdate { remaining_secs: u32 },

    /// The last puzzle fell; carries the elapsed play time.
    GameCompleted { elapsed_secs: u32 },
}
