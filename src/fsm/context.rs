//! Shared mutable context threaded through every stage handler.
//!
//! `GameContext` is the single struct that stage handlers read from and
//! write to.  It holds this tick's conditioned inputs, the output frame the
//! service applies after the tick, the puzzles, the countdown, and the
//! outbound event queue.  Think of it as the "blackboard" in a blackboard
//! architecture.

use log::{info, warn};

use crate::app::events::GameEvent;
use crate::config::GameConfig;
use crate::countdown::Countdown;
use crate::drivers::clock_display::encode_mmss;
use crate::drivers::pixels::PixelFrame;
use crate::puzzles::{Puzzle, PuzzleId, PuzzleModule, ResetScope, build_modules};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Raw levels as sampled by the hardware adapter, before debouncing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInputs {
    /// Wheel alignment sensor reads HIGH.
    pub wheels_sensor: bool,
    /// Fuel transfer button held (active low on the wire).
    pub transfer_button: bool,
    /// Fuel reset button held (active low on the wire).
    pub reset_button: bool,
    /// First patched `(from, to)` container pair found by the port scan.
    pub port_link: Option<(usize, usize)>,
    /// Key currently held on the keypad.
    pub key: Option<char>,
}

/// Inputs as the puzzles see them: buttons and keys reduced to edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub now_ms: u64,
    pub wheels_aligned: bool,
    pub transfer_pressed: bool,
    pub reset_pressed: bool,
    pub port_link: Option<(usize, usize)>,
    /// Newly pressed key, once per press.
    pub key: Option<char>,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Everything the service pushes to the hardware after a tick.
#[derive(Debug, Clone)]
pub struct OutputFrame {
    /// Compartment relays, indexed by [`PuzzleId::index`].
    pub relays: [bool; PuzzleId::COUNT],
    pub transfer_led: bool,
    pub pixels: PixelFrame,
    /// Segment bytes for the countdown display.
    pub clock: [u8; 4],
}

impl OutputFrame {
    pub const fn new() -> Self {
        Self {
            relays: [false; PuzzleId::COUNT],
            transfer_led: false,
            pixels: PixelFrame::new(),
            clock: [0; 4],
        }
    }
}

impl Default for OutputFrame {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// GameContext
// ---------------------------------------------------------------------------

/// Depth of the per-tick outbound event queue.
pub const EVENT_QUEUE_DEPTH: usize = 16;

pub struct GameContext {
    // -- Timing --
    /// Ticks elapsed since the current stage was entered.
    pub ticks_in_state: u64,
    pub total_ticks: u64,

    // -- Inputs / outputs --
    pub inputs: InputSnapshot,
    pub outputs: OutputFrame,

    // -- Game state --
    pub puzzles: [PuzzleModule; PuzzleId::COUNT],
    pub countdown: Countdown,

    // -- Configuration --
    pub config: GameConfig,

    events: heapless::Vec<GameEvent, EVENT_QUEUE_DEPTH>,
}

impl GameContext {
    pub fn new(config: GameConfig) -> Self {
        let mut outputs = OutputFrame::new();
        outputs.clock = encode_mmss(config.game_duration_secs);
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            inputs: InputSnapshot::default(),
            outputs,
            puzzles: build_modules(&config),
            countdown: Countdown::new(config.game_duration_secs),
            config,
            events: heapless::Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.inputs.now_ms
    }

    pub fn puzzle(&self, id: PuzzleId) -> &PuzzleModule {
        &self.puzzles[id.index()]
    }

    /// Queue an event for the sink.  Dropped with a warning when full.
    pub fn emit(&mut self, event: GameEvent) {
        if let Err(event) = self.events.push(event) {
            warn!("Event queue full, dropping {:?}", event);
        }
    }

    pub fn take_events(&mut self) -> heapless::Vec<GameEvent, EVENT_QUEUE_DEPTH> {
        core::mem::take(&mut self.events)
    }

    /// Put every puzzle and the countdown back to power-on state.
    /// `announce` asks the broker link to broadcast the reset.
    pub fn global_reset(&mut self, announce: bool) {
        for puzzle in self.puzzles.iter_mut() {
            puzzle.reset(ResetScope::Global, &mut self.outputs);
        }
        self.countdown.stop();
        info!("Global reset{}", if announce { " (local)" } else { "" });
        self.emit(GameEvent::GlobalReset { announce });
    }

    pub fn open_compartment(&mut self, id: PuzzleId) {
        let now = self.inputs.now_ms;
        self.puzzles[id.index()].open_compartment(now);
        info!("Compartment {} ({}) opened", id.compartment_number(), id);
        self.emit(GameEvent::CompartmentOpened(id));
    }
}
