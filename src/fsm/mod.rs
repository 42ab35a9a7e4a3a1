//! Function-pointer finite state machine engine for the stage sequence.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ Stage  │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Ready  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Wheels │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Fuel   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Stars  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  │ Solved │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  └────────┴───────────┴──────────┴───────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** stage.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current stage, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut GameContext`.
//!
//! Stages only ever move one step forward, or back to `Ready` on a
//! global reset.

pub mod context;
pub mod states;

use context::GameContext;
use log::info;

use crate::puzzles::PuzzleId;

// ---------------------------------------------------------------------------
// Stage identity
// ---------------------------------------------------------------------------

/// The room's stages, in play order.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    Ready = 0,
    Wheels = 1,
    Fuel = 2,
    Stars = 3,
    Solved = 4,
}

impl Stage {
    /// Total number of stages, used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert an index back to `Stage`.  Out of range falls back to `Ready`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Ready,
            1 => Self::Wheels,
            2 => Self::Fuel,
            3 => Self::Stars,
            4 => Self::Solved,
            _ => {
                debug_assert!(false, "invalid stage index: {idx}");
                Self::Ready
            }
        }
    }

    /// The stage after this one.  `Solved` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Ready => Self::Wheels,
            Self::Wheels => Self::Fuel,
            Self::Fuel => Self::Stars,
            Self::Stars | Self::Solved => Self::Solved,
        }
    }

    /// Puzzle played during this stage.
    pub fn puzzle(self) -> Option<PuzzleId> {
        match self {
            Self::Wheels => Some(PuzzleId::Wheels),
            Self::Fuel => Some(PuzzleId::Fuel),
            Self::Stars => Some(PuzzleId::Stars),
            Self::Ready | Self::Solved => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Wheels => "Wheels",
            Self::Fuel => "Fuel",
            Self::Stars => "Stars",
            Self::Solved => "Solved",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut GameContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut GameContext) -> Option<Stage>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single stage.
pub struct StateDescriptor {
    pub id: Stage,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `Stage as usize`.
    table: [StateDescriptor; Stage::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; Stage::COUNT], initial: Stage) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut GameContext) {
        info!("Sequencer starting in stage: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current stage.
    /// 2. If it returns `Some(next)` for a different stage, execute the
    ///    transition: `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut GameContext) {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx);
            }
        }
    }

    /// Immediate transition from outside the table (remote start / reset).
    pub fn force_transition(&mut self, next: Stage, ctx: &mut GameContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> Stage {
        Stage::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: Stage, ctx: &mut GameContext) {
        let next_idx = next_id as usize;

        info!(
            "Stage transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
