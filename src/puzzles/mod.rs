//! Puzzle modules and the capability interface the stage sequencer drives.
//!
//! Every puzzle owns its compartment and moves through
//! `Unsolved → Solving → Solved`:
//!
//! ```text
//!  Unsolved ──solve()──▶ Solving ──[pulse done]──▶ Solved
//!     ▲                                              │
//!     └──────────────────── reset() ─────────────────┘
//! ```
//!
//! `play()` only reports that the puzzle *is* solved; the sequencer then
//! calls `solve()`, which arms the compartment.  `service()` runs every tick
//! for every puzzle, whatever the stage, so remotely opened compartments
//! and background hint steps keep going.

pub mod compartment;
pub mod fuel;
pub mod hint;
pub mod passcode;
pub mod stars;
pub mod transfer;
pub mod wheels;

use crate::config::{GameConfig, RelayPulseConfig};
use crate::fsm::Stage;
use crate::fsm::context::{InputSnapshot, OutputFrame};

use compartment::Compartment;
use hint::HintState;

pub use fuel::FuelPuzzle;
pub use stars::StarsPuzzle;
pub use wheels::WheelsPuzzle;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The room's puzzles, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PuzzleId {
    Wheels = 0,
    Fuel = 1,
    Stars = 2,
}

impl PuzzleId {
    pub const COUNT: usize = 3;
    pub const ALL: [Self; Self::COUNT] = [Self::Wheels, Self::Fuel, Self::Stars];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wheels => "wheels",
            Self::Fuel => "fuel",
            Self::Stars => "stars",
        }
    }

    /// Notification published when the puzzle is solved in the room.
    pub fn solved_token(self) -> &'static str {
        match self {
            Self::Wheels => "wheels_solved",
            Self::Fuel => "fuel_solved",
            Self::Stars => "star_solved",
        }
    }

    /// Compartments are numbered from 1 in play order.
    pub fn compartment_number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_compartment(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Wheels),
            2 => Some(Self::Fuel),
            3 => Some(Self::Stars),
            _ => None,
        }
    }

    /// Stage during which this puzzle is played.
    pub fn stage(self) -> Stage {
        match self {
            Self::Wheels => Stage::Wheels,
            Self::Fuel => Stage::Fuel,
            Self::Stars => Stage::Stars,
        }
    }
}

impl core::fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzlePhase {
    Unsolved,
    /// Compartment pulse in flight.
    Solving,
    Solved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Restart the puzzle, keeping any hint already given.
    Local,
    /// Back to power-on state, hints included.
    Global,
}

/// What a `play()` tick concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Pending,
    Solved,
}

/// Solve lifecycle plus the compartment it releases.
#[derive(Debug, Clone)]
pub struct SolveLatch {
    compartment: Compartment,
    phase: PuzzlePhase,
}

impl SolveLatch {
    pub const fn new(pulse: RelayPulseConfig) -> Self {
        Self {
            compartment: Compartment::new(pulse),
            phase: PuzzlePhase::Unsolved,
        }
    }

    pub fn phase(&self) -> PuzzlePhase {
        self.phase
    }

    pub fn is_unsolved(&self) -> bool {
        self.phase == PuzzlePhase::Unsolved
    }

    /// Arm the compartment.  Only the first call after a reset does anything.
    pub fn trigger(&mut self, now_ms: u64) -> bool {
        if self.phase != PuzzlePhase::Unsolved {
            return false;
        }
        self.compartment.open(now_ms);
        self.phase = PuzzlePhase::Solving;
        true
    }

    /// Pulse the compartment without touching the solve state.
    pub fn open(&mut self, now_ms: u64) {
        self.compartment.open(now_ms);
    }

    /// Relay level for this tick; completes `Solving` once the pulse ends.
    pub fn service(&mut self, now_ms: u64) -> bool {
        let level = self.compartment.handle(now_ms).level();
        if self.phase == PuzzlePhase::Solving && !self.compartment.is_pulsing() {
            self.phase = PuzzlePhase::Solved;
        }
        level
    }

    pub fn clear(&mut self) {
        self.phase = PuzzlePhase::Unsolved;
    }
}

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

pub trait Puzzle {
    fn id(&self) -> PuzzleId;

    fn latch(&self) -> &SolveLatch;
    fn latch_mut(&mut self) -> &mut SolveLatch;

    /// Hint progress (`Given` at once for flag-style hints).
    fn hint_state(&self) -> HintState;

    /// Draw the initial state.  Called once at boot.
    fn setup(&mut self, out: &mut OutputFrame);

    fn reset(&mut self, scope: ResetScope, out: &mut OutputFrame);

    /// Reveal partial information.  Never completes the puzzle.
    fn hint(&mut self, now_ms: u64, out: &mut OutputFrame);

    /// One tick of the active puzzle.
    fn play(&mut self, inputs: &InputSnapshot, out: &mut OutputFrame) -> Progress;

    /// Arm the compartment and drop any in-flight local state.
    /// Returns `true` on the call that actually started solving.
    fn solve(&mut self, now_ms: u64, out: &mut OutputFrame) -> bool;

    /// Per-tick housekeeping, run for every puzzle in every stage.
    fn service(&mut self, now_ms: u64, out: &mut OutputFrame) {
        let id = self.id();
        out.relays[id.index()] = self.latch_mut().service(now_ms);
    }

    fn phase(&self) -> PuzzlePhase {
        self.latch().phase()
    }

    fn open_compartment(&mut self, now_ms: u64) {
        self.latch_mut().open(now_ms);
    }
}

// ---------------------------------------------------------------------------
// Fixed collection
// ---------------------------------------------------------------------------

/// One of the room's puzzles.  The sequencer holds `[PuzzleModule; 3]`.
#[derive(Debug, Clone)]
pub enum PuzzleModule {
    Wheels(WheelsPuzzle),
    Fuel(FuelPuzzle),
    Stars(StarsPuzzle),
}

impl PuzzleModule {
    fn inner(&self) -> &dyn Puzzle {
        match self {
            Self::Wheels(p) => p,
            Self::Fuel(p) => p,
            Self::Stars(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Puzzle {
        match self {
            Self::Wheels(p) => p,
            Self::Fuel(p) => p,
            Self::Stars(p) => p,
        }
    }

    pub fn as_fuel(&self) -> Option<&FuelPuzzle> {
        match self {
            Self::Fuel(p) => Some(p),
            _ => None,
        }
    }
}

impl Puzzle for PuzzleModule {
    fn id(&self) -> PuzzleId {
        self.inner().id()
    }

    fn latch(&self) -> &SolveLatch {
        self.inner().latch()
    }

    fn latch_mut(&mut self) -> &mut SolveLatch {
        self.inner_mut().latch_mut()
    }

    fn hint_state(&self) -> HintState {
        self.inner().hint_state()
    }

    fn setup(&mut self, out: &mut OutputFrame) {
        self.inner_mut().setup(out);
    }

    fn reset(&mut self, scope: ResetScope, out: &mut OutputFrame) {
        self.inner_mut().reset(scope, out);
    }

    fn hint(&mut self, now_ms: u64, out: &mut OutputFrame) {
        self.inner_mut().hint(now_ms, out);
    }

    fn play(&mut self, inputs: &InputSnapshot, out: &mut OutputFrame) -> Progress {
        self.inner_mut().play(inputs, out)
    }

    fn solve(&mut self, now_ms: u64, out: &mut OutputFrame) -> bool {
        self.inner_mut().solve(now_ms, out)
    }

    fn service(&mut self, now_ms: u64, out: &mut OutputFrame) {
        self.inner_mut().service(now_ms, out);
    }
}

/// Build the room's puzzles, indexed by [`PuzzleId::index`].
pub fn build_modules(config: &GameConfig) -> [PuzzleModule; PuzzleId::COUNT] {
    [
        PuzzleModule::Wheels(WheelsPuzzle::new(config.relay_pulse)),
        PuzzleModule::Fuel(FuelPuzzle::new(&config.fuel, config.relay_pulse)),
        PuzzleModule::Stars(StarsPuzzle::new(&config.stars, config.relay_pulse)),
    ]
}
