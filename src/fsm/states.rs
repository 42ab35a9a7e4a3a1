//! Concrete stage handler functions and table builder.
//!
//! Each stage is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  READY ──['*' / start_game]──▶ WHEELS ──[solved]──▶ FUEL
//!    ▲                                                  │
//!    │                                              [solved]
//!    │                                                  ▼
//!    └──────────['#' / global_reset]─── SOLVED ◀──[solved]── STARS
//! ```
//!
//! In `Ready` and `Solved` the keypad is the game master's panel: `*`
//! starts, `#` resets and broadcasts the reset, `1`–`3` pulse a compartment.
//! In the puzzle stages the active puzzle owns the inputs.

use log::{debug, info};

use super::context::GameContext;
use super::{Stage, StateDescriptor};
use crate::app::events::GameEvent;
use crate::puzzles::{Progress, Puzzle, PuzzleId, PuzzlePhase};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static stage table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; Stage::COUNT] {
    [
        // Index 0: Ready
        StateDescriptor {
            id: Stage::Ready,
            name: "Ready",
            on_enter: Some(ready_enter),
            on_exit: None,
            on_update: ready_update,
        },
        // Index 1: Wheels
        StateDescriptor {
            id: Stage::Wheels,
            name: "Wheels",
            on_enter: Some(puzzle_enter),
            on_exit: None,
            on_update: wheels_update,
        },
        // Index 2: Fuel
        StateDescriptor {
            id: Stage::Fuel,
            name: "Fuel",
            on_enter: Some(puzzle_enter),
            on_exit: Some(fuel_exit),
            on_update: fuel_update,
        },
        // Index 3: Stars
        StateDescriptor {
            id: Stage::Stars,
            name: "Stars",
            on_enter: Some(puzzle_enter),
            on_exit: None,
            on_update: stars_update,
        },
        // Index 4: Solved
        StateDescriptor {
            id: Stage::Solved,
            name: "Solved",
            on_enter: Some(solved_enter),
            on_exit: None,
            on_update: solved_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Game master keypad (READY and SOLVED)
// ═══════════════════════════════════════════════════════════════════════════

/// What a keypad press means outside the puzzles.
enum PanelKey {
    Start,
    Reset,
    Open(PuzzleId),
    Ignored,
}

fn panel_key(key: char) -> PanelKey {
    match key {
        '*' => PanelKey::Start,
        '#' => PanelKey::Reset,
        d => d
            .to_digit(10)
            .and_then(|n| PuzzleId::from_compartment(n as u8))
            .map_or(PanelKey::Ignored, PanelKey::Open),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  READY stage
// ═══════════════════════════════════════════════════════════════════════════

fn ready_enter(ctx: &mut GameContext) {
    ctx.countdown.stop();
    info!(
        "READY: waiting for start, game length {} s",
        ctx.countdown.duration_secs()
    );
}

fn ready_update(ctx: &mut GameContext) -> Option<Stage> {
    let key = ctx.inputs.key?;
    match panel_key(key) {
        PanelKey::Start => {
            let now = ctx.now_ms();
            ctx.countdown.start(now);
            info!("READY: started from keypad");
            Some(Stage::Wheels)
        }
        PanelKey::Reset => {
            ctx.global_reset(true);
            None
        }
        PanelKey::Open(id) => {
            ctx.open_compartment(id);
            None
        }
        PanelKey::Ignored => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Puzzle stages
// ═══════════════════════════════════════════════════════════════════════════

fn puzzle_enter(ctx: &mut GameContext) {
    ctx.outputs.transfer_led = false;
    info!("Stage entered after {} ticks", ctx.total_ticks);
}

fn fuel_exit(ctx: &mut GameContext) {
    ctx.outputs.transfer_led = false;
}

fn wheels_update(ctx: &mut GameContext) -> Option<Stage> {
    play_stage(ctx, PuzzleId::Wheels)
}

fn fuel_update(ctx: &mut GameContext) -> Option<Stage> {
    play_stage(ctx, PuzzleId::Fuel)
}

fn stars_update(ctx: &mut GameContext) -> Option<Stage> {
    play_stage(ctx, PuzzleId::Stars)
}

/// Run the active puzzle.  Advances when it reports solved, or at once if
/// it was already solved remotely (no notification in that case).
fn play_stage(ctx: &mut GameContext, id: PuzzleId) -> Option<Stage> {
    let next = id.stage().next();
    let now = ctx.now_ms();
    let puzzle = &mut ctx.puzzles[id.index()];

    if puzzle.phase() != PuzzlePhase::Unsolved {
        debug!("{}: already solved, skipping stage", id);
        return Some(next);
    }

    if puzzle.play(&ctx.inputs, &mut ctx.outputs) == Progress::Solved
        && puzzle.solve(now, &mut ctx.outputs)
    {
        info!("{}: solved in the room", id);
        ctx.emit(GameEvent::PuzzleSolved(id));
        return Some(next);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SOLVED stage
// ═══════════════════════════════════════════════════════════════════════════

fn solved_enter(ctx: &mut GameContext) {
    let now = ctx.now_ms();
    let elapsed_secs = ctx.countdown.freeze(now);
    info!("SOLVED: room completed in {} s", elapsed_secs);
    ctx.emit(GameEvent::GameCompleted { elapsed_secs });
}

fn solved_update(ctx: &mut GameContext) -> Option<Stage> {
    let key = ctx.inputs.key?;
    match panel_key(key) {
        PanelKey::Reset => {
            ctx.global_reset(true);
            Some(Stage::Ready)
        }
        PanelKey::Open(id) => {
            ctx.open_compartment(id);
            None
        }
        // Solved is terminal until a reset.
        PanelKey::Start | PanelKey::Ignored => None,
    }
}
