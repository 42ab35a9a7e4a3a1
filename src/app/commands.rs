//! Inbound remote commands.
//!
//! The game master's console publishes plain string tokens on the control
//! topic.  [`RemoteCommand::parse`] maps a payload to exactly one command;
//! anything it does not recognise is ignored by the caller.
//!
//! | Token                          | Command                 |
//! |--------------------------------|-------------------------|
//! | `start_game`                   | `StartGame`             |
//! | `global_reset`                 | `GlobalReset`           |
//! | `add_min` / `sub_min`          | `AddMinute` / `SubMinute` |
//! | `<puzzle>_hint`                | `Hint(puzzle)`          |
//! | `<puzzle>_solve`, `_solved`    | `Solve(puzzle)`         |
//! | `<puzzle>_reset`               | `Reset(puzzle)`         |
//! | `comp_<n>_open` (n = 1..=3)    | `OpenCompartment(n)`    |
//!
//! `<puzzle>` is `wheels`, `fuel` (alias `water`) or `stars` (alias `star`).

use crate::puzzles::PuzzleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    StartGame,
    GlobalReset,
    AddMinute,
    SubMinute,
    Hint(PuzzleId),
    Solve(PuzzleId),
    Reset(PuzzleId),
    OpenCompartment(PuzzleId),
}

fn puzzle_by_name(name: &str) -> Option<PuzzleId> {
    match name {
        "wheels" => Some(PuzzleId::Wheels),
        "fuel" | "water" => Some(PuzzleId::Fuel),
        "stars" | "star" => Some(PuzzleId::Stars),
        _ => None,
    }
}

impl RemoteCommand {
    /// Exact-token match on the trimmed payload.
    pub fn parse(payload: &str) -> Option<Self> {
        let token = payload.trim();
        match token {
            "start_game" => return Some(Self::StartGame),
            "global_reset" => return Some(Self::GlobalReset),
            "add_min" => return Some(Self::AddMinute),
            "sub_min" => return Some(Self::SubMinute),
            _ => {}
        }

        if let Some(n) = token
            .strip_prefix("comp_")
            .and_then(|rest| rest.strip_suffix("_open"))
        {
            return n
                .parse::<u8>()
                .ok()
                .and_then(PuzzleId::from_compartment)
                .map(Self::OpenCompartment);
        }

        let (name, action) = token.rsplit_once('_')?;
        let puzzle = puzzle_by_name(name)?;
        match action {
            "hint" => Some(Self::Hint(puzzle)),
            "solve" | "solved" => Some(Self::Solve(puzzle)),
            "reset" => Some(Self::Reset(puzzle)),
            _ => None,
        }
    }
}
