//! Wheels puzzle: solved when the wheel sensor reports alignment.
//! The hint lights a single cyan LED.

use log::info;

use crate::config::RelayPulseConfig;
use crate::drivers::led_patterns::{COLOUR_OFF, COLOUR_WHEELS_HINT};
use crate::fsm::context::{InputSnapshot, OutputFrame};
use crate::pins;

use super::hint::{HintProgression, HintState};
use super::{Progress, Puzzle, PuzzleId, ResetScope, SolveLatch};

#[derive(Debug, Clone)]
pub struct WheelsPuzzle {
    latch: SolveLatch,
    hint: HintProgression,
}

impl WheelsPuzzle {
    pub const fn new(pulse: RelayPulseConfig) -> Self {
        Self {
            latch: SolveLatch::new(pulse),
            hint: HintProgression::new(0),
        }
    }

    fn draw(&self, out: &mut OutputFrame) {
        let colour = if self.hint.is_given() {
            COLOUR_WHEELS_HINT
        } else {
            COLOUR_OFF
        };
        out.pixels.set(pins::WHEELS_HINT_LED, colour);
    }
}

impl Puzzle for WheelsPuzzle {
    fn id(&self) -> PuzzleId {
        PuzzleId::Wheels
    }

    fn latch(&self) -> &SolveLatch {
        &self.latch
    }

    fn latch_mut(&mut self) -> &mut SolveLatch {
        &mut self.latch
    }

    fn hint_state(&self) -> HintState {
        self.hint.state()
    }

    fn setup(&mut self, out: &mut OutputFrame) {
        out.relays[PuzzleId::Wheels.index()] = false;
        self.draw(out);
    }

    fn reset(&mut self, scope: ResetScope, out: &mut OutputFrame) {
        if scope == ResetScope::Global {
            self.hint.clear();
        }
        self.latch.clear();
        self.draw(out);
    }

    fn hint(&mut self, _now_ms: u64, out: &mut OutputFrame) {
        if !self.latch.is_unsolved() {
            return;
        }
        if self.hint.request() {
            info!("Wheels: hint LED on");
        }
        self.draw(out);
    }

    fn play(&mut self, inputs: &InputSnapshot, _out: &mut OutputFrame) -> Progress {
        if self.latch.is_unsolved() && inputs.wheels_aligned {
            Progress::Solved
        } else {
            Progress::Pending
        }
    }

    fn solve(&mut self, now_ms: u64, _out: &mut OutputFrame) -> bool {
        self.latch.trigger(now_ms)
    }
}
