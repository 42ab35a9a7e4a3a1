//! Stars puzzle: a keypad passcode with one progress LED per digit.
//!
//! A full entry triggers a short green (correct) or red (incorrect) blink
//! on the progress LEDs.  Keys pressed during the blink are dropped.  The
//! hint is a plain flag the game master can read back.

use log::info;

use crate::config::{RelayPulseConfig, StarsConfig};
use crate::drivers::led_patterns::{BlinkSequence, BlinkStep, COLOUR_CORRECT, COLOUR_INCORRECT, COLOUR_OFF, COLOUR_PROGRESS, Rgb};
use crate::fsm::context::{InputSnapshot, OutputFrame};
use crate::pins;

use super::hint::{HintProgression, HintState};
use super::passcode::{Passcode, PasscodeOutcome};
use super::{Progress, Puzzle, PuzzleId, ResetScope, SolveLatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarsState {
    Entering,
    Feedback { correct: bool },
}

/// Light the first `count` progress LEDs in `colour`, the rest off.
pub fn paint_progress(out: &mut OutputFrame, count: usize, colour: Rgb) {
    for (i, &led) in pins::STAR_PROGRESS_LEDS.iter().enumerate() {
        out.pixels.set(led, if i < count { colour } else { COLOUR_OFF });
    }
}

#[derive(Debug, Clone)]
pub struct StarsPuzzle {
    passcode: Passcode,
    state: StarsState,
    blink: BlinkSequence,
    blink_count: u8,
    hint: HintProgression,
    latch: SolveLatch,
}

impl StarsPuzzle {
    pub fn new(config: &StarsConfig, pulse: RelayPulseConfig) -> Self {
        Self {
            passcode: Passcode::new(&config.passcode),
            state: StarsState::Entering,
            blink: BlinkSequence::new(config.feedback_blink_interval_ms),
            blink_count: config.feedback_blink_count,
            hint: HintProgression::new(0),
            latch: SolveLatch::new(pulse),
        }
    }

    pub fn state(&self) -> StarsState {
        self.state
    }

    pub fn entered_len(&self) -> usize {
        self.passcode.entered_len()
    }

    fn clear_entry(&mut self, out: &mut OutputFrame) {
        self.passcode.clear();
        self.blink.cancel();
        self.state = StarsState::Entering;
        paint_progress(out, 0, COLOUR_OFF);
    }

    fn enter(&mut self, key: char, out: &mut OutputFrame) {
        let correct = match self.passcode.push(key) {
            PasscodeOutcome::Pending => {
                paint_progress(out, self.passcode.entered_len(), COLOUR_PROGRESS);
                return;
            }
            PasscodeOutcome::Correct => true,
            PasscodeOutcome::Incorrect => false,
        };
        info!("Stars: passcode {}", if correct { "correct" } else { "wrong" });
        paint_progress(out, self.passcode.len(), COLOUR_PROGRESS);
        self.state = StarsState::Feedback { correct };
        self.blink.start(self.blink_count);
    }

    fn feedback(&mut self, correct: bool, now_ms: u64, out: &mut OutputFrame) -> Progress {
        let colour = if correct { COLOUR_CORRECT } else { COLOUR_INCORRECT };
        match self.blink.tick(now_ms) {
            BlinkStep::Light => paint_progress(out, pins::STAR_PROGRESS_LEDS.len(), colour),
            BlinkStep::Dark | BlinkStep::Finished => paint_progress(out, 0, COLOUR_OFF),
            BlinkStep::Hold => {}
        }
        if self.blink.is_running() {
            return Progress::Pending;
        }
        paint_progress(out, 0, COLOUR_OFF);
        if correct {
            Progress::Solved
        } else {
            self.state = StarsState::Entering;
            Progress::Pending
        }
    }
}

impl Puzzle for StarsPuzzle {
    fn id(&self) -> PuzzleId {
        PuzzleId::Stars
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
        out.relays[PuzzleId::Stars.index()] = false;
        self.clear_entry(out);
    }

    fn reset(&mut self, scope: ResetScope, out: &mut OutputFrame) {
        if scope == ResetScope::Global {
            self.hint.clear();
        }
        self.latch.clear();
        self.clear_entry(out);
    }

    fn hint(&mut self, _now_ms: u64, _out: &mut OutputFrame) {
        if self.latch.is_unsolved() && self.hint.request() {
            info!("Stars: hint given");
        }
    }

    fn play(&mut self, inputs: &InputSnapshot, out: &mut OutputFrame) -> Progress {
        if !self.latch.is_unsolved() {
            return Progress::Pending;
        }
        match self.state {
            StarsState::Entering => {
                if let Some(key) = inputs.key {
                    self.enter(key, out);
                }
                Progress::Pending
            }
            StarsState::Feedback { correct } => self.feedback(correct, inputs.now_ms, out),
        }
    }

    fn solve(&mut self, now_ms: u64, out: &mut OutputFrame) -> bool {
        if !self.latch.trigger(now_ms) {
            return false;
        }
        self.clear_entry(out);
        true
    }
}
