//! Multi-step hint progression.
//!
//! A hint walks `Off → Step(0) → … → Step(n-1) → Given`.  The owning puzzle
//! performs the work of each step and calls [`HintProgression::advance`]
//! once that work reports completion.  Only [`HintProgression::clear`]
//! (global reset) moves the state backwards.

/// Progress of a puzzle's hint.  Ordered: `Off < Step(_) < Given`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HintState {
    Off,
    Step(u8),
    Given,
}

#[derive(Debug, Clone)]
pub struct HintProgression {
    steps: u8,
    state: HintState,
}

impl HintProgression {
    /// A progression with `steps` partial-solve steps.  Zero steps makes the
    /// hint a plain flag that goes straight to `Given`.
    pub const fn new(steps: u8) -> Self {
        Self {
            steps,
            state: HintState::Off,
        }
    }

    pub fn state(&self) -> HintState {
        self.state
    }

    /// Begin the hint.  Returns `true` only on the call that left `Off`.
    pub fn request(&mut self) -> bool {
        if self.state != HintState::Off {
            return false;
        }
        self.state = if self.steps == 0 {
            HintState::Given
        } else {
            HintState::Step(0)
        };
        true
    }

    /// Index of the step currently being performed.
    pub fn in_progress(&self) -> Option<u8> {
        match self.state {
            HintState::Step(i) => Some(i),
            _ => None,
        }
    }

    /// The current step finished; move to the next one (or `Given`).
    pub fn advance(&mut self) {
        if let HintState::Step(i) = self.state {
            self.state = if i + 1 < self.steps {
                HintState::Step(i + 1)
            } else {
                HintState::Given
            };
        }
    }

    /// Number of steps whose effect is already in place.
    pub fn completed_steps(&self) -> usize {
        match self.state {
            HintState::Off => 0,
            HintState::Step(i) => usize::from(i),
            HintState::Given => usize::from(self.steps),
        }
    }

    pub fn is_given(&self) -> bool {
        self.state == HintState::Given
    }

    pub fn clear(&mut self) {
        self.state = HintState::Off;
    }
}
