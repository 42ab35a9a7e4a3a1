//! Fixed-length keypad code matcher.

/// Result of feeding one key into a [`Passcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodeOutcome {
    /// More keys needed.
    Pending,
    /// The full code matched.
    Correct,
    /// The full code did not match; the entry was cleared.
    Incorrect,
}

#[derive(Debug, Clone)]
pub struct Passcode {
    solution: heapless::String<8>,
    entered: heapless::String<8>,
}

impl Passcode {
    pub fn new(solution: &str) -> Self {
        let mut s = heapless::String::new();
        for c in solution.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
        Self {
            solution: s,
            entered: heapless::String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.solution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }

    /// Keys entered so far.
    pub fn entered_len(&self) -> usize {
        self.entered.len()
    }

    pub fn push(&mut self, key: char) -> PasscodeOutcome {
        // Never overflows: the entry is evaluated as soon as it is full.
        let _ = self.entered.push(key);
        if self.entered.len() < self.solution.len() {
            return PasscodeOutcome::Pending;
        }
        if self.entered == self.solution {
            PasscodeOutcome::Correct
        } else {
            self.entered.clear();
            PasscodeOutcome::Incorrect
        }
    }

    pub fn clear(&mut self) {
        self.entered.clear();
    }
}
