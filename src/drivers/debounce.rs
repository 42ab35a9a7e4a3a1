//! Sampling debouncer shared by the keypad and the fuel buttons.
//!
//! ## Protocol
//!
//! The raw input is sampled every control tick, but a sample is only
//! *evaluated* once the quiet window has passed since the previous
//! evaluation.  An edge is reported when an evaluated sample carries a
//! value and the previous evaluated sample was the "no input" sentinel
//! (`None`).  Holding a key therefore yields exactly one edge, and chatter
//! inside the window is never looked at.
//!
//! Every physical source owns its own `Debouncer`, so sources never share
//! a last-sample record.

/// Rising-edge detector over an `Option<T>` sample stream.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_ms: u32,
    last_sample: Option<T>,
    last_eval_ms: Option<u64>,
}

impl<T: Copy> Debouncer<T> {
    pub const fn new(quiet_ms: u32) -> Self {
        Self {
            quiet_ms,
            last_sample: None,
            last_eval_ms: None,
        }
    }

    /// Feed one raw sample.  Returns the value on an accepted rising edge.
    pub fn sample(&mut self, raw: Option<T>, now_ms: u64) -> Option<T> {
        let quiet = self
            .last_eval_ms
            .is_some_and(|last| now_ms.saturating_sub(last) <= u64::from(self.quiet_ms));
        if quiet {
            return None;
        }

        let edge = match (self.last_sample, raw) {
            (None, Some(v)) => Some(v),
            _ => None,
        };
        self.last_sample = raw;
        self.last_eval_ms = Some(now_ms);
        edge
    }

    /// Last evaluated level (`Some` while the input is held).
    pub fn level(&self) -> Option<T> {
        self.last_sample
    }

    /// Forget the record; the next sample is evaluated immediately.
    pub fn reset(&mut self) {
        self.last_sample = None;
        self.last_eval_ms = None;
    }
}

/// Debouncer for a plain push button: `pressed` maps to `Some(())`.
pub type ButtonDebouncer = Debouncer<()>;

impl ButtonDebouncer {
    /// Convenience wrapper: `true` on the press edge.
    pub fn pressed(&mut self, is_down: bool, now_ms: u64) -> bool {
        self.sample(is_down.then_some(()), now_ms).is_some()
    }
}
