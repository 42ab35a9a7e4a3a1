//! Compartment latch actuator.
//!
//! A compartment is released by a double relay pulse:
//!
//! ```text
//!  open()
//!    │ HIGH  │ LOW │   HIGH   │ LOW (idle) …
//!    0     500   700       1200 ms
//! ```
//!
//! [`Compartment::handle`] recomputes the relay level from the time elapsed
//! since the last `open()`, so it can be called any number of times per
//! tick and re-arming simply moves the origin.

use crate::config::RelayPulseConfig;

/// Where the relay pulse currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    Idle,
    FirstHigh,
    Low,
    SecondHigh,
}

impl PulsePhase {
    /// Relay level for this phase.
    pub fn level(self) -> bool {
        matches!(self, Self::FirstHigh | Self::SecondHigh)
    }
}

#[derive(Debug, Clone)]
pub struct Compartment {
    pulse: RelayPulseConfig,
    opened_at_ms: Option<u64>,
}

impl Compartment {
    pub const fn new(pulse: RelayPulseConfig) -> Self {
        Self {
            pulse,
            opened_at_ms: None,
        }
    }

    /// Start (or restart) the release pulse at `now_ms`.
    pub fn open(&mut self, now_ms: u64) {
        self.opened_at_ms = Some(now_ms);
    }

    /// Phase at `now_ms`.  Returns to idle once the pulse has run out.
    pub fn handle(&mut self, now_ms: u64) -> PulsePhase {
        let phase = self.phase_at(now_ms);
        if phase == PulsePhase::Idle {
            self.opened_at_ms = None;
        }
        phase
    }

    pub fn is_pulsing(&self) -> bool {
        self.opened_at_ms.is_some()
    }

    fn phase_at(&self, now_ms: u64) -> PulsePhase {
        let Some(opened) = self.opened_at_ms else {
            return PulsePhase::Idle;
        };
        let elapsed = now_ms.saturating_sub(opened);
        if elapsed < u64::from(self.pulse.first_high_until_ms) {
            PulsePhase::FirstHigh
        } else if elapsed < u64::from(self.pulse.low_until_ms) {
            PulsePhase::Low
        } else if elapsed < u64::from(self.pulse.second_high_until_ms) {
            PulsePhase::SecondHigh
        } else {
            PulsePhase::Idle
        }
    }
}
