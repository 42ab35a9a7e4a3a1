//! Game countdown.
//!
//! Remaining time is derived from the configured duration and the time the
//! game started, so adjusting the duration while running shifts the
//! remaining time immediately.  Solving freezes it.

use core::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountdownState {
    Stopped,
    Running { started_ms: u64 },
    Frozen { remaining_secs: u32, elapsed_secs: u32 },
}

#[derive(Debug, Clone)]
pub struct Countdown {
    duration_secs: u32,
    state: CountdownState,
}

impl Countdown {
    pub const fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            state: CountdownState::Stopped,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn start(&mut self, now_ms: u64) {
        self.state = CountdownState::Running { started_ms: now_ms };
    }

    pub fn stop(&mut self) {
        self.state = CountdownState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CountdownState::Running { .. })
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, CountdownState::Frozen { .. })
    }

    pub fn elapsed_secs(&self, now_ms: u64) -> u32 {
        match self.state {
            CountdownState::Stopped => 0,
            CountdownState::Running { started_ms } => {
                let secs = now_ms.saturating_sub(started_ms) / 1000;
                u32::try_from(secs).unwrap_or(u32::MAX)
            }
            CountdownState::Frozen { elapsed_secs, .. } => elapsed_secs,
        }
    }

    /// Seconds left; the full duration while stopped.  Never negative.
    pub fn remaining_secs(&self, now_ms: u64) -> u32 {
        match self.state {
            CountdownState::Stopped => self.duration_secs,
            CountdownState::Running { .. } => {
                self.duration_secs.saturating_sub(self.elapsed_secs(now_ms))
            }
            CountdownState::Frozen { remaining_secs, .. } => remaining_secs,
        }
    }

    /// Stop the clock and keep its reading.  Returns the elapsed play time.
    pub fn freeze(&mut self, now_ms: u64) -> u32 {
        let elapsed_secs = self.elapsed_secs(now_ms);
        let remaining_secs = self.remaining_secs(now_ms);
        self.state = CountdownState::Frozen {
            remaining_secs,
            elapsed_secs,
        };
        elapsed_secs
    }

    pub fn add_secs(&mut self, secs: u32) {
        self.duration_secs = self.duration_secs.saturating_add(secs).min(MAX_DISPLAY_SECS);
    }

    /// Shorten the game, but only while more than `secs` remain configured.
    pub fn sub_secs(&mut self, secs: u32) -> bool {
        if self.duration_secs > secs {
            self.duration_secs -= secs;
            true
        } else {
            false
        }
    }
}

/// Largest value `MM:SS` can show.
pub const MAX_DISPLAY_SECS: u32 = 99 * 60 + 59;

/// `MM:SS`, minutes saturating at 99.
pub fn format_mmss(total_secs: u32) -> heapless::String<8> {
    let total_secs = total_secs.min(MAX_DISPLAY_SECS);
    let mut s = heapless::String::new();
    // 5 characters always fit.
    let _ = write!(s, "{:02}:{:02}", total_secs / 60, total_secs % 60);
    s
}
