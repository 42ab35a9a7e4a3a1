//! Tick-driven LED animations for the addressable strip.
//!
//! Nothing in here blocks: each animation is a tiny state machine advanced
//! by `tick(now_ms)` from the control loop.  The caller paints whatever the
//! returned step asks for into the shared [`PixelFrame`].
//!
//! | Animation      | Used by                         | Cadence            |
//! |----------------|---------------------------------|--------------------|
//! | `BlinkSequence`| passcode feedback, fuel solved  | N cycles at 100 ms |
//! | `StarTwinkle`  | ambient star field              | 1 s steps + pause  |
//!
//! [`PixelFrame`]: crate::drivers::pixels::PixelFrame

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

// ── Blink sequence ────────────────────────────────────────────

/// What the caller should paint on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkStep {
    /// Nothing changed (between phases, or not running).
    Hold,
    /// Paint the blink colour.
    Light,
    /// Paint black; more cycles follow.
    Dark,
    /// Paint black; the sequence is over.
    Finished,
}

/// Fixed-count on/off blink.  One cycle = one lit phase + one dark phase.
#[derive(Debug, Clone)]
pub struct BlinkSequence {
    interval_ms: u32,
    cycles_left: u8,
    lit: bool,
    last_ms: Option<u64>,
}

impl BlinkSequence {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            cycles_left: 0,
            lit: false,
            last_ms: None,
        }
    }

    /// Arm the sequence.  The first lit phase starts on the next tick.
    pub fn start(&mut self, cycles: u8) {
        self.cycles_left = cycles;
        self.lit = false;
        self.last_ms = None;
    }

    /// Abandon a running sequence.
    pub fn cancel(&mut self) {
        self.cycles_left = 0;
        self.lit = false;
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.cycles_left > 0
    }

    pub fn tick(&mut self, now_ms: u64) -> BlinkStep {
        if self.cycles_left == 0 {
            return BlinkStep::Hold;
        }
        let waiting = self
            .last_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < u64::from(self.interval_ms));
        if waiting {
            return BlinkStep::Hold;
        }
        self.last_ms = Some(now_ms);

        if self.lit {
            self.lit = false;
            self.cycles_left -= 1;
            if self.cycles_left == 0 {
                BlinkStep::Finished
            } else {
                BlinkStep::Dark
            }
        } else {
            self.lit = true;
            BlinkStep::Light
        }
    }
}

// ── Star twinkle ──────────────────────────────────────────────

/// Ambient star field: alternately brightens the current star and dims it
/// while moving to the next, one step per interval, with a one-interval
/// pause after every `steps` steps.
#[derive(Debug, Clone)]
pub struct StarTwinkle {
    interval_ms: u32,
    steps: u8,
    star_count: usize,
    current: usize,
    bright: bool,
    step: u8,
    last_ms: u64,
}

impl StarTwinkle {
    pub const fn new(interval_ms: u32, steps: u8, star_count: usize) -> Self {
        Self {
            interval_ms,
            steps,
            star_count,
            current: 0,
            bright: false,
            step: 0,
            last_ms: 0,
        }
    }

    /// Returns `(star slot, colour)` when a star changes on this tick.
    pub fn tick(&mut self, now_ms: u64) -> Option<(usize, Rgb)> {
        if self.star_count == 0 || now_ms.saturating_sub(self.last_ms) < u64::from(self.interval_ms) {
            return None;
        }
        self.last_ms = now_ms;

        if self.step >= self.steps {
            self.step = 0;
            return None;
        }
        self.step += 1;

        let slot = self.current;
        let colour = if self.bright {
            self.current = (self.current + 1) % self.star_count;
            COLOUR_STAR_DIM
        } else {
            COLOUR_STAR
        };
        self.bright = !self.bright;
        Some((slot, colour))
    }
}

/// Scale a colour by `num / den` without floating point.
pub const fn dim(colour: Rgb, num: u16, den: u16) -> Rgb {
    (
        (colour.0 as u16 * num / den) as u8,
        (colour.1 as u16 * num / den) as u8,
        (colour.2 as u16 * num / den) as u8,
    )
}

// ── Room palette ──────────────────────────────────────────────

pub const COLOUR_OFF: Rgb = (0, 0, 0);
pub const COLOUR_CORRECT: Rgb = (0, 25, 0); // Green
pub const COLOUR_INCORRECT: Rgb = (25, 0, 0); // Red
pub const COLOUR_PROGRESS: Rgb = (25, 0, 0); // Red, one per entered digit
pub const COLOUR_FUEL: Rgb = (0, 0, 25); // Blue level units
pub const COLOUR_WHEELS_HINT: Rgb = (0, 200, 255); // Cyan
pub const COLOUR_STAR: Rgb = (245, 100, 10); // Warm white
pub const COLOUR_STAR_DIM: Rgb = dim(COLOUR_STAR, 1, 10);
