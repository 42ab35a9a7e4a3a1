//! WS2812 addressable strip: a staged frame buffer plus the RMT writer.
//!
//! Any puzzle may stage pixel writes into the [`PixelFrame`] during a tick;
//! the control loop flushes it at most once per tick, and only if something
//! actually changed.
//!
//! ## Hardware
//!
//! On `espidf` the strip is clocked out through RMT channel 0 with the
//! usual WS2812 timings (T0H 350 ns, T0L 800 ns, T1H 700 ns, T1L 600 ns),
//! GRB byte order.  On the host the writer just records the last frame.

use crate::drivers::led_patterns::{COLOUR_OFF, Rgb};
use crate::error::PeripheralError;
use crate::pins::PIXEL_COUNT;

// ── Frame buffer ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    pixels: [Rgb; PIXEL_COUNT],
    dirty: bool,
}

impl Default for PixelFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelFrame {
    pub const fn new() -> Self {
        Self {
            pixels: [COLOUR_OFF; PIXEL_COUNT],
            dirty: true,
        }
    }

    /// Stage one pixel.  Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, colour: Rgb) {
        match self.pixels.get_mut(index) {
            Some(px) if *px != colour => {
                *px = colour;
                self.dirty = true;
            }
            _ => {}
        }
    }

    pub fn get(&self, index: usize) -> Rgb {
        self.pixels.get(index).copied().unwrap_or(COLOUR_OFF)
    }

    pub fn set_many(&mut self, indices: &[usize], colour: Rgb) {
        for &i in indices {
            self.set(i, colour);
        }
    }

    pub fn clear(&mut self) {
        for i in 0..PIXEL_COUNT {
            self.set(i, COLOUR_OFF);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hand the frame to a writer if it changed since the last flush.
    pub fn take_dirty(&mut self) -> Option<&[Rgb; PIXEL_COUNT]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.pixels)
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[Rgb] {
        &self.pixels
    }
}

// ── Strip writer ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};

/// Bits clocked out for one frame (24 per pixel).
#[cfg(target_os = "espidf")]
const FRAME_BITS: usize = PIXEL_COUNT * 24;

/// Owns the RMT transmitter that drives the strip.
pub struct PixelStrip {
    #[cfg(target_os = "espidf")]
    tx: TxRmtDriver<'static>,
    #[cfg(not(target_os = "espidf"))]
    last: Option<[Rgb; PIXEL_COUNT]>,
    writes: u32,
}

#[cfg(target_os = "espidf")]
impl PixelStrip {
    pub fn new(tx: TxRmtDriver<'static>) -> Self {
        Self { tx, writes: 0 }
    }

    pub fn write(&mut self, pixels: &[Rgb; PIXEL_COUNT]) -> Result<(), PeripheralError> {
        use core::time::Duration;

        let fail = |_| PeripheralError::PixelWriteFailed;
        let ticks_hz = self.tx.counter_clock().map_err(fail)?;
        let t0h = Pulse::new_with_duration(ticks_hz, PinState::High, &Duration::from_nanos(350))
            .map_err(fail)?;
        let t0l = Pulse::new_with_duration(ticks_hz, PinState::Low, &Duration::from_nanos(800))
            .map_err(fail)?;
        let t1h = Pulse::new_with_duration(ticks_hz, PinState::High, &Duration::from_nanos(700))
            .map_err(fail)?;
        let t1l = Pulse::new_with_duration(ticks_hz, PinState::Low, &Duration::from_nanos(600))
            .map_err(fail)?;

        let mut signal = FixedLengthSignal::<FRAME_BITS>::new();
        for (p, &(r, g, b)) in pixels.iter().enumerate() {
            let grb = (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b);
            for bit in 0..24 {
                let one = grb & (1 << (23 - bit)) != 0;
                let pair = if one { (t1h, t1l) } else { (t0h, t0l) };
                signal.set(p * 24 + bit, &pair).map_err(fail)?;
            }
        }
        self.tx.start_blocking(&signal).map_err(fail)?;
        self.writes = self.writes.wrapping_add(1);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for PixelStrip {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl PixelStrip {
    pub fn new() -> Self {
        Self {
            last: None,
            writes: 0,
        }
    }

    pub fn write(&mut self, pixels: &[Rgb; PIXEL_COUNT]) -> Result<(), PeripheralError> {
        self.last = Some(*pixels);
        self.writes = self.writes.wrapping_add(1);
        Ok(())
    }

    /// Last frame written (simulation only).
    pub fn last_frame(&self) -> Option<&[Rgb; PIXEL_COUNT]> {
        self.last.as_ref()
    }
}

impl PixelStrip {
    /// Number of frames flushed since boot.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}
