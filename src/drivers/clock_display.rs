//! TM1650 four-digit 7-segment countdown display.
//!
//! The TM1650 speaks a pseudo-I²C protocol: one control register at
//! `0x24` (brightness + on bit) and one segment register per digit at
//! `0x34..=0x37`.  The clock shows `MM.SS` with the decimal point of the
//! second digit standing in for the colon.

use embedded_hal::i2c::I2c;

use crate::error::PeripheralError;

const CONTROL_ADDR: u8 = 0x24;
const DIGIT_ADDR: u8 = 0x34;

/// Segment patterns for 0–9 (bit 0 = segment a … bit 6 = segment g).
pub const DIGIT_SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];
/// Decimal point bit.
pub const SEGMENT_DOT: u8 = 0x80;

/// Segment bytes for `MM.SS`.  Minutes saturate at 99.
pub fn encode_mmss(total_secs: u32) -> [u8; 4] {
    let minutes = (total_secs / 60).min(99) as usize;
    let seconds = (total_secs % 60) as usize;
    [
        DIGIT_SEGMENTS[minutes / 10],
        DIGIT_SEGMENTS[minutes % 10] | SEGMENT_DOT,
        DIGIT_SEGMENTS[seconds / 10],
        DIGIT_SEGMENTS[seconds % 10],
    ]
}

pub struct ClockDisplay {
    brightness: u8,
    shown: Option<[u8; 4]>,
}

impl ClockDisplay {
    /// `brightness` is 1–8; 8 is encoded as 0 by the controller.
    pub const fn new(brightness: u8) -> Self {
        Self {
            brightness,
            shown: None,
        }
    }

    /// Switch the display on at the configured brightness.
    pub fn begin<B: I2c>(&mut self, bus: &mut B) -> Result<(), PeripheralError> {
        let level = (self.brightness.clamp(1, 8) % 8) << 4;
        bus.write(CONTROL_ADDR, &[level | 0x01])
            .map_err(|_| PeripheralError::DisplayWriteFailed)
    }

    /// Write the segments if they differ from what is on the glass.
    pub fn show<B: I2c>(&mut self, bus: &mut B, segments: [u8; 4]) -> Result<(), PeripheralError> {
        if self.shown == Some(segments) {
            return Ok(());
        }
        for (i, &seg) in segments.iter().enumerate() {
            bus.write(DIGIT_ADDR + i as u8, &[seg])
                .map_err(|_| PeripheralError::DisplayWriteFailed)?;
        }
        self.shown = Some(segments);
        Ok(())
    }
}
