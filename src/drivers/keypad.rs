//! 4×4 matrix keypad behind a PCF8574 I²C expander.
//!
//! ## Scan
//!
//! 1. Write `0xF0` (rows pulled up, columns driven low) and read back; the
//!    row of a pressed key pulls its upper-nibble bit low.
//! 2. Write `0x0F` (columns pulled up, rows driven low) and read back; the
//!    column shows up in the lower nibble.
//!
//! The resulting index (row + 4·column) is looked up in [`KEYMAP`].  Slots
//! 3, 7, 11 and 15 are not wired to keys and map to nothing.
//! No key, several keys, or a bus error all read as "no key".

use embedded_hal::i2c::I2c;
use log::warn;

use crate::error::PeripheralError;

/// Key characters by scan index; index 16 is the "nothing pressed" slot.
pub const KEYMAP: &[u8; 17] = b"123 456 789 *0# N";

/// Scan index meaning "nothing pressed".
pub const NO_KEY: u8 = 16;

/// Map a scan index to its key, if the slot is a real key.
pub fn key_for_index(index: u8) -> Option<char> {
    match KEYMAP.get(index as usize) {
        Some(b' ' | b'N') | None => None,
        Some(&c) => Some(c as char),
    }
}

pub struct Keypad {
    addr: u8,
    online: bool,
}

impl Keypad {
    pub const fn new(addr: u8) -> Self {
        Self { addr, online: false }
    }

    /// Probe the expander.  On failure the keypad stays offline and every
    /// scan reports no key.
    pub fn begin<B: I2c>(&mut self, bus: &mut B) -> Result<(), PeripheralError> {
        match bus.write(self.addr, &[0xFF]) {
            Ok(()) => {
                self.online = true;
                Ok(())
            }
            Err(_) => {
                self.online = false;
                Err(PeripheralError::KeypadNotResponding)
            }
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Raw scan index (`NO_KEY` when nothing usable is pressed).
    pub fn scan_index<B: I2c>(&mut self, bus: &mut B) -> u8 {
        if !self.online {
            return NO_KEY;
        }
        match self.scan(bus) {
            Ok(idx) => idx,
            Err(_) => {
                warn!("Keypad: I2C read failed, reporting no key");
                NO_KEY
            }
        }
    }

    /// Currently pressed key, if any.
    pub fn pressed<B: I2c>(&mut self, bus: &mut B) -> Option<char> {
        key_for_index(self.scan_index(bus))
    }

    fn scan<B: I2c>(&self, bus: &mut B) -> Result<u8, B::Error> {
        let rows = Self::read_mask(bus, self.addr, 0xF0)?;
        let row = match rows & 0xF0 {
            0xE0 => 0,
            0xD0 => 1,
            0xB0 => 2,
            0x70 => 3,
            _ => return Ok(NO_KEY),
        };
        let cols = Self::read_mask(bus, self.addr, 0x0F)?;
        let col = match cols & 0x0F {
            0x0E => 0,
            0x0D => 1,
            0x0B => 2,
            0x07 => 3,
            _ => return Ok(NO_KEY),
        };
        Ok(row + 4 * col)
    }

    fn read_mask<B: I2c>(bus: &mut B, addr: u8, mask: u8) -> Result<u8, B::Error> {
        bus.write(addr, &[mask])?;
        let mut buf = [0u8; 1];
        bus.read(addr, &mut buf)?;
        Ok(buf[0])
    }
}
