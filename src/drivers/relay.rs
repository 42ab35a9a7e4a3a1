//! Compartment relay driver.
//!
//! Thin wrapper over any `embedded_hal` output pin.  Tracks the commanded
//! level so the hardware adapter only touches the GPIO on a change.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct RelayDriver<P> {
    pin: P,
    energised: bool,
    label: &'static str,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of the pin and drive it LOW (latch closed).
    pub fn new(mut pin: P, label: &'static str) -> Self {
        if pin.set_low().is_err() {
            warn!("Relay {}: initial set_low failed", label);
        }
        Self {
            pin,
            energised: false,
            label,
        }
    }

    /// Drive the relay; no-op if already at `high`.
    pub fn set(&mut self, high: bool) {
        if high == self.energised {
            return;
        }
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match res {
            Ok(()) => self.energised = high,
            Err(_) => warn!("Relay {}: GPIO write failed", self.label),
        }
    }

    pub fn is_energised(&self) -> bool {
        self.energised
    }
}
