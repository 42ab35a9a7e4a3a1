//! Hardware adapter: bridges the room's peripherals to the domain ports.
//!
//! Owns the I²C bus (keypad expander and clock display), the compartment
//! relays, the transfer indicator and the LED strip, exposing them through
//! [`InputPort`] and [`OutputPort`].  This is the only module in the system
//! that touches actual hardware.  On non-espidf targets the underlying
//! drivers use cfg-gated simulation stubs.
//!
//! A peripheral that fails is logged once and then left alone; the game
//! keeps running without it.

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{InputPort, OutputPort};
use crate::config::FUEL_CONTAINERS;
use crate::drivers::clock_display::ClockDisplay;
use crate::drivers::hw_init::{gpio_read, probe_link, GpioPin};
use crate::drivers::keypad::Keypad;
use crate::drivers::led_patterns::Rgb;
use crate::drivers::pixels::PixelStrip;
use crate::drivers::relay::RelayDriver;
use crate::fsm::context::RawInputs;
use crate::pins::{self, PIXEL_COUNT};
use crate::puzzles::PuzzleId;

/// Clock brightness (1–8).
const CLOCK_BRIGHTNESS: u8 = 4;

/// Concrete adapter that combines all room hardware behind the port traits.
pub struct HardwareAdapter<B> {
    bus: B,
    keypad: Keypad,
    clock: ClockDisplay,
    clock_online: bool,
    relays: [RelayDriver<GpioPin>; PuzzleId::COUNT],
    transfer_led: RelayDriver<GpioPin>,
    strip: PixelStrip,
    strip_failed: bool,
}

impl<B: I2c> HardwareAdapter<B> {
    /// Take ownership of the bus and strip and bring the I²C devices up.
    /// GPIO must already be configured by `init_peripherals`.
    pub fn new(mut bus: B, strip: PixelStrip) -> Self {
        let mut keypad = Keypad::new(pins::KEYPAD_I2C_ADDR);
        if let Err(e) = keypad.begin(&mut bus) {
            warn!("Keypad offline: {}", e);
        }
        let mut clock = ClockDisplay::new(CLOCK_BRIGHTNESS);
        let clock_online = match clock.begin(&mut bus) {
            Ok(()) => true,
            Err(e) => {
                warn!("Clock display offline: {}", e);
                false
            }
        };

        let relays = [
            RelayDriver::new(GpioPin::new(pins::WHEELS_RELAY_GPIO), "wheels"),
            RelayDriver::new(GpioPin::new(pins::FUEL_RELAY_GPIO), "fuel"),
            RelayDriver::new(GpioPin::new(pins::STARS_RELAY_GPIO), "stars"),
        ];
        let transfer_led =
            RelayDriver::new(GpioPin::new(pins::FUEL_TRANSFER_LED_GPIO), "transfer-led");

        info!("HardwareAdapter ready (clock {})", if clock_online { "online" } else { "offline" });
        Self {
            bus,
            keypad,
            clock,
            clock_online,
            relays,
            transfer_led,
            strip,
            strip_failed: false,
        }
    }

    pub fn strip(&self) -> &PixelStrip {
        &self.strip
    }

    pub fn relay_energised(&self, puzzle: PuzzleId) -> bool {
        self.relays[puzzle.index()].is_energised()
    }

    pub fn transfer_led_on(&self) -> bool {
        self.transfer_led.is_energised()
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

/// First patched `(from, to)` pair, `from` scanned outermost.  `to` is
/// driven and `from` sensed, matching how the ports are wired.
pub fn scan_ports(ports: &[i32; FUEL_CONTAINERS]) -> Option<(usize, usize)> {
    for from in 0..FUEL_CONTAINERS {
        for to in 0..FUEL_CONTAINERS {
            if from != to && probe_link(ports[to], ports[from]) {
                return Some((from, to));
            }
        }
    }
    None
}

// ── InputPort implementation ──────────────────────────────────

impl<B: I2c> InputPort for HardwareAdapter<B> {
    fn read_inputs(&mut self) -> RawInputs {
        RawInputs {
            wheels_sensor: gpio_read(pins::WHEELS_SENSOR_GPIO),
            // Active low.
            transfer_button: !gpio_read(pins::FUEL_TRANSFER_BUTTON_GPIO),
            reset_button: !gpio_read(pins::FUEL_RESET_BUTTON_GPIO),
            port_link: scan_ports(&pins::FUEL_PORT_GPIOS),
            key: self.keypad.pressed(&mut self.bus),
        }
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<B: I2c> OutputPort for HardwareAdapter<B> {
    fn set_relay(&mut self, puzzle: PuzzleId, energised: bool) {
        self.relays[puzzle.index()].set(energised);
    }

    fn set_transfer_led(&mut self, on: bool) {
        self.transfer_led.set(on);
    }

    fn show_pixels(&mut self, pixels: &[Rgb; PIXEL_COUNT]) {
        match self.strip.write(pixels) {
            Ok(()) => self.strip_failed = false,
            Err(e) => {
                if !self.strip_failed {
                    warn!("LED strip: {}", e);
                }
                self.strip_failed = true;
            }
        }
    }

    fn show_clock(&mut self, segments: [u8; 4]) {
        if !self.clock_online {
            return;
        }
        if let Err(e) = self.clock.show(&mut self.bus, segments) {
            warn!("Clock display: {}, disabling", e);
            self.clock_online = false;
        }
    }
}
