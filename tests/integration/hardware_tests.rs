//! `HardwareAdapter` against the simulated GPIO register and a fake I²C
//! bus carrying the keypad expander and the clock display.
//!
//! The simulated pins are process-wide, so every test here holds
//! `SIM_LOCK` and puts the levels it touched back before returning.

use std::sync::{Mutex, MutexGuard};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use escaperoom::adapters::hardware::HardwareAdapter;
use escaperoom::app::ports::{InputPort, OutputPort};
use escaperoom::app::service::GameService;
use escaperoom::config::GameConfig;
use escaperoom::drivers::clock_display::encode_mmss;
use escaperoom::drivers::hw_init::sim;
use escaperoom::drivers::led_patterns::COLOUR_FUEL;
use escaperoom::drivers::pixels::PixelStrip;
use escaperoom::fsm::Stage;
use escaperoom::inbox::CommandInbox;
use escaperoom::pins;
use escaperoom::puzzles::PuzzleId;

use crate::mock_hw::RecordingSink;

static SIM_LOCK: Mutex<()> = Mutex::new(());

fn sim_guard() -> MutexGuard<'static, ()> {
    SIM_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

// ── Fake bus ──────────────────────────────────────────────────

#[derive(Debug)]
struct Nack;

impl embedded_hal::i2c::Error for Nack {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// PCF8574 keypad expander plus TM1650 clock on one bus.
struct RoomBus {
    keypad_present: bool,
    clock_present: bool,
    /// Key held at (row, col).
    held: Option<(u8, u8)>,
    expander_mask: u8,
    clock_writes: Vec<(u8, u8)>,
}

impl RoomBus {
    fn new() -> Self {
        Self {
            keypad_present: true,
            clock_present: true,
            held: None,
            expander_mask: 0xFF,
            clock_writes: Vec::new(),
        }
    }

    fn hold(&mut self, key: char) {
        let index = escaperoom::drivers::keypad::KEYMAP
            .iter()
            .position(|&c| c as char == key)
            .expect("key on keymap") as u8;
        self.held = Some((index % 4, index / 4));
    }

    fn expander(&mut self, ops: &mut [Operation<'_>]) {
        for op in ops {
            match op {
                Operation::Write(bytes) => self.expander_mask = bytes[0],
                Operation::Read(buf) => {
                    let mut v = self.expander_mask;
                    if let Some((row, col)) = self.held {
                        match self.expander_mask {
                            0xF0 => v &= !(0x10 << row),
                            0x0F => v &= !(0x01 << col),
                            _ => {}
                        }
                    }
                    buf[0] = v;
                }
            }
        }
    }
}

impl ErrorType for RoomBus {
    type Error = Nack;
}

impl I2c for RoomBus {
    fn transaction(&mut self, addr: u8, ops: &mut [Operation<'_>]) -> Result<(), Nack> {
        if addr == pins::KEYPAD_I2C_ADDR {
            if !self.keypad_present {
                return Err(Nack);
            }
            self.expander(ops);
            return Ok(());
        }
        if !self.clock_present {
            return Err(Nack);
        }
        for op in ops {
            if let Operation::Write(bytes) = op {
                self.clock_writes.push((addr, bytes[0]));
            }
        }
        Ok(())
    }
}

fn adapter(bus: RoomBus) -> HardwareAdapter<RoomBus> {
    HardwareAdapter::new(bus, PixelStrip::new())
}

fn release_inputs() {
    for pin in [
        pins::WHEELS_SENSOR_GPIO,
        pins::FUEL_TRANSFER_BUTTON_GPIO,
        pins::FUEL_RESET_BUTTON_GPIO,
    ] {
        sim::set_level(pin, pin != pins::WHEELS_SENSOR_GPIO);
    }
}

// ── Inputs ────────────────────────────────────────────────────

#[test]
fn idle_room_reads_nothing() {
    let _sim = sim_guard();
    release_inputs();
    let mut hw = adapter(RoomBus::new());

    let raw = hw.read_inputs();
    assert!(!raw.wheels_sensor);
    assert!(!raw.transfer_button);
    assert!(!raw.reset_button);
    assert_eq!(raw.port_link, None);
    assert_eq!(raw.key, None);
}

#[test]
fn buttons_are_active_low() {
    let _sim = sim_guard();
    release_inputs();
    let mut hw = adapter(RoomBus::new());

    sim::set_level(pins::FUEL_TRANSFER_BUTTON_GPIO, false);
    sim::set_level(pins::WHEELS_SENSOR_GPIO, true);
    let raw = hw.read_inputs();
    assert!(raw.transfer_button);
    assert!(!raw.reset_button);
    assert!(raw.wheels_sensor);

    release_inputs();
}

#[test]
fn patch_cable_maps_to_containers() {
    let _sim = sim_guard();
    release_inputs();
    let mut hw = adapter(RoomBus::new());
    let [p0, p1, p2] = pins::FUEL_PORT_GPIOS;

    sim::set_link(p1, p2, true);
    assert_eq!(hw.read_inputs().port_link, Some((1, 2)));
    sim::set_link(p1, p2, false);

    sim::set_link(p2, p0, true);
    assert_eq!(hw.read_inputs().port_link, Some((0, 2)));
    sim::set_link(p2, p0, false);

    assert_eq!(hw.read_inputs().port_link, None);
}

#[test]
fn keypad_scan_through_adapter() {
    let _sim = sim_guard();
    let mut bus = RoomBus::new();
    bus.hold('*');
    let mut hw = adapter(bus);
    assert_eq!(hw.read_inputs().key, Some('*'));

    hw.bus_mut().hold('0');
    assert_eq!(hw.read_inputs().key, Some('0'));

    hw.bus_mut().held = None;
    assert_eq!(hw.read_inputs().key, None);
}

#[test]
fn missing_keypad_reads_no_key() {
    let _sim = sim_guard();
    let mut bus = RoomBus::new();
    bus.keypad_present = false;
    bus.hold('1');
    let mut hw = adapter(bus);
    hw.bus_mut().keypad_present = true;
    assert_eq!(hw.read_inputs().key, None);
}

// ── Outputs ───────────────────────────────────────────────────

#[test]
fn relays_drive_their_pins() {
    let _sim = sim_guard();
    let mut hw = adapter(RoomBus::new());
    assert!(!sim::level(pins::FUEL_RELAY_GPIO));

    hw.set_relay(PuzzleId::Fuel, true);
    assert!(sim::level(pins::FUEL_RELAY_GPIO));
    assert!(hw.relay_energised(PuzzleId::Fuel));
    assert!(!sim::level(pins::WHEELS_RELAY_GPIO));

    hw.set_transfer_led(true);
    assert!(sim::level(pins::FUEL_TRANSFER_LED_GPIO));
    assert!(hw.transfer_led_on());

    hw.set_relay(PuzzleId::Fuel, false);
    hw.set_transfer_led(false);
    assert!(!sim::level(pins::FUEL_RELAY_GPIO));
    assert!(!sim::level(pins::FUEL_TRANSFER_LED_GPIO));
}

#[test]
fn clock_writes_digits_once_per_change() {
    let _sim = sim_guard();
    let mut hw = adapter(RoomBus::new());
    // Control register set at start-up.
    assert_eq!(hw.bus_mut().clock_writes.len(), 1);

    hw.show_clock(encode_mmss(900));
    hw.show_clock(encode_mmss(900));
    let digits: Vec<_> = hw.bus_mut().clock_writes[1..].to_vec();
    let expected = encode_mmss(900);
    assert_eq!(
        digits,
        vec![
            (0x34, expected[0]),
            (0x35, expected[1]),
            (0x36, expected[2]),
            (0x37, expected[3]),
        ]
    );
}

#[test]
fn failing_clock_is_left_alone() {
    let _sim = sim_guard();
    let mut bus = RoomBus::new();
    bus.clock_present = false;
    let mut hw = adapter(bus);

    hw.bus_mut().clock_present = true;
    hw.show_clock(encode_mmss(60));
    assert!(hw.bus_mut().clock_writes.is_empty());
}

#[test]
fn pixels_reach_the_strip() {
    let _sim = sim_guard();
    let mut hw = adapter(RoomBus::new());
    let mut frame = [(0, 0, 0); pins::PIXEL_COUNT];
    frame[3] = COLOUR_FUEL;
    hw.show_pixels(&frame);
    assert_eq!(hw.strip().writes(), 1);
    assert_eq!(hw.strip().last_frame(), Some(&frame));
}

// ── Whole loop on the simulated board ─────────────────────────

#[test]
fn keypad_start_and_wheels_on_simulated_board() {
    let _sim = sim_guard();
    release_inputs();
    let mut hw = adapter(RoomBus::new());
    let inbox = CommandInbox::new();
    let mut commands = &inbox;
    let mut sink = RecordingSink::default();
    let mut svc = GameService::new(GameConfig::default());
    svc.start(0, &mut sink);

    let mut now = 0;
    let mut run = |ms: u64, hw: &mut HardwareAdapter<RoomBus>, svc: &mut GameService| {
        let until = now + ms;
        while now < until {
            now += 10;
            svc.tick(now, hw, &mut commands, &mut sink);
        }
    };

    run(20, &mut hw, &mut svc);
    assert_eq!(hw.strip().last_frame().map(|f| f[pins::FUEL_LED_MAP[0]]), Some(COLOUR_FUEL));

    hw.bus_mut().hold('*');
    run(120, &mut hw, &mut svc);
    hw.bus_mut().held = None;
    run(120, &mut hw, &mut svc);
    assert_eq!(svc.stage(), Stage::Wheels);

    sim::set_level(pins::WHEELS_SENSOR_GPIO, true);
    run(20, &mut hw, &mut svc);
    assert_eq!(svc.stage(), Stage::Fuel);
    assert!(sim::level(pins::WHEELS_RELAY_GPIO));

    release_inputs();
    run(1_500, &mut hw, &mut svc);
    assert!(!sim::level(pins::WHEELS_RELAY_GPIO));
    assert!(sink.events.iter().any(|e| matches!(
        e,
        escaperoom::app::events::GameEvent::PuzzleSolved(PuzzleId::Wheels)
    )));
}
