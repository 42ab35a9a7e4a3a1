//! Mock hardware adapter and room harness for integration tests.
//!
//! `MockHardware` serves scripted raw inputs and records every output
//! write so tests can assert on relays, LEDs and the clock without
//! touching real GPIO.  `Room` wires it to a `GameService`, a command
//! inbox and the host MQTT loopback, and advances time in control ticks.

use escaperoom::adapters::broker::{BrokerLink, LinkChange};
use escaperoom::adapters::mqtt::MqttTransport;
use escaperoom::app::events::GameEvent;
use escaperoom::app::ports::{EventSink, InputPort, OutputPort};
use escaperoom::app::service::GameService;
use escaperoom::config::GameConfig;
use escaperoom::drivers::led_patterns::Rgb;
use escaperoom::fsm::Stage;
use escaperoom::fsm::context::RawInputs;
use escaperoom::inbox::CommandInbox;
use escaperoom::pins::PIXEL_COUNT;
use escaperoom::puzzles::PuzzleId;

/// Control loop period used by the harness.
pub const TICK_MS: u64 = 10;

/// Long enough for any debounced input to be evaluated at least once.
pub const HOLD_MS: u64 = 120;

/// A compartment release is a double pulse; rising edges closer together
/// than this belong to the same release.
pub const RELEASE_WINDOW_MS: u64 = 1_200;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCall {
    Relay { puzzle: PuzzleId, energised: bool },
    TransferLed(bool),
}

pub struct MockHardware {
    pub inputs: RawInputs,
    pub calls: Vec<OutputCall>,
    pub relays: [bool; PuzzleId::COUNT],
    pub transfer_led: bool,
    pub pixels: [Rgb; PIXEL_COUNT],
    pub pixel_writes: u32,
    pub clock: [u8; 4],
    /// Harness time, set by `Room` before every tick.
    pub now: u64,
    /// Relay rising edges with their time.
    pub rises: Vec<(PuzzleId, u64)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            inputs: RawInputs::default(),
            calls: Vec::new(),
            relays: [false; PuzzleId::COUNT],
            transfer_led: false,
            pixels: [(0, 0, 0); PIXEL_COUNT],
            pixel_writes: 0,
            clock: [0; 4],
            now: 0,
            rises: Vec::new(),
        }
    }

    /// Compartments released, in order, folding each double pulse into one.
    pub fn releases(&self) -> Vec<PuzzleId> {
        let mut last: [Option<u64>; PuzzleId::COUNT] = [None; PuzzleId::COUNT];
        let mut out = Vec::new();
        for &(puzzle, at) in &self.rises {
            let slot = &mut last[puzzle.index()];
            if slot.is_none_or(|prev| at - prev >= RELEASE_WINDOW_MS) {
                *slot = Some(at);
                out.push(puzzle);
            }
        }
        out
    }

    /// Number of times a compartment was released.
    pub fn release_count(&self, puzzle: PuzzleId) -> usize {
        self.releases().into_iter().filter(|&p| p == puzzle).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self) -> RawInputs {
        self.inputs
    }
}

impl OutputPort for MockHardware {
    fn set_relay(&mut self, puzzle: PuzzleId, energised: bool) {
        if self.relays[puzzle.index()] != energised {
            self.relays[puzzle.index()] = energised;
            self.calls.push(OutputCall::Relay { puzzle, energised });
            if energised {
                self.rises.push((puzzle, self.now));
            }
        }
    }

    fn set_transfer_led(&mut self, on: bool) {
        if self.transfer_led != on {
            self.transfer_led = on;
            self.calls.push(OutputCall::TransferLed(on));
        }
    }

    fn show_pixels(&mut self, pixels: &[Rgb; PIXEL_COUNT]) {
        self.pixels = *pixels;
        self.pixel_writes += 1;
    }

    fn show_clock(&mut self, segments: [u8; 4]) {
        self.clock = segments;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<GameEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn contains(&self, event: &GameEvent) -> bool {
        self.events.contains(event)
    }

    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &GameEvent) {
        self.events.push(*event);
    }
}

// ── Room harness ──────────────────────────────────────────────

pub struct Room {
    pub svc: GameService,
    pub hw: MockHardware,
    pub inbox: &'static CommandInbox,
    pub log: RecordingSink,
    pub broker: BrokerLink<MqttTransport>,
    pub now: u64,
}

#[allow(dead_code)]
impl Room {
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Boot a room the way `main` does, with the broker online.
    pub fn with_config(config: GameConfig) -> Self {
        let inbox: &'static CommandInbox = Box::leak(Box::new(CommandInbox::new()));
        let transport = MqttTransport::new("localhost", 1883, "test-room", inbox);
        let mut broker = BrokerLink::new(transport, &config.network);
        let online = broker.connect(0);
        if online {
            broker.announce(config.game_duration_secs);
        }

        let mut log = RecordingSink::default();
        let mut svc = GameService::new(config);
        svc.start(0, &mut (&mut log, &mut broker));
        svc.signal_link(online);

        Self {
            svc,
            hw: MockHardware::new(),
            inbox,
            log,
            broker,
            now: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.svc.stage()
    }

    pub fn tick(&mut self) {
        self.now += TICK_MS;
        self.hw.now = self.now;
        let mut commands = self.inbox;
        let mut sinks = (&mut self.log, &mut self.broker);
        self.svc.tick(self.now, &mut self.hw, &mut commands, &mut sinks);
    }

    pub fn run_for(&mut self, ms: u64) {
        let until = self.now + ms;
        while self.now < until {
            self.tick();
        }
    }

    /// One broker supervision step, wired the way the firmware loop does it.
    pub fn poll_broker(&mut self) -> Option<LinkChange> {
        let change = self.broker.poll(self.now);
        if let Some(change) = change {
            self.svc.signal_link(change == LinkChange::Connected);
        }
        change
    }

    /// Queue a control-topic payload and run one tick to apply it.
    pub fn command(&mut self, payload: &str) {
        assert!(self.inbox.push(payload.as_bytes()), "inbox rejected {payload:?}");
        self.tick();
    }

    pub fn press_key(&mut self, key: char) {
        self.hw.inputs.key = Some(key);
        self.run_for(HOLD_MS);
        self.hw.inputs.key = None;
        self.run_for(HOLD_MS);
    }

    pub fn type_keys(&mut self, keys: &str) {
        for key in keys.chars() {
            self.press_key(key);
        }
    }

    pub fn press_transfer(&mut self) {
        self.hw.inputs.transfer_button = true;
        self.run_for(HOLD_MS);
        self.hw.inputs.transfer_button = false;
        self.run_for(HOLD_MS);
    }

    pub fn press_fuel_reset(&mut self) {
        self.hw.inputs.reset_button = true;
        self.run_for(HOLD_MS);
        self.hw.inputs.reset_button = false;
        self.run_for(HOLD_MS);
    }

    /// Patch `from → to`, press transfer, and wait for the pour to finish.
    pub fn pour(&mut self, from: usize, to: usize) {
        self.hw.inputs.port_link = Some((from, to));
        self.tick();
        self.press_transfer();
        self.run_for(3_000);
        self.hw.inputs.port_link = None;
        self.tick();
    }

    pub fn fuel_volumes(&self) -> [u8; 3] {
        self.svc
            .puzzle(PuzzleId::Fuel)
            .as_fuel()
            .map(|f| f.volumes())
            .unwrap_or_default()
    }

    /// Everything the broker transport published, as `(topic, payload)`.
    pub fn published(&self) -> Vec<(&str, &str)> {
        self.broker
            .transport()
            .published()
            .iter()
            .map(|(t, p)| (t.as_str(), p.as_str()))
            .collect()
    }

    /// Play through wheels (remote-free) and land in the fuel stage.
    pub fn start_and_solve_wheels(&mut self) {
        self.press_key('*');
        assert_eq!(self.stage(), Stage::Wheels);
        self.hw.inputs.wheels_sensor = true;
        self.tick();
        self.hw.inputs.wheels_sensor = false;
        assert_eq!(self.stage(), Stage::Fuel);
    }

    /// The shortest pour sequence for capacities 8/5/3 to reach 4.
    pub fn solve_fuel(&mut self) {
        for (from, to) in [(0, 1), (1, 2), (2, 0), (1, 2), (0, 1), (1, 2)] {
            self.pour(from, to);
        }
        self.run_for(3_000);
    }
}
