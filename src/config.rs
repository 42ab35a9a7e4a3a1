//! Game configuration parameters
//!
//! All tunable parameters for the room: countdown, input timing, actuator
//! pulse shape, the fuel and passcode puzzles, and the network link.
//! Defaults match the installed room; a JSON override can be compiled in.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of fuel containers on the puzzle board.
pub const FUEL_CONTAINERS: usize = 3;

/// Compartment relay pulse shape, in milliseconds after `open()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPulseConfig {
    /// Relay HIGH until this offset.
    pub first_high_until_ms: u32,
    /// Relay LOW until this offset.
    pub low_until_ms: u32,
    /// Relay HIGH again until this offset, then idle.
    pub second_high_until_ms: u32,
}

impl Default for RelayPulseConfig {
    fn default() -> Self {
        Self {
            first_high_until_ms: 500,
            low_until_ms: 700,
            second_high_until_ms: 1200,
        }
    }
}

/// Fuel (liquid transfer) puzzle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelConfig {
    /// Capacity of each container, in units.
    pub capacities: [u8; FUEL_CONTAINERS],
    /// Volumes after a reset.
    pub start: [u8; FUEL_CONTAINERS],
    /// Volume that solves the puzzle when held by any container.
    pub target: u8,
    /// One unit moves per interval while a transfer runs.
    pub transfer_interval_ms: u32,
    /// Ordered `(from, to)` pours performed by the hint.
    pub hint_pours: [(u8, u8); 2],
    /// Green blink cycles on the solving container.
    pub solved_blink_count: u8,
    pub solved_blink_interval_ms: u32,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacities: [8, 5, 3],
            start: [8, 0, 0],
            target: 4,
            transfer_interval_ms: 500,
            hint_pours: [(0, 1), (1, 2)],
            solved_blink_count: 10,
            solved_blink_interval_ms: 100,
        }
    }
}

/// Passcode (stars) puzzle and keypad feedback parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarsConfig {
    pub passcode: heapless::String<8>,
    /// Blink cycles of the correct/incorrect feedback.
    pub feedback_blink_count: u8,
    pub feedback_blink_interval_ms: u32,
    /// Step period of the ambient star twinkle.
    pub twinkle_interval_ms: u32,
    /// Twinkle steps before the pause beat.
    pub twinkle_steps: u8,
}

impl Default for StarsConfig {
    fn default() -> Self {
        let mut passcode = heapless::String::new();
        let _ = passcode.push_str("7031");
        Self {
            passcode,
            feedback_blink_count: 5,
            feedback_blink_interval_ms: 100,
            twinkle_interval_ms: 1000,
            twinkle_steps: 8,
        }
    }
}

/// Wi-Fi and MQTT broker parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub broker_host: heapless::String<64>,
    pub broker_port: u16,
    /// Prefix of the MQTT client id; the device id is appended.
    pub client_id_prefix: heapless::String<16>,
    /// Subscribed: remote administrative commands.
    pub control_topic: heapless::String<32>,
    /// Published: solve notifications and reset broadcasts.
    pub status_topic: heapless::String<32>,
    /// Published: remaining time as `MM:SS`.
    pub timer_topic: heapless::String<32>,
    /// Published once per game: completion time as `MM:SS`.
    pub finish_topic: heapless::String<32>,
    /// Broker connection attempts at boot before running offline.
    pub connect_attempts: u8,
    /// Delay between background reconnect attempts while offline.
    pub reconnect_interval_ms: u32,
}

fn hs<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: hs("EscapeRoom"),
            wifi_password: heapless::String::new(),
            broker_host: hs("192.168.39.237"),
            broker_port: 1883,
            client_id_prefix: hs("ESP32Client"),
            control_topic: hs("admin"),
            status_topic: hs("esp"),
            timer_topic: hs("esp_timer"),
            finish_topic: hs("esp_timer"),
            connect_attempts: 3,
            reconnect_interval_ms: 30_000,
        }
    }
}

/// Core game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    // --- Countdown ---
    /// Game length in seconds when the countdown is armed.
    pub game_duration_secs: u32,
    /// Amount added/removed by `add_min` / `sub_min`.
    pub duration_step_secs: u32,
    /// Minimum interval between remaining-time publications.
    pub timer_publish_interval_ms: u32,

    // --- Inputs ---
    /// Quiet window of every debounced input.
    pub debounce_ms: u32,
    /// Control loop period.
    pub tick_interval_ms: u32,

    // --- Puzzles ---
    pub relay_pulse: RelayPulseConfig,
    pub fuel: FuelConfig,
    pub stars: StarsConfig,

    // --- Network ---
    pub network: NetworkConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_duration_secs: 15 * 60,
            duration_step_secs: 60,
            timer_publish_interval_ms: 500,

            debounce_ms: 50,
            tick_interval_ms: 10,

            relay_pulse: RelayPulseConfig::default(),
            fuel: FuelConfig::default(),
            stars: StarsConfig::default(),

            network: NetworkConfig::default(),
        }
    }
}

impl GameConfig {
    /// The configuration baked in at build time from `ESCAPE_ROOM_CONFIG`,
    /// or the defaults when unset or invalid.
    pub fn compiled() -> Self {
        Self::resolve(option_env!("ESCAPE_ROOM_CONFIG"))
    }

    fn resolve(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => {
                info!("Config: using compiled-in override");
                config
            }
            Err(e) => {
                warn!("Config: override rejected ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Parse a JSON override and validate it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the puzzles cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.game_duration_secs == 0 || self.game_duration_secs > 99 * 60 + 59 {
            return Err(Error::Config("game duration must fit MM:SS"));
        }
        if self.debounce_ms == 0 || self.tick_interval_ms == 0 {
            return Err(Error::Config("debounce and tick intervals must be non-zero"));
        }

        let p = &self.relay_pulse;
        if !(p.first_high_until_ms < p.low_until_ms && p.low_until_ms < p.second_high_until_ms) {
            return Err(Error::Config("relay pulse phases must be increasing"));
        }

        let f = &self.fuel;
        if f.capacities.contains(&0) {
            return Err(Error::Config("fuel capacities must be non-zero"));
        }
        if f.start.iter().zip(&f.capacities).any(|(v, c)| v > c) {
            return Err(Error::Config("fuel start volume exceeds capacity"));
        }
        if f.target == 0 || !f.capacities.iter().any(|&c| c >= f.target) {
            return Err(Error::Config("fuel target unreachable"));
        }
        let total_leds: usize = f.capacities.iter().map(|&c| c as usize).sum();
        if total_leds != crate::pins::FUEL_LED_MAP.len() {
            return Err(Error::Config("fuel capacities must match the level LEDs"));
        }
        for &(from, to) in &f.hint_pours {
            if from == to || from as usize >= FUEL_CONTAINERS || to as usize >= FUEL_CONTAINERS {
                return Err(Error::Config("invalid fuel hint pour"));
            }
        }

        let s = &self.stars;
        if s.passcode.is_empty()
            || s.passcode.len() > crate::pins::STAR_PROGRESS_LEDS.len()
            || !s.passcode.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::Config("passcode must be 1-4 digits"));
        }

        let n = &self.network;
        if n.connect_attempts == 0 {
            return Err(Error::Config("at least one broker connect attempt required"));
        }
        if n.control_topic.is_empty()
            || n.status_topic.is_empty()
            || n.timer_topic.is_empty()
            || n.finish_topic.is_empty()
        {
            return Err(Error::Config("MQTT topics must be non-empty"));
        }
        Ok(())
    }
}
