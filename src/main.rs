//! Escape-room controller firmware: main entry point.
//!
//! Hexagonal architecture around a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink      BrokerLink<Mqtt>     │
//! │  (Input + Output)       (EventSink)       (EventSink)          │
//! │  WifiAdapter            CommandInbox ◀─── MQTT callback task   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              GameService (pure logic)                  │    │
//! │  │  Stage FSM · Puzzles · Countdown                       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Watchdog fed every tick                                       │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::TxRmtDriver;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use escaperoom::adapters::broker::{BrokerLink, LinkChange};
use escaperoom::adapters::device_id;
use escaperoom::adapters::hardware::HardwareAdapter;
use escaperoom::adapters::log_sink::LogEventSink;
use escaperoom::adapters::mqtt::MqttTransport;
use escaperoom::adapters::time::Esp32TimeAdapter;
use escaperoom::adapters::wifi::{ConnectivityPort, WifiAdapter};
use escaperoom::app::service::GameService;
use escaperoom::config::GameConfig;
use escaperoom::drivers::hw_init;
use escaperoom::drivers::pixels::PixelStrip;
use escaperoom::drivers::watchdog::{Watchdog, WATCHDOG_TIMEOUT_MS};
use escaperoom::inbox::CommandInbox;
use escaperoom::pins;

/// Filled by the MQTT task, drained by the control loop.
static INBOX: CommandInbox = CommandInbox::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Escape room v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = GameConfig::compiled();
    let clock = Esp32TimeAdapter::new();

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;

    // Pin numbers mirror `pins::I2C_SDA_GPIO` / `I2C_SCL_GPIO` / `PIXEL_DATA_GPIO`.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ)),
    )?;
    let tx = TxRmtDriver::new(
        peripherals.rmt.channel0,
        peripherals.pins.gpio33,
        &TransmitConfig::new().clock_divider(1),
    )?;
    let mut hw = HardwareAdapter::new(i2c, PixelStrip::new(tx));

    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 3. Game service ───────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut svc = GameService::new(config.clone());
    svc.start(clock.uptime_ms(), &mut log_sink);

    // ── 4. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::new();
    wifi.attach(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    let net = &config.network;
    match wifi.set_credentials(&net.wifi_ssid, &net.wifi_password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi: {}, continuing offline", e);
            }
        }
        Err(e) => warn!("WiFi: {}, continuing offline", e),
    }

    let client_id = device_id::client_id(&net.client_id_prefix, &device_id::read_mac());
    info!("MQTT client id: {}", client_id);
    let transport = MqttTransport::new(&net.broker_host, net.broker_port, &client_id, &INBOX);
    let mut broker = BrokerLink::new(transport, net);

    let online = broker.connect(clock.uptime_ms());
    if online {
        broker.announce(config.game_duration_secs);
    }
    svc.signal_link(online);
    // From here on the client reconnects in the background; never block the loop.
    broker.transport_mut().set_connect_wait_ms(0);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let tick = Duration::from_millis(u64::from(config.tick_interval_ms));
    let reconnect_interval = u64::from(net.reconnect_interval_ms);
    let mut last_wifi_poll = 0u64;
    let mut commands = &INBOX;

    loop {
        let now_ms = clock.uptime_ms();

        if now_ms.saturating_sub(last_wifi_poll) >= reconnect_interval {
            last_wifi_poll = now_ms;
            wifi.poll();
        }
        if let Some(change) = broker.poll(now_ms) {
            svc.signal_link(change == LinkChange::Connected);
        }

        let mut sinks = (&mut log_sink, &mut broker);
        svc.tick(now_ms, &mut hw, &mut commands, &mut sinks);

        watchdog.feed();
        std::thread::sleep(tick);
    }
}
