//! MQTT transport adapter.
//!
//! Implements [`TransportPort`] over the ESP-IDF MQTT client.  The client
//! runs its own task; its callback only touches two things:
//!
//! - the shared `connected` flag, flipped on connect/disconnect events;
//! - the [`CommandInbox`], which receives every inbound payload.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: an in-memory loopback for host-side runs.  Inbound
//!   payloads can be injected with [`MqttTransport::inject`].

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use crate::app::ports::TransportPort;
use crate::error::CommsError;
use crate::inbox::CommandInbox;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

/// Default wait for the broker's CONNACK on each connection attempt.
pub const CONNECT_WAIT_MS: u32 = 5_000;
#[cfg(target_os = "espidf")]
const CONNECT_POLL_MS: u32 = 100;

pub struct MqttTransport {
    url: heapless::String<96>,
    client_id: heapless::String<32>,
    inbox: &'static CommandInbox,
    connected: Arc<AtomicBool>,
    connect_wait_ms: u32,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    published: Vec<(String, String)>,
    #[cfg(not(target_os = "espidf"))]
    subscriptions: Vec<String>,
}

impl MqttTransport {
    pub fn new(host: &str, port: u16, client_id: &str, inbox: &'static CommandInbox) -> Self {
        use core::fmt::Write;

        let mut url = heapless::String::new();
        if write!(url, "mqtt://{}:{}", host, port).is_err() {
            warn!("MQTT: broker URL truncated");
        }
        let mut id = heapless::String::new();
        for c in client_id.chars() {
            if id.push(c).is_err() {
                warn!("MQTT: client id '{}' truncated", client_id);
                break;
            }
        }
        Self {
            url,
            client_id: id,
            inbox,
            connected: Arc::new(AtomicBool::new(false)),
            connect_wait_ms: CONNECT_WAIT_MS,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            published: Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            subscriptions: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// How long `connect()` blocks waiting for the broker.  Set to zero once
    /// the loop is running: the client keeps reconnecting in the
    /// background and later attempts only check its state.
    pub fn set_connect_wait_ms(&mut self, ms: u32) {
        self.connect_wait_ms = ms;
    }

    pub fn connect_wait_ms(&self) -> u32 {
        self.connect_wait_ms
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.client.is_none() {
            let conf = MqttClientConfiguration {
                client_id: Some(self.client_id.as_str()),
                ..Default::default()
            };
            let connected = Arc::clone(&self.connected);
            let inbox = self.inbox;
            let client = EspMqttClient::new_cb(self.url.as_str(), &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                    EventPayload::Disconnected => connected.store(false, Ordering::Release),
                    EventPayload::Received { data, .. } => {
                        inbox.push(data);
                    }
                    _ => {}
                }
            })
            .map_err(|e| {
                warn!("MQTT: client init failed: {:?}", e);
                CommsError::BrokerConnectFailed
            })?;
            self.client = Some(client);
        }

        // The client reconnects on its own; wait for the CONNACK.
        let mut waited = 0;
        loop {
            if self.connected.load(Ordering::Acquire) {
                return Ok(());
            }
            if waited >= self.connect_wait_ms {
                return Err(CommsError::BrokerConnectFailed);
            }
            esp_idf_svc::hal::delay::FreeRtos::delay_ms(CONNECT_POLL_MS);
            waited += CONNECT_POLL_MS;
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::SubscribeFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::NotConnected)?;
        client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|_| CommsError::PublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

// ── Host loopback helpers ─────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl MqttTransport {
    /// Deliver a payload as if it arrived on a subscribed topic.
    pub fn inject(&self, payload: &[u8]) -> bool {
        if !self.connected.load(Ordering::Acquire) {
            return false;
        }
        self.inbox.push(payload)
    }

    /// Simulate the broker dropping the session.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Simulate the client's own background reconnect.
    pub fn restore_connection(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub fn published(&self) -> &[(String, String)] {
        &self.published
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }
}

// ───────────────────────────────────────────────────────────────
// TransportPort
// ───────────────────────────────────────────────────────────────

impl TransportPort for MqttTransport {
    fn connect(&mut self) -> Result<(), CommsError> {
        if self.is_connected() {
            return Ok(());
        }
        info!("MQTT: connecting to {} as '{}'", self.url, self.client_id);
        self.platform_connect()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::NotConnected);
        }
        self.platform_subscribe(topic)
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::NotConnected);
        }
        self.platform_publish(topic, payload)
    }
}
