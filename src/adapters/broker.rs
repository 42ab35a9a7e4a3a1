//! Broker link: connection policy and event publication over a
//! [`TransportPort`].
//!
//! ## Connection policy
//!
//! - At boot: up to `connect_attempts` tries, back to back.  On success the
//!   control topic is subscribed and the room announces itself
//!   (`global_reset` on the status topic, the full duration on the timer
//!   topic).  On failure the room runs offline.
//! - While offline: one attempt every `reconnect_interval_ms`.  A reconnect
//!   re-subscribes but does not re-announce, so a running game elsewhere in
//!   the building is left alone.
//!
//! ## Event mapping
//!
//! | Event                              | Topic   | Payload            |
//! |------------------------------------|---------|--------------------|
//! | `PuzzleSolved(p)`                  | status  | `<p>_solved`       |
//! | `GlobalReset { announce: true }`   | status  | `global_reset`     |
//! | `TimerUpdate { remaining_secs }`   | timer   | `MM:SS`            |
//! | `GameCompleted { elapsed_secs }`   | finish  | `MM:SS`            |
//!
//! Everything else stays local.  Publications while offline are dropped.

use log::{info, warn};

use crate::app::events::GameEvent;
use crate::app::ports::{EventSink, TransportPort};
use crate::config::NetworkConfig;
use crate::countdown::format_mmss;
use crate::error::CommsError;

/// Payload broadcast on the status topic when the room resets.
pub const GLOBAL_RESET_TOKEN: &str = "global_reset";

type Topic = heapless::String<32>;

/// Outcome of a [`BrokerLink::poll`] that changed the link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    Connected,
    Lost,
}

pub struct BrokerLink<T> {
    transport: T,
    control_topic: Topic,
    status_topic: Topic,
    timer_topic: Topic,
    finish_topic: Topic,
    connect_attempts: u8,
    reconnect_interval_ms: u64,
    last_attempt_ms: Option<u64>,
    online: bool,
    dropped: u32,
}

impl<T: TransportPort> BrokerLink<T> {
    pub fn new(transport: T, net: &NetworkConfig) -> Self {
        Self {
            transport,
            control_topic: net.control_topic.clone(),
            status_topic: net.status_topic.clone(),
            timer_topic: net.timer_topic.clone(),
            finish_topic: net.finish_topic.clone(),
            connect_attempts: net.connect_attempts.max(1),
            reconnect_interval_ms: u64::from(net.reconnect_interval_ms),
            last_attempt_ms: None,
            online: false,
            dropped: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot-time connection with bounded retries.  Returns whether the
    /// link came up.
    pub fn connect(&mut self, now_ms: u64) -> bool {
        for attempt in 1..=self.connect_attempts {
            info!("Broker: connection attempt {}/{}", attempt, self.connect_attempts);
            if self.attempt(now_ms).is_ok() {
                return true;
            }
        }
        warn!("Broker: unreachable after {} attempts, running offline", self.connect_attempts);
        false
    }

    /// Tell the rest of the room this controller (re)started.
    pub fn announce(&mut self, duration_secs: u32) {
        let status = self.status_topic.clone();
        let timer = self.timer_topic.clone();
        self.publish(&status, GLOBAL_RESET_TOKEN);
        self.publish(&timer, &format_mmss(duration_secs));
    }

    /// Detect a dropped connection and retry on the reconnect cadence, or
    /// straight away once the transport reports it is connected again.
    pub fn poll(&mut self, now_ms: u64) -> Option<LinkChange> {
        if self.online {
            if self.transport.is_connected() {
                return None;
            }
            warn!("Broker: connection lost");
            self.online = false;
            self.last_attempt_ms = Some(now_ms);
            return Some(LinkChange::Lost);
        }

        // The client reconnects in the background; once it is back the
        // control topic must be re-subscribed without waiting out the interval.
        let recovered = self.transport.is_connected();
        let due = recovered
            || self
                .last_attempt_ms
                .is_none_or(|last| now_ms.saturating_sub(last) >= self.reconnect_interval_ms);
        if !due {
            return None;
        }
        match self.attempt(now_ms) {
            Ok(()) => {
                info!("Broker: reconnected");
                Some(LinkChange::Connected)
            }
            Err(_) => None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Publications dropped while offline or by a failing transport.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Internal ──────────────────────────────────────────────

    fn attempt(&mut self, now_ms: u64) -> Result<(), CommsError> {
        self.last_attempt_ms = Some(now_ms);
        let result = self
            .transport
            .connect()
            .and_then(|()| self.transport.subscribe(&self.control_topic));
        match result {
            Ok(()) => {
                info!("Broker: connected, subscribed to '{}'", self.control_topic);
                self.online = true;
            }
            Err(e) => {
                warn!("Broker: {}", e);
                self.online = false;
            }
        }
        result
    }

    fn publish(&mut self, topic: &str, payload: &str) {
        if !self.online {
            self.dropped = self.dropped.wrapping_add(1);
            return;
        }
        if let Err(e) = self.transport.publish(topic, payload) {
            warn!("Broker: publish to '{}' failed: {}", topic, e);
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// EventSink
// ───────────────────────────────────────────────────────────────

impl<T: TransportPort> EventSink for BrokerLink<T> {
    fn emit(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::PuzzleSolved(id) => {
                let topic = self.status_topic.clone();
                self.publish(&topic, id.solved_token());
            }
            GameEvent::GlobalReset { announce: true } => {
                let topic = self.status_topic.clone();
                self.publish(&topic, GLOBAL_RESET_TOKEN);
            }
            GameEvent::TimerUpdate { remaining_secs } => {
                let topic = self.timer_topic.clone();
                self.publish(&topic, &format_mmss(remaining_secs));
            }
            GameEvent::GameCompleted { elapsed_secs } => {
                let topic = self.finish_topic.clone();
                self.publish(&topic, &format_mmss(elapsed_secs));
            }
            GameEvent::Started(_)
            | GameEvent::StageChanged { .. }
            | GameEvent::GlobalReset { announce: false }
            | GameEvent::CompartmentOpened(_) => {}
        }
    }
}
