//! Inbound command queue between the broker callback and the control loop.
//!
//! On target the MQTT client invokes its callback on its own task.  The
//! callback only pushes the raw payload here; the control loop drains the
//! queue at the start of every tick, so command handlers always run on the
//! loop's thread.
//!
//! ```text
//! ┌─────────────┐  CommandText  ┌──────────────┐
//! │ MQTT task   │──────────────▶│ Control loop │
//! └─────────────┘               └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::CommandSource;

/// Longest accepted command payload.
pub const COMMAND_MAX_LEN: usize = 64;

/// Queue depth; bursts beyond this are dropped.
pub const INBOX_DEPTH: usize = 8;

pub type CommandText = heapless::String<COMMAND_MAX_LEN>;

pub struct CommandInbox {
    channel: Channel<CriticalSectionRawMutex, CommandText, INBOX_DEPTH>,
}

impl Default for CommandInbox {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandInbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queue a raw payload.  Non-UTF-8, oversized, or overflowing payloads
    /// are dropped; returns whether the payload was queued.
    pub fn push(&self, payload: &[u8]) -> bool {
        let Ok(text) = core::str::from_utf8(payload) else {
            warn!("Inbox: dropping non-UTF-8 payload ({} bytes)", payload.len());
            return false;
        };
        let mut cmd = CommandText::new();
        if cmd.push_str(text.trim()).is_err() {
            warn!("Inbox: dropping oversized payload ({} bytes)", payload.len());
            return false;
        }
        if self.channel.try_send(cmd).is_err() {
            warn!("Inbox: queue full, dropping command");
            return false;
        }
        true
    }

    pub fn pop(&self) -> Option<CommandText> {
        self.channel.try_receive().ok()
    }
}

impl CommandSource for &CommandInbox {
    fn next_command(&mut self) -> Option<CommandText> {
        self.pop()
    }
}
