//! Escape-room controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod countdown;
pub mod fsm;
pub mod inbox;
pub mod puzzles;

pub mod error;
pub mod pins;

// Hardware-facing layers; the ESP-IDF code inside is cfg-gated so the
// crate builds and tests on the host.
pub mod adapters;
pub mod drivers;
