//! Application core: pure game logic, zero I/O.
//!
//! This module contains the rules of the room: stage sequencing, remote
//! command dispatch, countdown publication, and input conditioning.
//! All interaction with hardware and the broker happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
