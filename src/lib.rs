//! # button-relay
//!
//! Mirrors a push-button on one board onto two indicator lines on another,
//! over a single TCP connection.
//!
//! - [`sensing`]: samples the button, debounces falling edges, cycles through
//!   the four states `00 → 01 → 10 → 11` and sends each as a 2-byte command.
//! - [`actuation`]: receives commands, validates them and drives the lines.
//! - [`protocol`]: the wire codec and the framer shared by both sides.
//! - [`device`] / [`interfaces`]: exclusive line claims over ESP-IDF, Linux
//!   sysfs or an in-memory bank.
//! - [`platform`]: network bring-up and argument source per target.
//!
//! Each node runs one blocking loop on one thread.

pub mod actuation;
pub mod config;
pub mod device;
pub mod error;
pub mod interfaces;
pub mod logging;
pub mod platform;
pub mod protocol;
pub mod sensing;

pub use error::{ConnectionError, HardwareError, InvalidCommand, RelayError};
pub use protocol::{decode, encode, LogicalState, WireCommand};
