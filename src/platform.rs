//! What a node takes from the platform before its loop starts: where its
//! arguments come from, the network, and the GPIO backend.
//!
//! On hosted Linux the OS has already brought the network up and arguments
//! come from argv and the environment. On ESP-IDF there is neither, so
//! [`Platform::start`] joins Wi-Fi and reads the arguments from NVS.

use std::ffi::OsString;

use crate::device::LineProvider;
use crate::error::{HardwareError, RelayError};
use crate::interfaces::sim_pin::SimulatedBank;

/// Builds a command line for `bin` out of whitespace separated settings.
pub fn settings_args(bin: &str, settings: &str) -> Vec<OsString> {
    std::iter::once(bin)
        .chain(settings.split_whitespace())
        .map(OsString::from)
        .collect()
}

pub struct Platform {
    #[cfg(target_os = "espidf")]
    board: crate::interfaces::station::Board,
}

impl Platform {
    #[cfg(target_os = "espidf")]
    pub fn start() -> Result<Self, RelayError> {
        Ok(Self {
            board: crate::interfaces::station::Board::start()?,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn start() -> Result<Self, RelayError> {
        Ok(Self {})
    }

    /// Arguments to parse for the node binary `bin`.
    #[cfg(target_os = "espidf")]
    pub fn args(&self, bin: &str) -> Vec<OsString> {
        settings_args(bin, self.board.settings())
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn args(&self, _bin: &str) -> Vec<OsString> {
        std::env::args_os().collect()
    }

    /// Opens the GPIO backend of this platform, or the in-memory bank when
    /// `simulate` is set.
    pub fn line_provider(&mut self, simulate: bool) -> Result<Box<dyn LineProvider>, HardwareError> {
        if simulate {
            log::warn!("Using simulated GPIO lines; nothing physical will change");
            return Ok(Box::new(SimulatedBank::new()));
        }
        self.native_provider()
    }

    #[cfg(target_os = "espidf")]
    fn native_provider(&mut self) -> Result<Box<dyn LineProvider>, HardwareError> {
        let pins = self.board.take_pins().ok_or_else(|| HardwareError::Driver {
            line: 0,
            reason: "GPIO pins already handed out".into(),
        })?;
        Ok(Box::new(crate::interfaces::digital_pin::EspLineProvider::new(pins)))
    }

    #[cfg(target_os = "linux")]
    fn native_provider(&mut self) -> Result<Box<dyn LineProvider>, HardwareError> {
        Ok(Box::new(crate::interfaces::sysfs_pin::SysfsLineProvider::new()))
    }

    #[cfg(not(any(target_os = "espidf", target_os = "linux")))]
    fn native_provider(&mut self) -> Result<Box<dyn LineProvider>, HardwareError> {
        log::warn!("No GPIO backend for this platform; falling back to simulated lines");
        Ok(Box::new(SimulatedBank::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActuatorArgs;
    use clap::Parser;

    #[test]
    fn stored_settings_parse_as_arguments() {
        let args = settings_args("relay-actuator", " --host 192.168.0.197\n--line-a 23 ");
        assert_eq!(args[0], "relay-actuator");

        let config = ActuatorArgs::try_parse_from(args)
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.host, "192.168.0.197");
        assert_eq!(config.line_a, 23);
    }

    #[test]
    fn empty_settings_give_defaults() {
        assert_eq!(settings_args("relay-sensor", ""), vec![OsString::from("relay-sensor")]);
    }

    #[test]
    fn simulate_gives_in_memory_lines() {
        let mut platform = Platform::start().unwrap();
        let mut provider = platform.line_provider(true).unwrap();
        let mut out = provider.claim_output(5).unwrap();
        out.set_high().unwrap();
        assert!(out.is_high().unwrap());
    }
}
