//! Command line / environment configuration for the two nodes.
//!
//! Argument structs are parsed by the binaries and converted into plain
//! config structs; the library itself never reads argv or the environment.

use std::time::Duration;

use clap::Parser;

use crate::error::RelayError;

pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 10;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_RECV_BUFFER: usize = 1024;

/// Sensing node: samples the button and serves commands to one peer.
#[derive(Parser, Debug, Clone)]
#[command(name = "relay-sensor", version)]
pub struct SensorArgs {
    /// Address to listen on
    #[arg(long, env = "RELAY_LISTEN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to listen on
    #[arg(long, env = "RELAY_PORT", default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// GPIO line the button is wired to (active low)
    #[arg(long, env = "RELAY_BUTTON_LINE", default_value_t = 17)]
    pub button_line: u32,

    /// Button sampling period in milliseconds
    #[arg(long, env = "RELAY_SAMPLE_PERIOD_MS", default_value_t = DEFAULT_SAMPLE_PERIOD_MS)]
    pub sample_period_ms: u64,

    /// Dead time after an accepted press in milliseconds
    #[arg(long, env = "RELAY_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Follow every command with a newline
    #[arg(long, env = "RELAY_NEWLINE")]
    pub newline: bool,

    /// Wait for a new peer after a send failure instead of exiting
    #[arg(long, env = "RELAY_RECONNECT", default_value_t = true, action = clap::ArgAction::Set)]
    pub reconnect: bool,

    /// Use in-memory GPIO lines
    #[arg(long, env = "RELAY_SIMULATE")]
    pub simulate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub host: String,
    pub port: u16,
    pub button_line: u32,
    pub sample_period: Duration,
    pub debounce: Duration,
    pub newline: bool,
    pub reconnect: bool,
    pub simulate: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            button_line: 17,
            sample_period: Duration::from_millis(DEFAULT_SAMPLE_PERIOD_MS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            newline: false,
            reconnect: true,
            simulate: false,
        }
    }
}

impl SensorArgs {
    pub fn into_config(self) -> Result<SensorConfig, RelayError> {
        if self.sample_period_ms == 0 {
            return Err(RelayError::Config("sample period must be non-zero".into()));
        }
        if self.debounce_ms == 0 {
            return Err(RelayError::Config("debounce must be non-zero".into()));
        }
        if self.host.is_empty() {
            return Err(RelayError::Config("listen host must not be empty".into()));
        }

        Ok(SensorConfig {
            host: self.host,
            port: self.port,
            button_line: self.button_line,
            sample_period: Duration::from_millis(self.sample_period_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            newline: self.newline,
            reconnect: self.reconnect,
            simulate: self.simulate,
        })
    }
}

/// Actuation node: receives commands and drives the two indicator lines.
#[derive(Parser, Debug, Clone)]
#[command(name = "relay-actuator", version)]
pub struct ActuatorArgs {
    /// Sensing node to connect to
    #[arg(long, env = "RELAY_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// TCP port of the sensing node
    #[arg(long, env = "RELAY_PORT", default_value_t = DEFAULT_PORT, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// GPIO line driven by the first command bit
    #[arg(long, env = "RELAY_LINE_A", default_value_t = 5)]
    pub line_a: u32,

    /// GPIO line driven by the second command bit
    #[arg(long, env = "RELAY_LINE_B", default_value_t = 6)]
    pub line_b: u32,

    /// Maximum bytes taken per receive
    #[arg(long, env = "RELAY_RECV_BUFFER", default_value_t = DEFAULT_RECV_BUFFER)]
    pub recv_buffer: usize,

    /// Give up on a silent peer after this many milliseconds
    #[arg(long, env = "RELAY_READ_TIMEOUT_MS")]
    pub read_timeout_ms: Option<u64>,

    /// Reconnect with backoff when the connection ends
    #[arg(long, env = "RELAY_RECONNECT")]
    pub reconnect: bool,

    /// Use in-memory GPIO lines
    #[arg(long, env = "RELAY_SIMULATE")]
    pub simulate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuatorConfig {
    pub host: String,
    pub port: u16,
    pub line_a: u32,
    pub line_b: u32,
    pub recv_buffer: usize,
    pub read_timeout: Option<Duration>,
    pub reconnect: bool,
    pub simulate: bool,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: DEFAULT_PORT,
            line_a: 5,
            line_b: 6,
            recv_buffer: DEFAULT_RECV_BUFFER,
            read_timeout: None,
            reconnect: false,
            simulate: false,
        }
    }
}

impl ActuatorArgs {
    pub fn into_config(self) -> Result<ActuatorConfig, RelayError> {
        if self.recv_buffer == 0 {
            return Err(RelayError::Config("receive buffer must be non-zero".into()));
        }
        if self.line_a == self.line_b {
            return Err(RelayError::Config(format!(
                "indicator lines must differ, both are {}",
                self.line_a
            )));
        }
        if self.read_timeout_ms == Some(0) {
            return Err(RelayError::Config("read timeout must be non-zero".into()));
        }
        if self.host.is_empty() {
            return Err(RelayError::Config("server host must not be empty".into()));
        }

        Ok(ActuatorConfig {
            host: self.host,
            port: self.port,
            line_a: self.line_a,
            line_b: self.line_b,
            recv_buffer: self.recv_buffer,
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
            reconnect: self.reconnect,
            simulate: self.simulate,
        })
    }
}
