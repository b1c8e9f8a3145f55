use std::thread;
use std::time::{Duration, Instant};

use crate::config::SensorConfig;
use crate::device::PushButton;
use crate::error::RelayError;
use crate::protocol::LogicalState;
use crate::sensing::edge_detector::EdgeDetector;
use crate::sensing::server::CommandServer;

/// The sensing node's single blocking loop: sample, detect, send, sleep.
pub struct SensingNode {
    button: PushButton,
    detector: EdgeDetector,
    server: CommandServer,
    sample_period: Duration,
    debounce: Duration,
    reconnect: bool,
    started: Instant,
}

impl SensingNode {
    pub fn new(button: PushButton, server: CommandServer, config: &SensorConfig) -> Self {
        Self {
            button,
            detector: EdgeDetector::new(config.debounce.as_millis() as u64),
            server,
            sample_period: config.sample_period,
            debounce: config.debounce,
            reconnect: config.reconnect,
            started: Instant::now(),
        }
    }

    pub fn detector(&self) -> &EdgeDetector {
        &self.detector
    }

    pub fn server(&self) -> &CommandServer {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut CommandServer {
        &mut self.server
    }

    /// Takes one button sample at `now_ms` and sends the resulting command,
    /// if any.
    ///
    /// A failed button read skips the sample. A failed send ends the session;
    /// it is only fatal when reconnecting is disabled.
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<LogicalState>, RelayError> {
        let pressed = match self.button.read_button() {
            Ok(pressed) => pressed,
            Err(e) => {
                log::warn!("Button read failed, sample skipped: {}", e);
                return Ok(None);
            }
        };

        let Some(state) = self.detector.observe(now_ms, pressed) else {
            return Ok(None);
        };

        match self.server.send(state) {
            Ok(command) => log::info!("Button pressed. Sent: {}", command),
            Err(e) if self.reconnect => {
                log::error!("Button pressed, {} not delivered: {}", state, e);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Some(state))
    }

    /// Runs until an unrecoverable error. Never returns `Ok`.
    pub fn run(&mut self) -> Result<(), RelayError> {
        loop {
            if !self.server.is_connected() {
                if let Err(e) = self.server.accept() {
                    if !self.reconnect {
                        return Err(e.into());
                    }
                    log::error!("{}", e);
                    thread::sleep(self.sample_period);
                    continue;
                }
            }

            let now_ms = self.started.elapsed().as_millis() as u64;
            if self.poll(now_ms)?.is_some() {
                thread::sleep(self.debounce);
            }
            thread::sleep(self.sample_period);
        }
    }

    /// Closes the connection and gives the button line back.
    pub fn shutdown(mut self) {
        self.server.disconnect();
        self.button.release();
    }
}
