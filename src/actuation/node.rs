use std::thread;

use crate::actuation::backoff::ReconnectBackoff;
use crate::actuation::client::{CommandClient, SessionEnd};
use crate::config::ActuatorConfig;
use crate::device::IndicatorPair;
use crate::error::RelayError;

/// Connects to the sensing node and applies its commands to `outputs`.
///
/// Without `reconnect` this serves exactly one session: a closed or failed
/// connection ends the node cleanly, a failed connect is an error. With
/// `reconnect` it never returns; connect failures and lost sessions are
/// retried with exponential backoff.
pub fn run(config: &ActuatorConfig, outputs: &mut IndicatorPair) -> Result<(), RelayError> {
    let mut backoff = ReconnectBackoff::new();

    loop {
        match CommandClient::connect(
            &config.host,
            config.port,
            config.recv_buffer,
            config.read_timeout,
        ) {
            Ok(mut client) => {
                backoff.reset();
                let end = client.run(outputs);
                log::info!(
                    "Session ended: {} applied, {} ignored",
                    client.applied(),
                    client.ignored()
                );
                if !config.reconnect {
                    if let SessionEnd::Failed(e) = end {
                        log::info!("Stopping after receive failure: {}", e);
                    }
                    return Ok(());
                }
            }
            Err(e) if config.reconnect => log::warn!("{}", e),
            Err(e) => return Err(e.into()),
        }

        let delay = backoff.next_delay();
        log::info!("Reconnecting in {}s", delay.as_secs());
        thread::sleep(delay);
    }
}
