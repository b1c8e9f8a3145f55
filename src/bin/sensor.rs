//! Sensing node: watches the button and sends one command per press.

use std::process::ExitCode;

use button_relay::config::{SensorArgs, SensorConfig};
use button_relay::device::PushButton;
use button_relay::error::RelayError;
use button_relay::platform::Platform;
use button_relay::sensing::{CommandServer, SensingNode};
use clap::Parser;

fn run(config: &SensorConfig, platform: &mut Platform) -> Result<(), RelayError> {
    log::info!("Configuring button line...");
    let mut provider = platform.line_provider(config.simulate)?;
    let button = PushButton::claim(provider.as_mut(), config.button_line)?;

    let server = CommandServer::bind(&config.host, config.port, config.newline)?;

    log::info!(
        "Sampling every {}ms, debounce {}ms",
        config.sample_period.as_millis(),
        config.debounce.as_millis()
    );
    let mut node = SensingNode::new(button, server, config);
    let result = node.run();
    node.shutdown();
    result
}

fn main() -> ExitCode {
    button_relay::logging::init();

    let mut platform = match Platform::start() {
        Ok(platform) => platform,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match SensorArgs::parse_from(platform.args("relay-sensor")).into_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Starting sensing node...");
    match run(&config, &mut platform) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Sensing node stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
