//! Actuation node: receives commands and drives the two indicator lines.

use std::process::ExitCode;

use button_relay::actuation;
use button_relay::config::{ActuatorArgs, ActuatorConfig};
use button_relay::device::IndicatorPair;
use button_relay::error::RelayError;
use button_relay::platform::Platform;
use clap::Parser;

fn run(config: &ActuatorConfig, platform: &mut Platform) -> Result<(), RelayError> {
    log::info!("Configuring indicator lines...");
    let mut provider = platform.line_provider(config.simulate)?;
    let mut outputs = IndicatorPair::claim(provider.as_mut(), config.line_a, config.line_b)?;

    match outputs.inspect() {
        Ok(state) => log::info!("Initial line state: {}", state),
        Err(e) => log::warn!("Could not read initial line state: {}", e),
    }

    let result = actuation::run(config, &mut outputs);
    outputs.release();
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

    let config = match ActuatorArgs::parse_from(platform.args("relay-actuator")).into_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Starting actuation node...");
    match run(&config, &mut platform) {
        Ok(()) => {
            log::info!("Actuation node finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Actuation node stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
