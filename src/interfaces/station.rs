//! ESP-IDF bring-up: the Wi-Fi station and the settings kept in NVS.
//!
//! Settings live in the `relay` NVS namespace:
//! - `wifi_ssid`, `wifi_pass`: station credentials
//! - `args`: node arguments, whitespace separated (`--host 192.168.0.197 --port 7000`)
//!
//! A key missing from NVS falls back to `RELAY_WIFI_SSID`, `RELAY_WIFI_PASS`
//! or `RELAY_ARGS` from the build environment.

use esp_idf_hal::gpio::Pins;
use esp_idf_hal::modem::Modem;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::EspError;

use crate::error::RelayError;

pub const NVS_NAMESPACE: &str = "relay";

const SSID_KEY: &str = "wifi_ssid";
const PASS_KEY: &str = "wifi_pass";
const ARGS_KEY: &str = "args";

// Longest value read back from NVS, terminator included.
const SETTING_MAX_LEN: usize = 256;

fn platform_error(context: &str, err: EspError) -> RelayError {
    RelayError::Platform(format!("{}: {}", context, err))
}

/// Peripherals and network owned by the node for its whole run.
pub struct Board {
    pins: Option<Pins>,
    settings: String,
    _wifi: BlockingWifi<EspWifi<'static>>,
}

impl Board {
    /// Takes the peripherals, loads the settings and joins the configured
    /// network. Blocks until the station has an address.
    pub fn start() -> Result<Self, RelayError> {
        let peripherals = Peripherals::take().map_err(|e| platform_error("peripherals", e))?;
        let sysloop = EspSystemEventLoop::take().map_err(|e| platform_error("event loop", e))?;
        let partition = EspDefaultNvsPartition::take().map_err(|e| platform_error("NVS", e))?;
        let nvs = EspNvs::new(partition.clone(), NVS_NAMESPACE, true)
            .map_err(|e| platform_error("NVS", e))?;

        let ssid = read_setting(&nvs, SSID_KEY, option_env!("RELAY_WIFI_SSID"))?.ok_or_else(
            || RelayError::Config(format!("no Wi-Fi SSID stored under {:?}", SSID_KEY)),
        )?;
        let password =
            read_setting(&nvs, PASS_KEY, option_env!("RELAY_WIFI_PASS"))?.unwrap_or_default();
        let settings = read_setting(&nvs, ARGS_KEY, option_env!("RELAY_ARGS"))?.unwrap_or_default();

        let wifi = connect_wifi(peripherals.modem, sysloop, partition, &ssid, &password)?;

        Ok(Self {
            pins: Some(peripherals.pins),
            settings,
            _wifi: wifi,
        })
    }

    /// Stored node arguments, possibly empty.
    pub fn settings(&self) -> &str {
        &self.settings
    }

    /// Hands the GPIO pins out once.
    pub fn take_pins(&mut self) -> Option<Pins> {
        self.pins.take()
    }
}

fn read_setting(
    nvs: &EspNvs<NvsDefault>,
    key: &str,
    fallback: Option<&str>,
) -> Result<Option<String>, RelayError> {
    let mut buf = [0u8; SETTING_MAX_LEN];
    let stored = nvs
        .get_str(key, &mut buf)
        .map_err(|e| platform_error(key, e))?;
    Ok(stored.or(fallback).map(str::to_owned))
}

fn connect_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    ssid: &str,
    password: &str,
) -> Result<BlockingWifi<EspWifi<'static>>, RelayError> {
    let driver = EspWifi::new(modem, sysloop.clone(), Some(nvs))
        .map_err(|e| platform_error("Wi-Fi driver", e))?;
    let mut wifi =
        BlockingWifi::wrap(driver, sysloop).map_err(|e| platform_error("Wi-Fi driver", e))?;

    let auth_method = if password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };
    let configuration = Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| RelayError::Config(format!("SSID {:?} is too long", ssid)))?,
        password: password
            .try_into()
            .map_err(|_| RelayError::Config("Wi-Fi password is too long".into()))?,
        auth_method,
        ..Default::default()
    });

    wifi.set_configuration(&configuration)
        .map_err(|e| platform_error("Wi-Fi configuration", e))?;
    wifi.start().map_err(|e| platform_error("Wi-Fi start", e))?;

    log::info!("Connecting to Wi-Fi {}...", ssid);
    wifi.connect().map_err(|e| platform_error("Wi-Fi connect", e))?;
    wifi.wait_netif_up()
        .map_err(|e| platform_error("Wi-Fi netif", e))?;

    let ip_info = wifi
        .wifi()
        .sta_netif()
        .get_ip_info()
        .map_err(|e| platform_error("Wi-Fi address", e))?;
    log::info!("Wi-Fi connected, address {}", ip_info.ip);

    Ok(wifi)
}
