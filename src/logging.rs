//! Logger setup. Library code logs through the `log` facade only.

/// Installs the platform logger. Call once, first thing in `main`.
#[cfg(target_os = "espidf")]
pub fn init() {
    // Required so the ESP-IDF runtime patches are linked in.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
}

/// Installs the platform logger. Call once, first thing in `main`.
///
/// Level defaults to `info` and follows `RUST_LOG` when set.
#[cfg(not(target_os = "espidf"))]
pub fn init() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Also bridges `log` records into the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
