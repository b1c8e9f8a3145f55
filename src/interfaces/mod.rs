//! Line providers for the platforms the relay runs on.

#[cfg(target_os = "espidf")]
pub mod digital_pin;
pub mod sim_pin;
#[cfg(target_os = "espidf")]
pub mod station;
#[cfg(target_os = "linux")]
pub mod sysfs_pin;
