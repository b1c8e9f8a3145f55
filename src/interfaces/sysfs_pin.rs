//! Linux GPIO through the sysfs class interface.
//!
//! Claiming a line exports it (`/sys/class/gpio/export`), releasing it
//! unexports it. The kernel refuses a second export of the same line with
//! `EBUSY`, which surfaces as [`HardwareError::AlreadyClaimed`].
//!
//! Input bias is not configurable through sysfs; the button line must be
//! pulled up by the board or the device tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::device::{ClaimRegistry, DigitalInputPin, DigitalOutputPin, LineClaim, LineProvider};
use crate::error::HardwareError;

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

pub struct SysfsLineProvider {
    root: PathBuf,
    claims: ClaimRegistry,
}

impl SysfsLineProvider {
    pub fn new() -> Self {
        Self::with_root(SYSFS_GPIO_ROOT)
    }

    /// Provider rooted somewhere other than `/sys/class/gpio`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            claims: ClaimRegistry::new(),
        }
    }

    fn export(&self, line: u32, direction: &str) -> Result<SysfsLine, HardwareError> {
        let claim = self.claims.claim(line)?;

        // Always ask the kernel: a line exported by another process fails
        // here with EBUSY.
        fs::write(self.root.join("export"), line.to_string())
            .map_err(|e| HardwareError::from_io(line, &e))?;

        let line_dir = self.root.join(format!("gpio{}", line));
        // From here on the handle owns the export and unexports it on drop.
        let exported = SysfsLine {
            root: self.root.clone(),
            value: line_dir.join("value"),
            claim,
        };
        // "low" both selects output mode and drives the line low.
        fs::write(line_dir.join("direction"), direction)
            .map_err(|e| HardwareError::from_io(line, &e))?;

        log::debug!("Exported GPIO{} as {}", line, direction);
        Ok(exported)
    }
}

impl Default for SysfsLineProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LineProvider for SysfsLineProvider {
    fn claim_output(&mut self, line: u32) -> Result<Box<dyn DigitalOutputPin>, HardwareError> {
        Ok(Box::new(self.export(line, "low")?))
    }

    fn claim_input(
        &mut self,
        line: u32,
        pull_up: bool,
    ) -> Result<Box<dyn DigitalInputPin>, HardwareError> {
        if pull_up {
            log::debug!("GPIO{}: pull-up must be provided by the board", line);
        }
        Ok(Box::new(self.export(line, "in")?))
    }
}

/// A line exported by this process. Unexported on drop.
pub struct SysfsLine {
    root: PathBuf,
    value: PathBuf,
    claim: LineClaim,
}

impl SysfsLine {
    fn line(&self) -> u32 {
        self.claim.line()
    }

    fn write_value(&self, high: bool) -> Result<(), HardwareError> {
        let value = if high { "1" } else { "0" };
        fs::write(&self.value, value).map_err(|e| HardwareError::from_io(self.line(), &e))
    }

    fn read_value(&self) -> Result<bool, HardwareError> {
        let raw =
            fs::read_to_string(&self.value).map_err(|e| HardwareError::from_io(self.line(), &e))?;
        parse_level(self.line(), &raw)
    }
}

fn parse_level(line: u32, raw: &str) -> Result<bool, HardwareError> {
    match raw.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(HardwareError::Driver {
            line,
            reason: format!("unexpected value {:?}", other),
        }),
    }
}

fn unexport(root: &Path, line: u32) -> io::Result<()> {
    fs::write(root.join("unexport"), line.to_string())
}

impl Drop for SysfsLine {
    fn drop(&mut self) {
        if let Err(e) = unexport(&self.root, self.line()) {
            log::warn!("Failed to unexport GPIO{}: {}", self.line(), e);
        }
    }
}

impl DigitalOutputPin for SysfsLine {
    fn set_high(&mut self) -> Result<(), HardwareError> {
        self.write_value(true)
    }

    fn set_low(&mut self) -> Result<(), HardwareError> {
        self.write_value(false)
    }

    fn is_high(&self) -> Result<bool, HardwareError> {
        self.read_value()
    }

    fn get_num(&self) -> u32 {
        self.line()
    }
}

impl DigitalInputPin for SysfsLine {
    fn is_high(&self) -> Result<bool, HardwareError> {
        self.read_value()
    }

    fn get_num(&self) -> u32 {
        self.line()
    }
}
