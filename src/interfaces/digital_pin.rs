use crate::device::{pin_number, ClaimRegistry, DigitalInputPin, DigitalOutputPin, LineClaim, LineProvider};
use crate::error::HardwareError;
use esp_idf_hal::gpio::{AnyIOPin, Input, InputOutput, PinDriver, Pins, Pull};
use esp_idf_sys::EspError;

fn driver_error(line: u32, err: EspError) -> HardwareError {
    HardwareError::Driver {
        line,
        reason: err.to_string(),
    }
}

/// Line provider backed by the ESP-IDF GPIO matrix.
///
/// Owns the chip's GPIO pins, so nothing else in the firmware can build a
/// driver for the same pins behind the provider's back.
pub struct EspLineProvider {
    _pins: Pins,
    claims: ClaimRegistry,
}

impl EspLineProvider {
    pub fn new(pins: Pins) -> Self {
        Self {
            _pins: pins,
            claims: ClaimRegistry::new(),
        }
    }

    fn pin(&self, line: u32) -> Result<(AnyIOPin, LineClaim), HardwareError> {
        let num = pin_number(line, esp_idf_sys::gpio_num_t_GPIO_NUM_MAX)?;
        let claim = self.claims.claim(line)?;
        // SAFETY: the pins are owned by this provider and the claim registry
        // hands out each pin number at most once at a time.
        let pin = unsafe { AnyIOPin::new(num) };
        Ok((pin, claim))
    }
}

impl LineProvider for EspLineProvider {
    fn claim_output(&mut self, line: u32) -> Result<Box<dyn DigitalOutputPin>, HardwareError> {
        let (pin, claim) = self.pin(line)?;
        // Input/output mode so reads report the level actually on the pad.
        let mut pin_driver = PinDriver::input_output(pin).map_err(|e| driver_error(line, e))?;
        pin_driver.set_low().map_err(|e| driver_error(line, e))?;

        Ok(Box::new(EspIdfDigitalOutputPin {
            pin_driver,
            _claim: claim,
        }))
    }

    fn claim_input(
        &mut self,
        line: u32,
        pull_up: bool,
    ) -> Result<Box<dyn DigitalInputPin>, HardwareError> {
        let (pin, claim) = self.pin(line)?;
        let mut pin_driver = PinDriver::input(pin).map_err(|e| driver_error(line, e))?;
        let pull = if pull_up { Pull::Up } else { Pull::Floating };
        pin_driver.set_pull(pull).map_err(|e| driver_error(line, e))?;

        Ok(Box::new(EspIdfDigitalInputPin {
            pin_driver,
            _claim: claim,
        }))
    }
}

pub struct EspIdfDigitalOutputPin {
    pin_driver: PinDriver<'static, AnyIOPin, InputOutput>,
    // Declared after the driver so the pin is reset before the claim is freed.
    _claim: LineClaim,
}

impl DigitalOutputPin for EspIdfDigitalOutputPin {
    fn set_high(&mut self) -> Result<(), HardwareError> {
        let line = self.get_num();
        self.pin_driver.set_high().map_err(|e| driver_error(line, e))
    }

    fn set_low(&mut self) -> Result<(), HardwareError> {
        let line = self.get_num();
        self.pin_driver.set_low().map_err(|e| driver_error(line, e))
    }

    fn is_high(&self) -> Result<bool, HardwareError> {
        Ok(self.pin_driver.is_high())
    }

    fn get_num(&self) -> u32 {
        self.pin_driver.pin() as u32
    }
}

pub struct EspIdfDigitalInputPin {
    pin_driver: PinDriver<'static, AnyIOPin, Input>,
    _claim: LineClaim,
}

impl DigitalInputPin for EspIdfDigitalInputPin {
    fn is_high(&self) -> Result<bool, HardwareError> {
        Ok(self.pin_driver.is_high())
    }

    fn get_num(&self) -> u32 {
        self.pin_driver.pin() as u32
    }
}
