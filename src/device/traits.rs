use crate::error::HardwareError;

/// A claimed line configured as a push-pull output.
///
/// Dropping the handle releases the line.
pub trait DigitalOutputPin {
    fn set_high(&mut self) -> Result<(), HardwareError>;
    fn set_low(&mut self) -> Result<(), HardwareError>;

    fn set_level(&mut self, high: bool) -> Result<(), HardwareError> {
        if high {
            self.set_high()
        } else {
            self.set_low()
        }
    }

    /// Electrical level currently present on the line.
    fn is_high(&self) -> Result<bool, HardwareError>;

    fn get_num(&self) -> u32;
}

/// A claimed line configured as a digital input.
///
/// Dropping the handle releases the line.
pub trait DigitalInputPin {
    fn is_high(&self) -> Result<bool, HardwareError>;

    fn get_num(&self) -> u32;
}

/// Hands out exclusive handles to numbered lines.
///
/// A second claim of a line that is still held fails with
/// [`HardwareError::AlreadyClaimed`].
pub trait LineProvider {
    /// Claims `line` as an output driven low.
    fn claim_output(&mut self, line: u32) -> Result<Box<dyn DigitalOutputPin>, HardwareError>;

    /// Claims `line` as an input, optionally with the internal pull-up enabled.
    fn claim_input(
        &mut self,
        line: u32,
        pull_up: bool,
    ) -> Result<Box<dyn DigitalInputPin>, HardwareError>;
}
