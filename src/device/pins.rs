use crate::device::traits::{DigitalInputPin, DigitalOutputPin, LineProvider};
use crate::error::HardwareError;
use crate::protocol::LogicalState;

/// The two indicator outputs of the actuation node, one per state bit.
pub struct IndicatorPair {
    line_a: Box<dyn DigitalOutputPin>,
    line_b: Box<dyn DigitalOutputPin>,
}

impl IndicatorPair {
    /// Claims both lines as outputs. Fails without holding either line if
    /// one of them cannot be claimed.
    pub fn claim(
        provider: &mut dyn LineProvider,
        line_a: u32,
        line_b: u32,
    ) -> Result<Self, HardwareError> {
        let line_a = provider.claim_output(line_a)?;
        let line_b = provider.claim_output(line_b)?;
        log::info!(
            "Indicator lines claimed: a=GPIO{}, b=GPIO{}",
            line_a.get_num(),
            line_b.get_num()
        );
        Ok(Self { line_a, line_b })
    }

    pub fn set_outputs(&mut self, a: bool, b: bool) -> Result<(), HardwareError> {
        self.line_a.set_level(a)?;
        self.line_b.set_level(b)
    }

    pub fn read_inputs(&self) -> Result<(bool, bool), HardwareError> {
        Ok((self.line_a.is_high()?, self.line_b.is_high()?))
    }

    pub fn apply(&mut self, state: LogicalState) -> Result<(), HardwareError> {
        self.set_outputs(state.a, state.b)
    }

    pub fn inspect(&self) -> Result<LogicalState, HardwareError> {
        self.read_inputs().map(LogicalState::from)
    }

    pub fn lines(&self) -> (u32, u32) {
        (self.line_a.get_num(), self.line_b.get_num())
    }

    /// Drives both lines low and gives them back to the provider.
    pub fn release(mut self) {
        if let Err(e) = self.set_outputs(false, false) {
            log::warn!("Failed to reset indicator lines before release: {}", e);
        }
        let (a, b) = self.lines();
        log::info!("Indicator lines released: a=GPIO{}, b=GPIO{}", a, b);
    }
}

/// Active-low push-button on an input line with pull-up.
pub struct PushButton {
    line: Box<dyn DigitalInputPin>,
}

impl PushButton {
    pub fn claim(provider: &mut dyn LineProvider, line: u32) -> Result<Self, HardwareError> {
        let line = provider.claim_input(line, true)?;
        log::info!("Button line claimed: GPIO{} (pull-up, active low)", line.get_num());
        Ok(Self { line })
    }

    /// `true` while the button is held down.
    pub fn read_button(&self) -> Result<bool, HardwareError> {
        Ok(!self.line.is_high()?)
    }

    pub fn line(&self) -> u32 {
        self.line.get_num()
    }

    pub fn release(self) {
        log::info!("Button line released: GPIO{}", self.line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::sim_pin::SimulatedBank;

    #[test]
    fn apply_then_inspect() {
        let mut bank = SimulatedBank::new();
        let mut pair = IndicatorPair::claim(&mut bank, 5, 6).unwrap();

        assert_eq!(pair.inspect().unwrap(), LogicalState::new(false, false));
        pair.apply(LogicalState::new(true, false)).unwrap();
        assert_eq!(pair.read_inputs().unwrap(), (true, false));
        assert!(bank.level(5));
        assert!(!bank.level(6));
    }

    #[test]
    fn set_outputs_is_idempotent() {
        let mut bank = SimulatedBank::new();
        let mut pair = IndicatorPair::claim(&mut bank, 5, 6).unwrap();

        pair.set_outputs(false, true).unwrap();
        pair.set_outputs(false, true).unwrap();
        assert_eq!(pair.inspect().unwrap(), LogicalState::new(false, true));
    }

    #[test]
    fn partial_claim_releases_first_line() {
        let mut bank = SimulatedBank::with_lines(&[5]);
        assert!(matches!(
            IndicatorPair::claim(&mut bank, 5, 6),
            Err(HardwareError::Unavailable(6))
        ));
        assert!(!bank.is_claimed(5));
    }

    #[test]
    fn lines_are_exclusive() {
        let mut bank = SimulatedBank::new();
        let pair = IndicatorPair::claim(&mut bank, 5, 6).unwrap();
        assert!(matches!(
            PushButton::claim(&mut bank, 6),
            Err(HardwareError::AlreadyClaimed(6))
        ));

        pair.release();
        assert!(PushButton::claim(&mut bank, 6).is_ok());
    }

    #[test]
    fn button_is_active_low() {
        let mut bank = SimulatedBank::new();
        let button = PushButton::claim(&mut bank, 17).unwrap();
        assert!(!button.read_button().unwrap());

        bank.drive(17, false);
        assert!(button.read_button().unwrap());
    }

    #[test]
    fn release_drives_lines_low() {
        let mut bank = SimulatedBank::new();
        let mut pair = IndicatorPair::claim(&mut bank, 5, 6).unwrap();
        pair.apply(LogicalState::new(true, true)).unwrap();
        pair.release();
        assert!(!bank.level(5));
        assert!(!bank.level(6));
    }
}
