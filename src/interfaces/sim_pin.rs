//! In-memory GPIO bank.
//!
//! Lines behave like real ones as far as the relay can tell: claims are
//! exclusive, outputs read back what was driven, inputs read what the test
//! (or an operator) drives from outside. Individual lines can be made to fail
//! to exercise the per-call error paths.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::device::{ClaimRegistry, DigitalInputPin, DigitalOutputPin, LineClaim, LineProvider};
use crate::error::HardwareError;

#[derive(Debug, Default)]
struct BankState {
    levels: BTreeMap<u32, bool>,
    // `None` means every line number exists.
    available: Option<BTreeSet<u32>>,
    faulty: BTreeSet<u32>,
}

/// Cloning yields another handle onto the same bank.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBank {
    state: Rc<RefCell<BankState>>,
    claims: ClaimRegistry,
}

impl SimulatedBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bank where only `lines` exist.
    pub fn with_lines(lines: &[u32]) -> Self {
        let bank = Self::default();
        bank.state.borrow_mut().available = Some(lines.iter().copied().collect());
        bank
    }

    /// Forces the electrical level of `line` from outside, like a pressed
    /// button pulling an input low.
    pub fn drive(&self, line: u32, high: bool) {
        self.state.borrow_mut().levels.insert(line, high);
    }

    pub fn level(&self, line: u32) -> bool {
        self.state.borrow().levels.get(&line).copied().unwrap_or(false)
    }

    /// Makes every read and write on `line` fail until [`heal`](Self::heal).
    pub fn break_line(&self, line: u32) {
        self.state.borrow_mut().faulty.insert(line);
    }

    pub fn heal(&self, line: u32) {
        self.state.borrow_mut().faulty.remove(&line);
    }

    pub fn is_claimed(&self, line: u32) -> bool {
        self.claims.is_claimed(line)
    }

    fn check_exists(&self, line: u32) -> Result<(), HardwareError> {
        match &self.state.borrow().available {
            Some(lines) if !lines.contains(&line) => Err(HardwareError::Unavailable(line)),
            _ => Ok(()),
        }
    }

    fn check_healthy(&self, line: u32) -> Result<(), HardwareError> {
        if self.state.borrow().faulty.contains(&line) {
            return Err(HardwareError::Driver {
                line,
                reason: "simulated fault".into(),
            });
        }
        Ok(())
    }

    fn write(&self, line: u32, high: bool) -> Result<(), HardwareError> {
        self.check_healthy(line)?;
        self.drive(line, high);
        Ok(())
    }

    fn read(&self, line: u32) -> Result<bool, HardwareError> {
        self.check_healthy(line)?;
        Ok(self.level(line))
    }
}

impl LineProvider for SimulatedBank {
    fn claim_output(&mut self, line: u32) -> Result<Box<dyn DigitalOutputPin>, HardwareError> {
        self.check_exists(line)?;
        let claim = self.claims.claim(line)?;
        self.drive(line, false);
        Ok(Box::new(SimOutputPin {
            bank: self.clone(),
            claim,
        }))
    }

    fn claim_input(
        &mut self,
        line: u32,
        pull_up: bool,
    ) -> Result<Box<dyn DigitalInputPin>, HardwareError> {
        self.check_exists(line)?;
        let claim = self.claims.claim(line)?;
        self.state
            .borrow_mut()
            .levels
            .entry(line)
            .or_insert(pull_up);
        Ok(Box::new(SimInputPin {
            bank: self.clone(),
            claim,
        }))
    }
}

pub struct SimOutputPin {
    bank: SimulatedBank,
    claim: LineClaim,
}

impl DigitalOutputPin for SimOutputPin {
    fn set_high(&mut self) -> Result<(), HardwareError> {
        self.bank.write(self.claim.line(), true)
    }

    fn set_low(&mut self) -> Result<(), HardwareError> {
        self.bank.write(self.claim.line(), false)
    }

    fn is_high(&self) -> Result<bool, HardwareError> {
        self.bank.read(self.claim.line())
    }

    fn get_num(&self) -> u32 {
        self.claim.line()
    }
}

pub struct SimInputPin {
    bank: SimulatedBank,
    claim: LineClaim,
}

impl DigitalInputPin for SimInputPin {
    fn is_high(&self) -> Result<bool, HardwareError> {
        self.bank.read(self.claim.line())
    }

    fn get_num(&self) -> u32 {
        self.claim.line()
    }
}
