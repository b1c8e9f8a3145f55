use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::HardwareError;

/// Book-keeping of which lines are held by a live handle.
///
/// Nodes are single-threaded, so the set is shared through `Rc<RefCell<_>>`.
#[derive(Debug, Clone, Default)]
pub struct ClaimRegistry {
    held: Rc<RefCell<BTreeSet<u32>>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self, line: u32) -> Result<LineClaim, HardwareError> {
        if !self.held.borrow_mut().insert(line) {
            return Err(HardwareError::AlreadyClaimed(line));
        }
        log::debug!("Claimed line {}", line);
        Ok(LineClaim {
            line,
            registry: self.clone(),
        })
    }

    pub fn is_claimed(&self, line: u32) -> bool {
        self.held.borrow().contains(&line)
    }
}

/// Converts `line` to a driver pin number below `limit`.
///
/// Lines that do not fit the driver's signed pin type are unavailable rather
/// than wrapped.
pub fn pin_number(line: u32, limit: i32) -> Result<i32, HardwareError> {
    match i32::try_from(line) {
        Ok(num) if num < limit => Ok(num),
        _ => Err(HardwareError::Unavailable(line)),
    }
}

/// Proof that a line is held. The line is released when this is dropped.
#[derive(Debug)]
pub struct LineClaim {
    line: u32,
    registry: ClaimRegistry,
}

impl LineClaim {
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl Drop for LineClaim {
    fn drop(&mut self) {
        self.registry.held.borrow_mut().remove(&self.line);
        log::debug!("Released line {}", self.line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_fails_until_release() {
        let registry = ClaimRegistry::new();
        let claim = registry.claim(5).unwrap();
        assert!(registry.is_claimed(5));
        assert!(matches!(
            registry.claim(5),
            Err(HardwareError::AlreadyClaimed(5))
        ));

        drop(claim);
        assert!(!registry.is_claimed(5));
        assert!(registry.claim(5).is_ok());
    }

    #[test]
    fn claims_are_per_line() {
        let registry = ClaimRegistry::new();
        let _a = registry.claim(5).unwrap();
        let b = registry.claim(6).unwrap();
        assert_eq!(b.line(), 6);
    }

    #[test]
    fn pin_number_rejects_out_of_range_lines() {
        assert_eq!(pin_number(5, 49).unwrap(), 5);
        assert!(matches!(pin_number(49, 49), Err(HardwareError::Unavailable(49))));
        assert!(matches!(
            pin_number(u32::MAX, 49),
            Err(HardwareError::Unavailable(u32::MAX))
        ));
        assert!(pin_number(0x8000_0000, 49).is_err());
    }
}
