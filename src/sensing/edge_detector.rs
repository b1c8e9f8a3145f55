//! Falling-edge detector and four-state cycler for the push-button.
//!
//! Pure logic, no hardware dependencies. The caller samples the button on a
//! fixed period and feeds each sample in with a monotonic millisecond
//! timestamp. Fully testable on host.

use crate::protocol::LogicalState;

/// Last observed button level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ButtonLevel {
    /// Released, line pulled high.
    #[default]
    Idle,
    /// Held down, line pulled low.
    Pressed,
}

impl ButtonLevel {
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            ButtonLevel::Pressed
        } else {
            ButtonLevel::Idle
        }
    }
}

/// Turns raw button samples into press events.
///
/// Only an `Idle -> Pressed` transition emits. It emits the state at the
/// current cycle index, advances the index, and opens a debounce window;
/// samples inside the window are dropped without touching the level.
#[derive(Debug)]
pub struct EdgeDetector {
    level: ButtonLevel,
    index: usize,
    debounce_ms: u64,
    // End of the open debounce window, if any.
    hold_until_ms: Option<u64>,
    presses: u64,
}

impl EdgeDetector {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            level: ButtonLevel::Idle,
            index: 0,
            debounce_ms,
            hold_until_ms: None,
            presses: 0,
        }
    }

    /// Feeds one sample taken at `now_ms`.
    ///
    /// Returns the state to transmit when the sample completes a press.
    pub fn observe(&mut self, now_ms: u64, pressed: bool) -> Option<LogicalState> {
        if let Some(until) = self.hold_until_ms {
            if now_ms < until {
                return None;
            }
            self.hold_until_ms = None;
        }

        let next = ButtonLevel::from_pressed(pressed);
        let falling_edge = self.level == ButtonLevel::Idle && next == ButtonLevel::Pressed;
        self.level = next;

        if !falling_edge {
            return None;
        }

        let state = LogicalState::from_index(self.index);
        self.index = (self.index + 1) % LogicalState::CYCLE.len();
        self.presses += 1;
        self.hold_until_ms = Some(now_ms.saturating_add(self.debounce_ms));
        Some(state)
    }

    /// Index of the state the next press will emit.
    pub fn cycle_index(&self) -> usize {
        self.index
    }

    pub fn level(&self) -> ButtonLevel {
        self.level
    }

    /// Presses accepted since creation.
    pub fn presses(&self) -> u64 {
        self.presses
    }

    pub fn in_debounce(&self, now_ms: u64) -> bool {
        self.hold_until_ms.is_some_and(|until| now_ms < until)
    }
}
