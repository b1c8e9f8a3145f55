//! Edge detector and state cycle tests

use button_relay::protocol::LogicalState;
use button_relay::sensing::{ButtonLevel, EdgeDetector};
use proptest::prelude::*;

const SAMPLE_MS: u64 = 10;
const DEBOUNCE_MS: u64 = 300;

/// Presses and releases once, starting at `t`, held for `hold_ms`.
/// Returns the emitted states and the time after the release.
fn press(detector: &mut EdgeDetector, t: u64, hold_ms: u64) -> (Vec<LogicalState>, u64) {
    let mut emitted = Vec::new();
    let mut now = t;
    while now < t + hold_ms {
        emitted.extend(detector.observe(now, true));
        now += SAMPLE_MS;
    }
    while now < t + hold_ms + DEBOUNCE_MS + SAMPLE_MS {
        emitted.extend(detector.observe(now, false));
        now += SAMPLE_MS;
    }
    (emitted, now)
}

#[test]
fn test_sequence_wraps_after_four_presses() {
    let mut detector = EdgeDetector::new(DEBOUNCE_MS);
    let mut now = 0;
    let mut sequence = Vec::new();
    for _ in 0..6 {
        let (emitted, next) = press(&mut detector, now, 50);
        sequence.extend(emitted);
        now = next;
    }

    let codes: Vec<String> = sequence.iter().map(ToString::to_string).collect();
    assert_eq!(codes, ["00", "01", "10", "11", "00", "01"]);
}

#[test]
fn test_idle_samples_emit_nothing() {
    let mut detector = EdgeDetector::new(DEBOUNCE_MS);
    for t in 0..100 {
        assert_eq!(detector.observe(t * SAMPLE_MS, false), None);
    }
    assert_eq!(detector.cycle_index(), 0);
    assert_eq!(detector.level(), ButtonLevel::Idle);
}

#[test]
fn test_pressed_at_start_counts_as_edge() {
    // The line starts in the idle level, so a button already held down at
    // the first sample is a press.
    let mut detector = EdgeDetector::new(DEBOUNCE_MS);
    assert_eq!(detector.observe(0, true), Some(LogicalState::new(false, false)));
}

#[test]
fn test_long_hold_is_one_press() {
    let mut detector = EdgeDetector::new(DEBOUNCE_MS);
    let (emitted, _) = press(&mut detector, 0, 5_000);
    assert_eq!(emitted.len(), 1);
    assert_eq!(detector.cycle_index(), 1);
}

proptest! {
    #[test]
    fn cycle_index_is_presses_mod_four(k in 0usize..40) {
        let mut detector = EdgeDetector::new(DEBOUNCE_MS);
        let mut now = 0;
        let mut sequence = Vec::new();
        for _ in 0..k {
            let (emitted, next) = press(&mut detector, now, 30);
            sequence.extend(emitted);
            now = next;
        }

        prop_assert_eq!(detector.cycle_index(), k % 4);
        prop_assert_eq!(sequence.len(), k);
        for (i, state) in sequence.iter().enumerate() {
            prop_assert_eq!(*state, LogicalState::from_index(i));
        }
    }

    #[test]
    fn burst_within_window_emits_once(levels in proptest::collection::vec(any::<bool>(), 1..29)) {
        let mut detector = EdgeDetector::new(DEBOUNCE_MS);
        let mut emitted = 0;

        if detector.observe(0, true).is_some() {
            emitted += 1;
        }
        // Every bounce lands strictly inside the window.
        for (i, pressed) in levels.iter().enumerate() {
            let t = (i as u64 + 1) * SAMPLE_MS;
            if detector.observe(t, *pressed).is_some() {
                emitted += 1;
            }
        }

        prop_assert_eq!(emitted, 1);
        prop_assert_eq!(detector.cycle_index(), 1);
    }
}
