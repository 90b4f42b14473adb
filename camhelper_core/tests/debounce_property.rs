use camhelper_core::debouncer::{DebounceState, MotorDebouncer, Transition};
use camhelper_core::{DEFAULT_WINDOW, Direction, RawIntentEvent};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Open), Just(Direction::Close)]
}

/// Feed camera intents at the given offsets, then let the clock run far
/// past the last one. Returns every dispatched direction in order.
fn run(events: &[(u64, Direction)]) -> Vec<Direction> {
    let t0 = Instant::now();
    let mut deb = MotorDebouncer::new(DEFAULT_WINDOW);
    let mut out = Vec::new();
    for &(at_ms, dir) in events {
        let outcome = deb.on_intent(RawIntentEvent::camera(dir, t0 + Duration::from_millis(at_ms)));
        out.extend(outcome.flushed);
    }
    let end = events.last().map_or(0, |e| e.0) + 10 * DEFAULT_WINDOW.as_millis() as u64;
    out.extend(deb.fire_due(t0 + Duration::from_millis(end)));
    out
}

proptest! {
    #[test]
    fn opposite_pair_inside_window_never_actuates(
        first in direction(),
        delta in 0u64..100,
    ) {
        let fired = run(&[(0, first), (delta, first.opposite())]);
        prop_assert!(fired.is_empty(), "fired {fired:?}");
    }

    #[test]
    fn opposite_pair_past_window_actuates_both_in_order(
        first in direction(),
        delta in 100u64..5_000,
    ) {
        let fired = run(&[(0, first), (delta, first.opposite())]);
        prop_assert_eq!(fired, vec![first, first.opposite()]);
    }

    #[test]
    fn at_most_one_command_per_window(
        steps in proptest::collection::vec((0u64..250, direction()), 1..40),
    ) {
        let mut at = 0;
        let events: Vec<(u64, Direction)> = steps
            .into_iter()
            .map(|(gap, d)| { at += gap; (at, d) })
            .collect();
        let fired = run(&events);
        prop_assert!(fired.len() <= events.len());
        // Every dispatch needs a full quiet window behind it, so two
        // commands can never be closer than the window.
        let total_span = events.last().map_or(0, |e| e.0) + DEFAULT_WINDOW.as_millis() as u64;
        prop_assert!(fired.len() as u64 <= total_span / DEFAULT_WINDOW.as_millis() as u64 + 1);
    }

    #[test]
    fn forced_close_survives_any_camera_burst(
        burst in proptest::collection::vec((0u64..99, direction()), 0..20),
    ) {
        let t0 = Instant::now();
        let mut deb = MotorDebouncer::new(DEFAULT_WINDOW);
        deb.on_intent(RawIntentEvent::fall(t0));
        let mut offsets: Vec<_> = burst;
        offsets.sort_by_key(|e| e.0);
        for (at, d) in offsets {
            let outcome = deb.on_intent(RawIntentEvent::camera(d, t0 + Duration::from_millis(at)));
            prop_assert_eq!(outcome.transition, Transition::Dropped);
            prop_assert_eq!(outcome.flushed, None);
        }
        prop_assert_eq!(deb.fire_due(t0 + DEFAULT_WINDOW), Some(Direction::Close));
        prop_assert_eq!(deb.state(), DebounceState::Idle);
    }
}
