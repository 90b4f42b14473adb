//! Actuator worker scenarios driven by a manual clock.
//!
//! Intents are stamped with the manual clock; after advancing it, `sync()`
//! makes the worker settle whatever became due before the assertions run.

use camhelper_core::{
    Actuator, ActuatorHandle, CamError, CommandSink, DEFAULT_WINDOW, Direction, IntentSink, MotorController,
    RawIntentEvent,
};
use camhelper_hardware::SimulatedMotor;
use camhelper_traits::{BoxError, Clock, ManualClock, MonotonicClock, MotorPort};
use crossbeam_channel as xch;
use std::time::Duration;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn spawn(sim: &SimulatedMotor, clock: &ManualClock) -> Actuator {
    Actuator::spawn(MotorController::new(sim.clone()), DEFAULT_WINDOW, clock.clone())
        .expect("spawn actuator")
}

fn camera(h: &ActuatorHandle, clock: &ManualClock, d: Direction) {
    h.on_event(RawIntentEvent::camera(d, clock.now()));
}

#[test]
fn glitch_inside_window_never_reaches_the_motor() {
    let sim = SimulatedMotor::new();
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();

    camera(&h, &clock, Direction::Open);
    clock.advance(ms(30));
    camera(&h, &clock, Direction::Close);
    clock.advance(ms(500));
    h.sync().expect("actuator running");

    assert!(sim.actuations().is_empty());
    assert_eq!(act.stats().dispatched, 0);
    assert_eq!(act.motor_state().commanded_open, None);
}

#[test]
fn lone_unavailable_opens_once_after_window() {
    let sim = SimulatedMotor::new();
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();

    camera(&h, &clock, Direction::Open);
    clock.advance(ms(99));
    h.sync().expect("actuator running");
    assert!(sim.actuations().is_empty());

    clock.advance(ms(1));
    h.sync().expect("actuator running");
    assert_eq!(sim.actuations(), vec![true]);
    assert_eq!(h.is_open(), Some(true));
    assert_eq!(act.motor_state().commanded_open, Some(true));
    assert_eq!(act.stats().dispatched, 1);
}

#[test]
fn fall_during_pending_open_always_retracts() {
    let sim = SimulatedMotor::new();
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();

    camera(&h, &clock, Direction::Open);
    clock.advance(ms(20));
    h.on_event(RawIntentEvent::fall(clock.now()));
    clock.advance(ms(10));
    camera(&h, &clock, Direction::Open);
    clock.advance(ms(200));
    h.sync().expect("actuator running");

    assert_eq!(sim.actuations(), vec![false]);
    assert_eq!(h.is_open(), Some(false));
}

#[test]
fn immediate_command_is_not_debounced() {
    let sim = SimulatedMotor::new();
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();

    h.command(Direction::Open);
    h.sync().expect("actuator running");
    assert_eq!(sim.actuations(), vec![true]);
}

/// Parks every direction write until the test lets it through.
struct GatedPort {
    entered: xch::Sender<bool>,
    release: xch::Receiver<()>,
}

impl MotorPort for GatedPort {
    fn write_calibration(&mut self, _record: &str) -> Result<(), BoxError> {
        Ok(())
    }
    fn set_direction(&mut self, open: bool) -> Result<(), BoxError> {
        let _ = self.entered.send(open);
        let _ = self.release.recv_timeout(Duration::from_secs(5));
        Ok(())
    }
    fn enable_actuation(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
    fn read_position(&mut self) -> Result<String, BoxError> {
        Ok("1".into())
    }
}

#[test]
fn motor_state_tracks_each_write_behind_a_forced_close() {
    let (entered_tx, entered) = xch::unbounded();
    let (release, release_rx) = xch::unbounded();
    let clock = ManualClock::new();
    let port = GatedPort {
        entered: entered_tx,
        release: release_rx,
    };
    let act = Actuator::spawn(MotorController::new(port), DEFAULT_WINDOW, clock.clone())
        .expect("spawn actuator");
    let h = act.handle();

    h.on_event(RawIntentEvent::fall(clock.now()));
    h.command(Direction::Open);

    let wait = Duration::from_secs(5);
    assert_eq!(entered.recv_timeout(wait), Ok(false));
    assert_eq!(act.motor_state().commanded_open, None);

    release.send(()).expect("release close");
    assert_eq!(entered.recv_timeout(wait), Ok(true));
    assert_eq!(act.motor_state().commanded_open, Some(false));

    release.send(()).expect("release open");
    h.sync().expect("actuator running");
    assert_eq!(act.motor_state().commanded_open, Some(true));
    assert_eq!(act.stats().dispatched, 2);
}

#[test]
fn failed_writes_are_counted_and_worker_survives() {
    let sim = SimulatedMotor::new();
    sim.set_fail_writes(true);
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();

    h.command(Direction::Open);
    h.sync().expect("actuator running");
    assert_eq!(act.stats().failed, 1);

    sim.set_fail_writes(false);
    h.command(Direction::Close);
    h.sync().expect("actuator running");
    assert_eq!(act.stats().dispatched, 1);
    assert_eq!(sim.actuations(), vec![false]);
}

#[test]
fn unreadable_position_is_unknown() {
    let sim = SimulatedMotor::new();
    sim.set_fail_reads(true);
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    assert_eq!(act.handle().read_position(), Ok(None));
    assert_eq!(act.handle().is_open(), None);
}

#[test]
fn real_clock_window_elapses_without_prodding() {
    let sim = SimulatedMotor::new();
    let act = Actuator::spawn(MotorController::new(sim.clone()), ms(20), MonotonicClock::new())
        .expect("spawn actuator");
    let h = act.handle();
    h.on_event(RawIntentEvent::camera(Direction::Open, std::time::Instant::now()));

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while sim.actuations().is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(ms(5));
    }
    assert_eq!(sim.actuations(), vec![true]);
}

#[test]
fn handle_reports_stopped_worker() {
    let sim = SimulatedMotor::new();
    let clock = ManualClock::new();
    let act = spawn(&sim, &clock);
    let h = act.handle();
    act.shutdown();

    assert_eq!(h.sync(), Err(CamError::ActuatorStopped));
    assert_eq!(h.read_position(), Err(CamError::ActuatorStopped));
    assert_eq!(h.is_open(), None);
    // Sending into a stopped actuator is logged, not a panic.
    h.command(Direction::Open);
    assert!(sim.actuations().is_empty());
}

#[test]
fn repeated_spawn_and_drop_does_not_hang() {
    let clock = ManualClock::new();
    for _ in 0..10 {
        let sim = SimulatedMotor::new();
        let act = spawn(&sim, &clock);
        act.handle().on_event(RawIntentEvent::camera(Direction::Open, clock.now()));
        drop(act);
    }
}
