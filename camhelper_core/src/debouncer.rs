//! Coalescing debounce of open/close intents (`MotorDebouncer`).
//!
//! Camera availability callbacks arrive in bursts: switching camera apps
//! reports "available" and "unavailable" within a few milliseconds. Every
//! intent therefore waits one window `W` before it is actuated, and an
//! opposite-direction intent arriving inside that window cancels it instead
//! of scheduling its own command. Only intents that survive `W` reach the
//! motor.
//!
//! Fall-detector closes are forced: they always (re)arm a close, cancel any
//! pending open, and cannot themselves be canceled by camera intents.
//!
//! The machine is pure: it never touches hardware or reads a clock. Callers
//! pass timestamps in and dispatch the directions it hands back.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::timer::DeferredTimer;
use crate::types::{Direction, MotorState, RawIntentEvent};

/// Default coalescing window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    PendingOpen { armed_at: Instant },
    PendingClose { armed_at: Instant, forced: bool },
}

/// Effect of one intent on the pending command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A command in this direction is now scheduled one window out.
    Armed(Direction),
    /// A pending command in this direction was canceled as a glitch.
    Suppressed(Direction),
    /// Ignored; a forced close is pending.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentOutcome {
    /// A command that had already settled before this intent arrived.
    /// It must be dispatched before anything else.
    pub flushed: Option<Direction>,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Pending forced close dispatched ahead of the command.
    pub preempted: Option<Direction>,
    pub command: Direction,
}

#[derive(Debug)]
pub struct MotorDebouncer {
    window: Duration,
    state: DebounceState,
    timer: DeferredTimer,
    motor: MotorState,
}

impl Default for MotorDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl MotorDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
            timer: DeferredTimer::new(),
            motor: MotorState::default(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn motor_state(&self) -> MotorState {
        self.motor
    }

    /// When the pending command settles, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.due()
    }

    pub fn on_intent(&mut self, event: RawIntentEvent) -> IntentOutcome {
        let now = event.timestamp;
        let flushed = self.fire_due(now);

        let transition = if event.is_forced() {
            self.arm(Direction::Close, now, true)
        } else {
            match (self.state, event.direction) {
                (DebounceState::PendingClose { forced: true, .. }, _) => {
                    debug!(direction = %event.direction, "forced close pending, intent dropped");
                    Transition::Dropped
                }
                (DebounceState::PendingOpen { armed_at }, Direction::Close)
                | (DebounceState::PendingClose { armed_at, .. }, Direction::Open)
                    if now.saturating_duration_since(armed_at) < self.window =>
                {
                    let canceled = event.direction.opposite();
                    self.timer.cancel();
                    self.state = DebounceState::Idle;
                    debug!(%canceled, "opposite intent inside window, pending command suppressed");
                    Transition::Suppressed(canceled)
                }
                (_, direction) => self.arm(direction, now, false),
            }
        };

        IntentOutcome {
            flushed,
            transition,
        }
    }

    /// Hand out the pending command once its window has elapsed.
    pub fn fire_due(&mut self, now: Instant) -> Option<Direction> {
        self.timer.fire(now)?;
        let direction = match self.state {
            DebounceState::PendingOpen { .. } => Direction::Open,
            DebounceState::PendingClose { .. } => Direction::Close,
            DebounceState::Idle => return None,
        };
        self.state = DebounceState::Idle;
        self.record(direction, now);
        Some(direction)
    }

    /// Immediate command that bypasses the window (recovery actions).
    ///
    /// Ordinary pending work is canceled. A pending forced close is never
    /// dropped: it is dispatched first.
    pub fn command_now(&mut self, direction: Direction, now: Instant) -> CommandOutcome {
        let preempted = match self.state {
            DebounceState::PendingClose { forced: true, .. } => {
                self.record(Direction::Close, now);
                Some(Direction::Close)
            }
            DebounceState::PendingOpen { .. } | DebounceState::PendingClose { .. } => {
                debug!(%direction, "pending command replaced by immediate command");
                None
            }
            DebounceState::Idle => None,
        };
        self.timer.cancel();
        self.state = DebounceState::Idle;
        self.record(direction, now);
        CommandOutcome {
            preempted,
            command: direction,
        }
    }

    fn arm(&mut self, direction: Direction, now: Instant, forced: bool) -> Transition {
        self.state = match direction {
            Direction::Open => DebounceState::PendingOpen { armed_at: now },
            Direction::Close => DebounceState::PendingClose {
                armed_at: now,
                forced,
            },
        };
        self.timer.arm(now + self.window);
        debug!(%direction, forced, "command armed");
        Transition::Armed(direction)
    }

    fn record(&mut self, direction: Direction, now: Instant) {
        self.motor = MotorState::commanded(direction, now);
    }
}
