//! Single actuation authority.
//!
//! Spawns one worker thread that owns both the `MotorDebouncer` and the
//! `MotorController`. Producers only enqueue through a clonable
//! `ActuatorHandle`, so they never block on hardware I/O and every command
//! reaching the motor is serialized through the debounce machine.
//!
//! Safety: each `Actuator` spawns exactly one thread, which is shut down and
//! joined when the `Actuator` is dropped. Pending (unsettled) commands are
//! discarded on shutdown.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use camhelper_traits::MotorPort;
use camhelper_traits::clock::Clock;
use eyre::WrapErr;
use tracing::{debug, info, trace, warn};

use crate::controller::MotorController;
use crate::debouncer::MotorDebouncer;
use crate::error::CamError;
use crate::types::{Direction, MotorState, PositionCode, RawIntentEvent};
use crate::util::lock;

/// Entry point for open/close intents from any producer.
pub trait IntentSink: Send + Sync {
    fn on_event(&self, event: RawIntentEvent);
}

/// Immediate, non-debounced actuation (still serialized).
pub trait CommandSink: Send + Sync {
    fn command(&self, direction: Direction);
}

enum Msg {
    Intent(RawIntentEvent),
    Command(Direction),
    ReadPosition(xch::Sender<Option<PositionCode>>),
    Sync(xch::Sender<()>),
    Tick,
    Shutdown,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    failed: AtomicU64,
}

/// Snapshot of actuation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorStats {
    /// Commands whose direction and enable writes both succeeded.
    pub dispatched: u64,
    /// Commands abandoned because a register write failed.
    pub failed: u64,
}

#[derive(Clone)]
pub struct ActuatorHandle {
    tx: xch::Sender<Msg>,
}

impl std::fmt::Debug for ActuatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActuatorHandle")
            .field("queued", &self.tx.len())
            .finish()
    }
}

impl ActuatorHandle {
    fn send(&self, msg: Msg) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// Wake the worker so it re-checks the pending deadline against its clock.
    pub fn tick(&self) {
        let _ = self.send(Msg::Tick);
    }

    /// Block until every message queued before this call has been handled.
    pub fn sync(&self) -> Result<(), CamError> {
        let (tx, rx) = xch::bounded(1);
        if !self.send(Msg::Sync(tx)) {
            return Err(CamError::ActuatorStopped);
        }
        rx.recv().map_err(|_| CamError::ActuatorStopped)
    }

    /// Read the position register on the worker thread.
    ///
    /// `Ok(None)` when the register is unreadable or unparsable.
    pub fn read_position(&self) -> Result<Option<PositionCode>, CamError> {
        let (tx, rx) = xch::bounded(1);
        if !self.send(Msg::ReadPosition(tx)) {
            return Err(CamError::ActuatorStopped);
        }
        rx.recv().map_err(|_| CamError::ActuatorStopped)
    }

    /// `None` when the position is unknown, including a stopped worker.
    pub fn is_open(&self) -> Option<bool> {
        self.read_position().ok().flatten().map(|p| !p.is_retracted())
    }
}

impl IntentSink for ActuatorHandle {
    fn on_event(&self, event: RawIntentEvent) {
        trace!(?event, "intent queued");
        if !self.send(Msg::Intent(event)) {
            warn!(?event, "actuator stopped, intent lost");
        }
    }
}

impl CommandSink for ActuatorHandle {
    fn command(&self, direction: Direction) {
        if !self.send(Msg::Command(direction)) {
            warn!(%direction, "actuator stopped, command lost");
        }
    }
}

pub struct Actuator {
    handle: ActuatorHandle,
    motor_state: Arc<Mutex<MotorState>>,
    counters: Arc<Counters>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Actuator {
    pub fn spawn<P, C>(
        controller: MotorController<P>,
        window: Duration,
        clock: C,
    ) -> crate::error::Result<Self>
    where
        P: MotorPort + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = xch::unbounded();
        let motor_state = Arc::new(Mutex::new(MotorState::default()));
        let counters = Arc::new(Counters::default());
        let worker = Worker {
            rx,
            debouncer: MotorDebouncer::new(window),
            controller,
            clock,
            motor_state: motor_state.clone(),
            counters: counters.clone(),
        };

        let join_handle = std::thread::Builder::new()
            .name("camhelper-actuator".into())
            .spawn(move || worker.run())
            .wrap_err("spawn actuator thread")?;
        info!(window_ms = crate::util::millis(window), "actuator started");

        Ok(Self {
            handle: ActuatorHandle { tx },
            motor_state,
            counters,
            join_handle: Some(join_handle),
        })
    }

    pub fn handle(&self) -> ActuatorHandle {
        self.handle.clone()
    }

    /// Last command written to the motor port.
    pub fn motor_state(&self) -> MotorState {
        *lock(&self.motor_state)
    }

    pub fn stats(&self) -> ActuatorStats {
        ActuatorStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop the worker and wait for it. Equivalent to dropping.
    pub fn shutdown(self) {}
}

impl Drop for Actuator {
    fn drop(&mut self) {
        let _ = self.handle.send(Msg::Shutdown);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => trace!("actuator thread joined"),
                Err(e) => warn!(?e, "actuator thread panicked during shutdown"),
            }
        }
    }
}

struct Worker<P: MotorPort, C: Clock> {
    rx: xch::Receiver<Msg>,
    debouncer: MotorDebouncer,
    controller: MotorController<P>,
    clock: C,
    motor_state: Arc<Mutex<MotorState>>,
    counters: Arc<Counters>,
}

impl<P: MotorPort, C: Clock> Worker<P, C> {
    fn run(mut self) {
        loop {
            let msg = match self.debouncer.next_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(self.clock.now());
                    if wait.is_zero() {
                        Msg::Tick
                    } else {
                        match self.rx.recv_timeout(wait) {
                            Ok(m) => m,
                            Err(xch::RecvTimeoutError::Timeout) => Msg::Tick,
                            Err(xch::RecvTimeoutError::Disconnected) => break,
                        }
                    }
                }
                None => match self.rx.recv() {
                    Ok(m) => m,
                    Err(_) => break,
                },
            };

            match msg {
                Msg::Tick => self.settle(),
                Msg::Intent(event) => {
                    let outcome = self.debouncer.on_intent(event);
                    if let Some(d) = outcome.flushed {
                        // Arming never records, so the machine still holds the flushed command.
                        self.dispatch(d, self.debouncer.motor_state());
                    }
                    debug!(source = ?event.source, transition = ?outcome.transition, "intent handled");
                }
                Msg::Command(direction) => {
                    let now = self.clock.now();
                    let outcome = self.debouncer.command_now(direction, now);
                    if let Some(d) = outcome.preempted {
                        self.dispatch(d, MotorState::commanded(d, now));
                    }
                    self.dispatch(outcome.command, self.debouncer.motor_state());
                }
                Msg::ReadPosition(reply) => {
                    let _ = reply.send(self.controller.read_position());
                }
                Msg::Sync(reply) => {
                    // Settle anything already due so callers observe it.
                    self.settle();
                    let _ = reply.send(());
                }
                Msg::Shutdown => {
                    debug!("actuator received shutdown");
                    break;
                }
            }
        }
        trace!("actuator thread exiting");
    }

    fn settle(&mut self) {
        if let Some(d) = self.debouncer.fire_due(self.clock.now()) {
            self.dispatch(d, self.debouncer.motor_state());
        }
    }

    /// Write one command, then publish `state` for it.
    fn dispatch(&mut self, direction: Direction, state: MotorState) {
        let written = self.controller.set_open(direction);
        *lock(&self.motor_state) = state;
        if written {
            self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
            info!(%direction, "camera motor actuated");
        } else {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
