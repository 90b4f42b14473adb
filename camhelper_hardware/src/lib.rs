pub mod error;
pub mod home;
pub mod sysfs;
pub mod util;

use camhelper_traits::{BoxError, FallListener, FallSensor, MotorPort};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use home::CommandHome;
pub use sysfs::{RegisterPaths, SysfsMotor};

use crate::error::HwError;

/// Position code reported by the simulated driver when the lens is down.
pub const SIM_POSITION_RETRACTED: &str = "1";
/// Position code reported by the simulated driver when the lens is up.
pub const SIM_POSITION_EXTENDED: &str = "0";

/// One write that reached a (simulated) register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterWrite {
    Calibration(String),
    Direction(bool),
    Enable,
}

#[derive(Debug)]
struct SimMotorState {
    writes: Vec<RegisterWrite>,
    direction: bool,
    extended: bool,
    jammed: bool,
    fail_writes: bool,
    fail_reads: bool,
}

/// Simulated motor implementation.
///
/// Clones share state, so a test keeps one handle to inspect the write log
/// while the controller owns another.
#[derive(Debug, Clone)]
pub struct SimulatedMotor {
    state: Arc<Mutex<SimMotorState>>,
}

impl Default for SimulatedMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedMotor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimMotorState {
                writes: Vec::new(),
                direction: false,
                extended: false,
                jammed: false,
                fail_writes: false,
                fail_reads: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimMotorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every register write so far, in order.
    pub fn writes(&self) -> Vec<RegisterWrite> {
        self.lock().writes.clone()
    }

    /// Direction latched at each enable pulse, i.e. the actuation commands.
    pub fn actuations(&self) -> Vec<bool> {
        let st = self.lock();
        let mut dir = false;
        let mut out = Vec::new();
        for w in &st.writes {
            match w {
                RegisterWrite::Direction(d) => dir = *d,
                RegisterWrite::Enable => out.push(dir),
                RegisterWrite::Calibration(_) => {}
            }
        }
        out
    }

    /// Last calibration string programmed, if any.
    pub fn calibration(&self) -> Option<String> {
        self.lock().writes.iter().rev().find_map(|w| match w {
            RegisterWrite::Calibration(c) => Some(c.clone()),
            _ => None,
        })
    }

    pub fn is_extended(&self) -> bool {
        self.lock().extended
    }

    /// A jammed motor accepts commands but never moves.
    pub fn set_jammed(&self, jammed: bool) {
        self.lock().jammed = jammed;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }
}

impl MotorPort for SimulatedMotor {
    fn write_calibration(&mut self, record: &str) -> Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_writes {
            return Err(Box::new(HwError::Injected("calibration write")));
        }
        st.writes.push(RegisterWrite::Calibration(record.to_string()));
        Ok(())
    }

    fn set_direction(&mut self, open: bool) -> Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_writes {
            return Err(Box::new(HwError::Injected("direction write")));
        }
        st.direction = open;
        st.writes.push(RegisterWrite::Direction(open));
        Ok(())
    }

    fn enable_actuation(&mut self) -> Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_writes {
            return Err(Box::new(HwError::Injected("enable write")));
        }
        st.writes.push(RegisterWrite::Enable);
        if !st.jammed {
            st.extended = st.direction;
        }
        tracing::debug!(open = st.direction, jammed = st.jammed, "simulated stroke");
        Ok(())
    }

    fn read_position(&mut self) -> Result<String, BoxError> {
        let st = self.lock();
        if st.fail_reads {
            return Err(Box::new(HwError::Injected("position read")));
        }
        let code = if st.extended {
            SIM_POSITION_EXTENDED
        } else {
            SIM_POSITION_RETRACTED
        };
        Ok(code.to_string())
    }
}

#[derive(Default)]
struct SimFallState {
    listener: Option<FallListener>,
    registrations: usize,
    fail_register: bool,
}

/// Simulated fall detector; `trigger()` plays the part of a detected fall.
#[derive(Clone, Default)]
pub struct SimulatedFallSensor {
    state: Arc<Mutex<SimFallState>>,
}

impl std::fmt::Debug for SimulatedFallSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedFallSensor")
            .field("registered", &self.is_registered())
            .field("registrations", &self.registrations())
            .finish()
    }
}

impl SimulatedFallSensor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimFallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver one fall to the registered listener. Returns whether anyone heard it.
    pub fn trigger(&self) -> bool {
        let st = self.lock();
        match st.listener.as_ref() {
            Some(listener) => {
                listener();
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.lock().listener.is_some()
    }

    /// Total number of successful `register` calls over the sensor's lifetime.
    pub fn registrations(&self) -> usize {
        self.lock().registrations
    }

    pub fn set_fail_register(&self, fail: bool) {
        self.lock().fail_register = fail;
    }
}

impl FallSensor for SimulatedFallSensor {
    fn register(&mut self, listener: FallListener) -> Result<(), BoxError> {
        let mut st = self.lock();
        if st.fail_register {
            return Err(Box::new(HwError::Injected("fall sensor register")));
        }
        st.listener = Some(listener);
        st.registrations += 1;
        Ok(())
    }

    fn unregister(&mut self) -> Result<(), BoxError> {
        self.lock().listener = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn simulated_motor_follows_last_actuation() {
        let mut motor = SimulatedMotor::new();
        assert_eq!(motor.read_position().unwrap(), SIM_POSITION_RETRACTED);

        motor.set_direction(true).unwrap();
        assert!(!motor.is_extended(), "direction alone must not move");
        motor.enable_actuation().unwrap();
        assert_eq!(motor.read_position().unwrap(), SIM_POSITION_EXTENDED);

        motor.set_direction(false).unwrap();
        motor.enable_actuation().unwrap();
        assert_eq!(motor.actuations(), vec![true, false]);
    }

    #[test]
    fn jammed_motor_stays_put() {
        let mut motor = SimulatedMotor::new();
        motor.set_jammed(true);
        motor.set_direction(true).unwrap();
        motor.enable_actuation().unwrap();
        assert!(!motor.is_extended());
        assert_eq!(motor.actuations(), vec![true]);
    }

    #[test]
    fn injected_faults_surface_as_errors() {
        let mut motor = SimulatedMotor::new();
        motor.set_fail_writes(true);
        assert!(motor.set_direction(true).is_err());
        assert!(motor.writes().is_empty());

        motor.set_fail_reads(true);
        let err = motor.read_position().unwrap_err();
        assert!(err.to_string().contains("position read"));
    }

    #[test]
    fn fall_sensor_delivers_to_single_listener() {
        let mut sensor = SimulatedFallSensor::new();
        assert!(!sensor.trigger());

        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        sensor
            .register(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert!(sensor.trigger());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sensor.unregister().unwrap();
        assert!(!sensor.trigger());
        assert_eq!(sensor.registrations(), 1);
    }
}
