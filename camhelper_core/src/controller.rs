//! Logged, non-fatal wrapper over a raw `MotorPort`.
//!
//! Every write reports success as a `bool` and logs failures; nothing here
//! returns an error or panics, so callers on the control path never stall
//! on I/O. Reads degrade to `None` ("position unknown").

use camhelper_config::CalibrationRecord;
use camhelper_traits::MotorPort;
use tracing::{debug, error, warn};

use crate::hw_error::map_hw_error;
use crate::types::{Direction, PositionCode};

pub struct MotorController<P: MotorPort> {
    port: P,
}

impl<P: MotorPort> core::fmt::Debug for MotorController<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotorController").finish_non_exhaustive()
    }
}

impl<P: MotorPort> MotorController<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn write_calibration(&mut self, record: &CalibrationRecord) -> bool {
        let text = record.to_string();
        match self.port.write_calibration(&text) {
            Ok(()) => {
                debug!(record = %text, "hall calibration written");
                true
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                error!(error = %err, "failed to write hall calibration");
                false
            }
        }
    }

    pub fn set_direction(&mut self, open: bool) -> bool {
        match self.port.set_direction(open) {
            Ok(()) => true,
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                error!(error = %err, open, "failed to write motor direction");
                false
            }
        }
    }

    pub fn enable_actuation(&mut self) -> bool {
        match self.port.enable_actuation() {
            Ok(()) => true,
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                error!(error = %err, "failed to enable motor");
                false
            }
        }
    }

    /// One actuation command: direction, then enable.
    ///
    /// The enable write is skipped when the direction write failed, since
    /// the latched direction is then unknown.
    pub fn set_open(&mut self, direction: Direction) -> bool {
        let open = direction.is_open();
        if !self.set_direction(open) {
            warn!(%direction, "direction unknown, not enabling motor");
            return false;
        }
        let ok = self.enable_actuation();
        if ok {
            debug!(%direction, "actuation dispatched");
        }
        ok
    }

    pub fn read_position(&mut self) -> Option<PositionCode> {
        match self.port.read_position() {
            Ok(raw) => {
                let code = PositionCode::parse(&raw);
                if code.is_none() {
                    warn!(raw = %raw, "unparsable motor position");
                }
                code
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                error!(error = %err, "failed to read motor position");
                None
            }
        }
    }

    /// `Some(true)` when the lens is anywhere but fully retracted,
    /// `None` when the position cannot be determined.
    pub fn is_open(&mut self) -> Option<bool> {
        self.read_position().map(|code| !code.is_retracted())
    }
}
