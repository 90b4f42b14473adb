//! Motor driver exposed by the kernel as four sysfs attributes.
use std::path::PathBuf;

use camhelper_traits::{BoxError, MotorPort};
use tracing::trace;

use crate::util::{read_first_line, write_register};

pub const DEFAULT_HALL_CALIBRATION_PATH: &str = "/sys/class/motor/hall_calibration";
pub const DEFAULT_ENABLE_PATH: &str = "/sys/class/motor/enable";
pub const DEFAULT_DIRECTION_PATH: &str = "/sys/class/motor/direction";
pub const DEFAULT_POSITION_PATH: &str = "/sys/class/motor/position";

/// Locations of the motor control attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPaths {
    pub hall_calibration: PathBuf,
    pub enable: PathBuf,
    pub direction: PathBuf,
    pub position: PathBuf,
}

impl Default for RegisterPaths {
    fn default() -> Self {
        Self {
            hall_calibration: PathBuf::from(DEFAULT_HALL_CALIBRATION_PATH),
            enable: PathBuf::from(DEFAULT_ENABLE_PATH),
            direction: PathBuf::from(DEFAULT_DIRECTION_PATH),
            position: PathBuf::from(DEFAULT_POSITION_PATH),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SysfsMotor {
    paths: RegisterPaths,
}

impl SysfsMotor {
    pub fn new(paths: RegisterPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &RegisterPaths {
        &self.paths
    }
}

impl Default for SysfsMotor {
    fn default() -> Self {
        Self::new(RegisterPaths::default())
    }
}

impl MotorPort for SysfsMotor {
    fn write_calibration(&mut self, record: &str) -> Result<(), BoxError> {
        trace!(record, "write hall calibration");
        write_register(&self.paths.hall_calibration, record)?;
        Ok(())
    }

    fn set_direction(&mut self, open: bool) -> Result<(), BoxError> {
        write_register(&self.paths.direction, if open { "1" } else { "0" })?;
        Ok(())
    }

    fn enable_actuation(&mut self) -> Result<(), BoxError> {
        write_register(&self.paths.enable, "1")?;
        Ok(())
    }

    fn read_position(&mut self) -> Result<String, BoxError> {
        let raw = read_first_line(&self.paths.position)?;
        trace!(raw = %raw, "motor position");
        Ok(raw)
    }
}
