//! Backend selection: sysfs registers or the in-process simulator.

use std::sync::Arc;

use camhelper_config::{Config, MotorPaths};
use camhelper_hardware::{CommandHome, RegisterPaths, SimulatedMotor, SysfsMotor};
use camhelper_traits::{ForegroundExit, MotorPort};
use eyre::eyre;

use crate::output::{Printer, StdoutHome};

pub fn register_paths(m: &MotorPaths) -> RegisterPaths {
    RegisterPaths {
        hall_calibration: m.hall_calibration.clone(),
        enable: m.enable.clone(),
        direction: m.direction.clone(),
        position: m.position.clone(),
    }
}

pub fn motor_port(cfg: &Config, sim: bool) -> Box<dyn MotorPort + Send> {
    if sim {
        tracing::info!("using simulated motor");
        Box::new(SimulatedMotor::new())
    } else {
        let paths = register_paths(&cfg.motor);
        tracing::info!(position = %paths.position.display(), "using sysfs motor");
        Box::new(SysfsMotor::new(paths))
    }
}

pub fn foreground_exit(
    cfg: &Config,
    sim: bool,
    printer: Printer,
) -> eyre::Result<Arc<dyn ForegroundExit + Send + Sync>> {
    if sim {
        return Ok(Arc::new(StdoutHome(printer)));
    }
    let home = CommandHome::from_argv(&cfg.home.command)
        .ok_or_else(|| eyre!("invalid configuration: home.command is empty"))?;
    Ok(Arc::new(home))
}
