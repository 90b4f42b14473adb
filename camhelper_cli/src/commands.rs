//! One-shot subcommands: calibrate, position, actuate, self-check.

use camhelper_config::Config;
use camhelper_core::{
    CalibrationLoader, CalibrationOutcome, CamError, Direction, FileCalibrationSource,
    MotorController, RecordOrigin,
};
use serde_json::json;

use crate::hw::{foreground_exit, motor_port};
use crate::output::{Printer, position_name};

fn origin_name(origin: RecordOrigin) -> &'static str {
    match origin {
        RecordOrigin::Persisted => "persisted",
        RecordOrigin::Default => "default",
    }
}

pub fn calibrate(cfg: &Config, sim: bool, printer: Printer) -> eyre::Result<()> {
    let mut ctl = MotorController::new(motor_port(cfg, sim));
    let loader =
        CalibrationLoader::new(FileCalibrationSource::new(cfg.calibration.persist_path.clone()));
    match loader.load_and_apply(&mut ctl) {
        CalibrationOutcome::Applied {
            record,
            origin,
            written,
        } => {
            if !written {
                return Err(eyre::Report::new(CamError::Hardware(
                    "hall calibration write failed".into(),
                )));
            }
            printer.emit(
                json!({
                    "event": "calibrated",
                    "origin": origin_name(origin),
                    "record": record.to_string(),
                }),
                || format!("calibrated origin={} record={record}", origin_name(origin)),
            );
        }
        CalibrationOutcome::AlreadyApplied => {
            printer.emit(json!({ "event": "calibrated", "origin": null }), || {
                "calibration already applied".to_string()
            });
        }
    }
    Ok(())
}

pub fn position(cfg: &Config, sim: bool, printer: Printer) -> eyre::Result<()> {
    let mut ctl = MotorController::new(motor_port(cfg, sim));
    let code = ctl.read_position();
    let name = position_name(code.map(|c| !c.is_retracted()));
    printer.emit(
        json!({ "position": name, "code": code.map(|c| c.0) }),
        || name.to_string(),
    );
    Ok(())
}

pub fn actuate(cfg: &Config, sim: bool, direction: Direction, printer: Printer) -> eyre::Result<()> {
    let mut ctl = MotorController::new(motor_port(cfg, sim));
    if !ctl.set_open(direction) {
        return Err(eyre::Report::new(CamError::Hardware(format!(
            "{direction} stroke could not be started"
        ))));
    }
    printer.emit(
        json!({ "event": "actuated", "direction": direction.to_string() }),
        || format!("actuated {direction}"),
    );
    Ok(())
}

pub fn self_check(cfg: &Config, sim: bool, printer: Printer) -> eyre::Result<()> {
    foreground_exit(cfg, sim, printer)?;
    let mut ctl = MotorController::new(motor_port(cfg, sim));
    let Some(code) = ctl.read_position() else {
        return Err(eyre::Report::new(CamError::Io(format!(
            "position register {} unreadable",
            cfg.motor.position.display()
        ))));
    };
    let name = position_name(Some(!code.is_retracted()));
    printer.emit(
        json!({ "status": "ok", "position": name }),
        || format!("ok position={name}"),
    );
    Ok(())
}
