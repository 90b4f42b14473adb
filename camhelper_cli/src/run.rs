//! `run`: the service driven by a line protocol on stdin.

use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use camhelper_config::Config;
use camhelper_core::{
    AdvisoryId, CameraMotorService, DisplayPower, FileCalibrationSource, KeyAction, KeyEvent,
    ServiceCfg, UserChoice,
};
use camhelper_hardware::SimulatedFallSensor;
use crossbeam_channel as xch;
use eyre::{WrapErr, bail, eyre};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::hw::{foreground_exit, motor_port};
use crate::output::{Printer, StdoutPresenter, position_name};

/// One stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCmd {
    Available(String),
    Unavailable(String),
    Fall,
    Screen(DisplayPower),
    Key(KeyEvent),
    Choose(AdvisoryId, UserChoice),
    Wait(Duration),
    Status,
    Quit,
}

impl FromStr for LineCmd {
    type Err = eyre::Report;

    fn from_str(line: &str) -> eyre::Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let cmd = match words.as_slice() {
            ["available", id] => LineCmd::Available((*id).to_string()),
            ["unavailable", id] => LineCmd::Unavailable((*id).to_string()),
            ["fall"] => LineCmd::Fall,
            ["screen", "on"] => LineCmd::Screen(DisplayPower::On),
            ["screen", "off"] => LineCmd::Screen(DisplayPower::Off),
            ["key", scan, action] => {
                let scan_code = scan
                    .parse::<u16>()
                    .wrap_err_with(|| format!("bad scan code {scan:?}"))?;
                let action = match *action {
                    "down" => KeyAction::Pressed,
                    "up" => KeyAction::Released,
                    other => bail!("key action must be down|up, got {other:?}"),
                };
                LineCmd::Key(KeyEvent { scan_code, action })
            }
            ["choose", id, choice] => {
                let id = id
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .wrap_err_with(|| format!("bad advisory id {id:?}"))?;
                LineCmd::Choose(AdvisoryId(id), choice.parse::<UserChoice>()?)
            }
            ["wait", ms] => LineCmd::Wait(Duration::from_millis(
                ms.parse::<u64>()
                    .wrap_err_with(|| format!("bad wait {ms:?}"))?,
            )),
            ["status"] => LineCmd::Status,
            ["quit"] | ["exit"] => LineCmd::Quit,
            _ => bail!("unrecognized line {line:?}"),
        };
        Ok(cmd)
    }
}

struct Session {
    svc: CameraMotorService,
    fall: SimulatedFallSensor,
    printer: Printer,
}

impl Session {
    /// Returns false once the session should end.
    fn apply(&self, cmd: LineCmd) -> bool {
        debug!(?cmd, "line command");
        match cmd {
            LineCmd::Available(id) => self.camera(&id, self.svc.on_camera_available(&id)),
            LineCmd::Unavailable(id) => self.camera(&id, self.svc.on_camera_unavailable(&id)),
            LineCmd::Fall => {
                let heard = self.fall.trigger();
                self.printer
                    .emit(json!({ "event": "fall", "armed": heard }), || {
                        if heard {
                            "fall".to_string()
                        } else {
                            "fall ignored (screen off)".to_string()
                        }
                    });
            }
            LineCmd::Screen(power) => self.svc.on_display_power(power),
            LineCmd::Key(ev) => {
                self.svc.handle_key(ev);
            }
            LineCmd::Choose(id, choice) => match self.svc.resolve(id, choice) {
                Ok(decision) => self.printer.emit(
                    json!({ "event": "resolved", "id": id.0, "decision": decision.as_str() }),
                    || format!("resolved {id} {}", decision.as_str()),
                ),
                Err(e) => self.error(&e.to_string()),
            },
            LineCmd::Wait(d) => {
                std::thread::sleep(d);
                if let Err(e) = self.svc.actuator().sync() {
                    self.error(&e.to_string());
                }
            }
            LineCmd::Status => self.status(),
            LineCmd::Quit => return false,
        }
        true
    }

    fn camera(&self, id: &str, accepted: bool) {
        if !accepted {
            debug!(camera_id = id, "not the front camera");
        }
    }

    fn status(&self) {
        if let Err(e) = self.svc.actuator().sync() {
            self.error(&e.to_string());
            return;
        }
        let open = position_name(self.svc.is_open());
        let commanded = match self.svc.motor_state().commanded_open {
            Some(true) => "open",
            Some(false) => "closed",
            None => "none",
        };
        let stats = self.svc.stats();
        let fall = self.svc.fall_enabled();
        let pending = self.svc.pending_advisory().map(|a| a.id);
        self.printer.emit(
            json!({
                "event": "status",
                "position": open,
                "commanded": commanded,
                "fall_armed": fall,
                "dispatched": stats.dispatched,
                "failed": stats.failed,
                "pending_advisory": pending.map(|id| id.0),
            }),
            || {
                format!(
                    "status position={open} commanded={commanded} fall={} dispatched={} failed={} pending={}",
                    if fall { "on" } else { "off" },
                    stats.dispatched,
                    stats.failed,
                    pending.map_or_else(|| "none".to_string(), |id| id.to_string()),
                )
            },
        );
    }

    fn error(&self, msg: &str) {
        warn!(error = msg, "line rejected");
        self.printer
            .emit(json!({ "event": "error", "message": msg }), || {
                format!("error: {msg}")
            });
    }
}

pub fn run(cfg: &Config, sim: bool, printer: Printer) -> eyre::Result<()> {
    let fall = SimulatedFallSensor::new();
    let svc = CameraMotorService::builder()
        .with_port(motor_port(cfg, sim))
        .with_fall_sensor(fall.clone())
        .with_presenter(Arc::new(StdoutPresenter(printer)))
        .with_home(foreground_exit(cfg, sim, printer)?)
        .with_calibration_source(FileCalibrationSource::new(
            cfg.calibration.persist_path.clone(),
        ))
        .with_config(ServiceCfg::from(cfg))
        .start()?;
    let session = Session { svc, fall, printer };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .map_err(|e| eyre!("install Ctrl-C handler: {e}"))?;
    }

    let (tx, rx) = xch::unbounded::<String>();
    std::thread::Builder::new()
        .name("camhelper-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .wrap_err("spawn stdin reader")?;

    info!("reading events from stdin");
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("interrupted");
            break;
        }
        let line = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => line,
            Err(xch::RecvTimeoutError::Timeout) => continue,
            Err(xch::RecvTimeoutError::Disconnected) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.parse::<LineCmd>() {
            Ok(cmd) => {
                if !session.apply(cmd) {
                    break;
                }
            }
            Err(e) => session.error(&format!("{e:#}")),
        }
    }

    // Let anything already settled reach the motor before stopping.
    if let Err(e) = session.svc.actuator().sync() {
        warn!(error = %e, "final settle skipped");
    }
    session.svc.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("available 1", LineCmd::Available("1".into()))]
    #[case("unavailable  0", LineCmd::Unavailable("0".into()))]
    #[case("fall", LineCmd::Fall)]
    #[case("screen off", LineCmd::Screen(DisplayPower::Off))]
    #[case("key 186 down", LineCmd::Key(KeyEvent { scan_code: 186, action: KeyAction::Pressed }))]
    #[case("key 184 up", LineCmd::Key(KeyEvent { scan_code: 184, action: KeyAction::Released }))]
    #[case("choose #2 retry", LineCmd::Choose(AdvisoryId(2), UserChoice::Retry))]
    #[case("choose 3 OK", LineCmd::Choose(AdvisoryId(3), UserChoice::Ok))]
    #[case("wait 150", LineCmd::Wait(Duration::from_millis(150)))]
    #[case("status", LineCmd::Status)]
    #[case("quit", LineCmd::Quit)]
    fn parses_lines(#[case] line: &str, #[case] expected: LineCmd) {
        assert_eq!(line.parse::<LineCmd>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("available")]
    #[case("screen dim")]
    #[case("key abc down")]
    #[case("key 186 sideways")]
    #[case("choose x retry")]
    #[case("choose 1 later")]
    #[case("wait soon")]
    fn rejects_malformed_lines(#[case] line: &str) {
        assert!(line.parse::<LineCmd>().is_err());
    }
}
