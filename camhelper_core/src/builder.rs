//! Type-state builder for `CameraMotorService`.
//!
//! `start()` is only available once a motor port is set; `try_start()` is
//! always available and reports every other missing piece as a `BuildError`.

use std::marker::PhantomData;
use std::sync::Arc;

use camhelper_traits::clock::{Clock, MonotonicClock};
use camhelper_traits::{FallSensor, ForegroundExit, MotorPort};
use tracing::info;

use crate::actuator::{Actuator, CommandSink, IntentSink};
use crate::advisor::{AbnormalStateAdvisor, AdvisoryPresenter};
use crate::calibration::{CalibrationLoader, CalibrationSource, FixedCalibrationSource};
use crate::camera::CameraAvailabilityListener;
use crate::config::ServiceCfg;
use crate::controller::MotorController;
use crate::error::{BuildError, Result};
use crate::fall::FallTrigger;
use crate::service::CameraMotorService;

pub struct Missing;
pub struct Set;

pub struct CameraMotorServiceBuilder<P> {
    port: Option<Box<dyn MotorPort + Send>>,
    fall_sensor: Option<Box<dyn FallSensor + Send>>,
    presenter: Option<Arc<dyn AdvisoryPresenter>>,
    home: Option<Arc<dyn ForegroundExit + Send + Sync>>,
    calibration: Option<Box<dyn CalibrationSource>>,
    cfg: Option<ServiceCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    _p: PhantomData<P>,
}

impl Default for CameraMotorServiceBuilder<Missing> {
    fn default() -> Self {
        Self {
            port: None,
            fall_sensor: None,
            presenter: None,
            home: None,
            calibration: None,
            cfg: None,
            clock: None,
            _p: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn validate(cfg: &ServiceCfg) -> Result<()> {
    if cfg.window.is_zero() {
        return Err(invalid("debounce window must be > 0"));
    }
    if cfg.front_camera_id.trim().is_empty() {
        return Err(invalid("front camera id must not be empty"));
    }
    let k = cfg.keys;
    if k.manual_to_down == k.up_abnormal
        || k.manual_to_down == k.down_abnormal
        || k.up_abnormal == k.down_abnormal
    {
        return Err(invalid("fault key codes must be distinct"));
    }
    Ok(())
}

impl<P> CameraMotorServiceBuilder<P> {
    /// Fallible start available in any type-state.
    ///
    /// Order matters: calibration is programmed before the actuator thread
    /// exists, so no stroke can precede it.
    pub fn try_start(self) -> Result<CameraMotorService> {
        let port = self
            .port
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotor))?;
        let fall_sensor = self
            .fall_sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingFallSensor))?;
        let presenter = self
            .presenter
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPresenter))?;
        let home = self
            .home
            .ok_or_else(|| eyre::Report::new(BuildError::MissingForegroundExit))?;
        let cfg = self.cfg.unwrap_or_default();
        validate(&cfg)?;

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };
        let source: Box<dyn CalibrationSource> = match self.calibration {
            Some(s) => s,
            None => Box::new(FixedCalibrationSource(None)),
        };

        let mut controller = MotorController::new(port);
        let calibration = CalibrationLoader::new(source).load_and_apply(&mut controller);

        let actuator = Actuator::spawn(controller, cfg.window, clock.clone())?;
        let handle = Arc::new(actuator.handle());
        let intents: Arc<dyn IntentSink> = handle.clone();
        let commands: Arc<dyn CommandSink> = handle;

        let camera =
            CameraAvailabilityListener::new(cfg.front_camera_id.clone(), intents.clone(), clock.clone());
        let fall = FallTrigger::new(fall_sensor, intents, clock);
        fall.enable();
        let advisor = AbnormalStateAdvisor::new(cfg.keys, commands, presenter, home);

        info!(front_camera = %cfg.front_camera_id, "camera motor service started");
        Ok(CameraMotorService::from_parts(
            actuator,
            camera,
            fall,
            advisor,
            calibration,
            cfg,
        ))
    }
}

/// Chainable setters that do not affect type-state.
impl<P> CameraMotorServiceBuilder<P> {
    pub fn with_fall_sensor(mut self, sensor: impl FallSensor + Send + 'static) -> Self {
        self.fall_sensor = Some(Box::new(sensor));
        self
    }
    pub fn with_presenter(mut self, presenter: Arc<dyn AdvisoryPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }
    pub fn with_home(mut self, home: Arc<dyn ForegroundExit + Send + Sync>) -> Self {
        self.home = Some(home);
        self
    }
    /// Defaults to a source that always falls back to the factory record.
    pub fn with_calibration_source(mut self, source: impl CalibrationSource + 'static) -> Self {
        self.calibration = Some(Box::new(source));
        self
    }
    pub fn with_config(mut self, cfg: ServiceCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }
    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl CameraMotorServiceBuilder<Missing> {
    pub fn with_port(self, port: impl MotorPort + Send + 'static) -> CameraMotorServiceBuilder<Set> {
        CameraMotorServiceBuilder {
            port: Some(Box::new(port)),
            fall_sensor: self.fall_sensor,
            presenter: self.presenter,
            home: self.home,
            calibration: self.calibration,
            cfg: self.cfg,
            clock: self.clock,
            _p: PhantomData,
        }
    }
}

impl CameraMotorServiceBuilder<Set> {
    pub fn start(self) -> Result<CameraMotorService> {
        self.try_start()
    }
}
