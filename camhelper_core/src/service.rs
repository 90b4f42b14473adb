//! Composition root: one motor, one actuator thread, and the three event
//! producers feeding it.

use camhelper_traits::FallSensor;
use tracing::info;

use crate::actuator::{Actuator, ActuatorHandle, ActuatorStats};
use crate::advisor::{
    AbnormalStateAdvisor, Advisory, AdvisoryId, KeyDisposition, KeyEvent, RecoveryDecision,
    UserChoice,
};
use crate::builder::{CameraMotorServiceBuilder, Missing};
use crate::calibration::CalibrationOutcome;
use crate::camera::CameraAvailabilityListener;
use crate::config::ServiceCfg;
use crate::error::CamError;
use crate::fall::FallTrigger;
use crate::types::{DisplayPower, MotorState, PositionCode};

pub struct CameraMotorService {
    camera: CameraAvailabilityListener,
    fall: FallTrigger<Box<dyn FallSensor + Send>>,
    advisor: AbnormalStateAdvisor,
    // Declared last so producers are torn down before the worker is joined.
    actuator: Actuator,
    calibration: CalibrationOutcome,
    cfg: ServiceCfg,
}

impl core::fmt::Debug for CameraMotorService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CameraMotorService")
            .field("cfg", &self.cfg)
            .field("calibration", &self.calibration)
            .field("fall_enabled", &self.fall.is_enabled())
            .field("motor_state", &self.actuator.motor_state())
            .finish()
    }
}

impl CameraMotorService {
    pub fn builder() -> CameraMotorServiceBuilder<Missing> {
        CameraMotorServiceBuilder::default()
    }

    pub(crate) fn from_parts(
        actuator: Actuator,
        camera: CameraAvailabilityListener,
        fall: FallTrigger<Box<dyn FallSensor + Send>>,
        advisor: AbnormalStateAdvisor,
        calibration: CalibrationOutcome,
        cfg: ServiceCfg,
    ) -> Self {
        Self {
            camera,
            fall,
            advisor,
            actuator,
            calibration,
            cfg,
        }
    }

    pub fn config(&self) -> &ServiceCfg {
        &self.cfg
    }

    /// What the boot-time calibration step did.
    pub fn calibration(&self) -> CalibrationOutcome {
        self.calibration
    }

    pub fn camera(&self) -> &CameraAvailabilityListener {
        &self.camera
    }

    pub fn on_camera_available(&self, camera_id: &str) -> bool {
        self.camera.on_camera_available(camera_id)
    }

    pub fn on_camera_unavailable(&self, camera_id: &str) -> bool {
        self.camera.on_camera_unavailable(camera_id)
    }

    pub fn on_display_power(&self, power: DisplayPower) {
        self.fall.on_display_power(power);
    }

    pub fn fall_enabled(&self) -> bool {
        self.fall.is_enabled()
    }

    pub fn handle_key(&self, event: KeyEvent) -> KeyDisposition {
        self.advisor.handle_key(event)
    }

    pub fn pending_advisory(&self) -> Option<Advisory> {
        self.advisor.pending()
    }

    pub fn resolve(&self, id: AdvisoryId, choice: UserChoice) -> Result<RecoveryDecision, CamError> {
        self.advisor.resolve(id, choice)
    }

    /// Handle for waking and synchronizing with the actuator thread.
    pub fn actuator(&self) -> ActuatorHandle {
        self.actuator.handle()
    }

    pub fn motor_state(&self) -> MotorState {
        self.actuator.motor_state()
    }

    pub fn stats(&self) -> ActuatorStats {
        self.actuator.stats()
    }

    pub fn read_position(&self) -> Result<Option<PositionCode>, CamError> {
        self.actuator.handle().read_position()
    }

    /// `None` when the position register cannot be read or parsed.
    pub fn is_open(&self) -> Option<bool> {
        self.actuator.handle().is_open()
    }

    /// Unregister the fall listener and join the actuator. Same as dropping.
    pub fn stop(self) {}
}

impl Drop for CameraMotorService {
    fn drop(&mut self) {
        self.fall.disable();
        info!(stats = ?self.actuator.stats(), "camera motor service stopping");
    }
}
