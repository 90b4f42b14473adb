#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Retractable front camera control (hardware-agnostic).
//!
//! All hardware goes through the `camhelper_traits` seams: `MotorPort` for
//! the lift driver registers, `FallSensor` for drop detection and
//! `ForegroundExit` for leaving the camera app.
//!
//! ## Architecture
//!
//! - **Calibration**: hall-sensor record programmed once at boot (`calibration`)
//! - **Debounce**: camera intents settle for a window before actuating (`debouncer`)
//! - **Actuation**: a single worker thread owns the motor (`actuator`)
//! - **Producers**: camera availability, fall detection, fault keys
//!   (`camera`, `fall`, `advisor`)
//! - **Composition**: `CameraMotorService` wires everything (`builder`, `service`)
//!
//! A close raised by the fall detector is never suppressed: once armed it
//! reaches the motor no matter what the camera reports in the meantime.

pub mod actuator;
pub mod advisor;
pub mod builder;
pub mod calibration;
pub mod camera;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod debouncer;
pub mod error;
pub mod fall;
pub mod hw_error;
pub mod mocks;
pub mod service;
pub mod timer;
pub mod types;
pub mod util;

pub use actuator::{Actuator, ActuatorHandle, ActuatorStats, CommandSink, IntentSink};
pub use advisor::{
    AbnormalStateAdvisor, Advisory, AdvisoryId, AdvisoryPresenter, FaultCode, KeyAction,
    KeyDisposition, KeyEvent, KeyMap, RecoveryDecision, UserChoice,
};
pub use builder::CameraMotorServiceBuilder;
pub use calibration::{
    CalibrationLoader, CalibrationOutcome, CalibrationSource, FileCalibrationSource,
    FixedCalibrationSource, RecordOrigin,
};
pub use camera::CameraAvailabilityListener;
pub use config::ServiceCfg;
pub use controller::MotorController;
pub use debouncer::{DEFAULT_WINDOW, MotorDebouncer};
pub use error::{BuildError, CamError, Result};
pub use fall::FallTrigger;
pub use service::CameraMotorService;
pub use types::{Direction, DisplayPower, IntentSource, MotorState, PositionCode, RawIntentEvent};
