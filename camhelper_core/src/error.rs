use thiserror::Error;

use crate::advisor::AdvisoryId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CamError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("advisory {0} is no longer pending")]
    StaleAdvisory(AdvisoryId),
    #[error("unknown choice {0:?}")]
    UnknownChoice(String),
    #[error("choice {choice} is not offered by advisory {id}")]
    InvalidChoice { id: AdvisoryId, choice: String },
    #[error("actuator is shut down")]
    ActuatorStopped,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing motor port")]
    MissingMotor,
    #[error("missing fall sensor")]
    MissingFallSensor,
    #[error("missing advisory presenter")]
    MissingPresenter,
    #[error("missing foreground exit")]
    MissingForegroundExit,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
