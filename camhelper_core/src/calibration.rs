//! Boot-time hall-sensor calibration.

use std::path::PathBuf;
use std::sync::Once;

use camhelper_config::{CalibrationRecord, load_calibration_record};
use camhelper_traits::MotorPort;
use tracing::{info, warn};

use crate::controller::MotorController;

/// Where a persisted calibration record comes from.
pub trait CalibrationSource {
    fn load(&self) -> eyre::Result<CalibrationRecord>;
}

impl<S: CalibrationSource + ?Sized> CalibrationSource for Box<S> {
    fn load(&self) -> eyre::Result<CalibrationRecord> {
        (**self).load()
    }
}

/// Record stored in a file (one CSV line).
#[derive(Debug, Clone)]
pub struct FileCalibrationSource {
    path: PathBuf,
}

impl FileCalibrationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CalibrationSource for FileCalibrationSource {
    fn load(&self) -> eyre::Result<CalibrationRecord> {
        load_calibration_record(&self.path)
    }
}

/// In-memory record, or a guaranteed failure when `None`.
#[derive(Debug, Clone, Default)]
pub struct FixedCalibrationSource(pub Option<CalibrationRecord>);

impl CalibrationSource for FixedCalibrationSource {
    fn load(&self) -> eyre::Result<CalibrationRecord> {
        self.0
            .ok_or_else(|| eyre::eyre!("no persisted calibration record"))
    }
}

/// Which record ended up programmed into the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOrigin {
    Persisted,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    Applied {
        record: CalibrationRecord,
        origin: RecordOrigin,
        written: bool,
    },
    AlreadyApplied,
}

/// Loads the persisted record (falling back to the factory default) and
/// programs it into the driver. A loader applies at most once.
pub struct CalibrationLoader<S: CalibrationSource> {
    source: S,
    once: Once,
}

impl<S: CalibrationSource> CalibrationLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            once: Once::new(),
        }
    }

    /// Pick the record to program. Never fails.
    pub fn resolve(&self) -> (CalibrationRecord, RecordOrigin) {
        match self.source.load() {
            Ok(record) => (record, RecordOrigin::Persisted),
            Err(e) => {
                warn!(error = %e, "persisted hall calibration unusable, using default");
                (CalibrationRecord::default(), RecordOrigin::Default)
            }
        }
    }

    pub fn load_and_apply<P: MotorPort>(
        &self,
        controller: &mut MotorController<P>,
    ) -> CalibrationOutcome {
        let mut outcome = CalibrationOutcome::AlreadyApplied;
        self.once.call_once(|| {
            let (record, origin) = self.resolve();
            let written = controller.write_calibration(&record);
            if written {
                info!(?origin, record = %record, "hall calibration applied");
            } else {
                warn!(?origin, "hall calibration not applied; position accuracy may degrade");
            }
            outcome = CalibrationOutcome::Applied {
                record,
                origin,
                written,
            };
        });
        if outcome == CalibrationOutcome::AlreadyApplied {
            info!("hall calibration already applied, skipping");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camhelper_hardware::SimulatedMotor;

    #[test]
    fn second_apply_is_a_no_op() {
        let sim = SimulatedMotor::new();
        let mut ctl = MotorController::new(sim.clone());
        let loader = CalibrationLoader::new(FixedCalibrationSource(None));

        assert!(matches!(
            loader.load_and_apply(&mut ctl),
            CalibrationOutcome::Applied { .. }
        ));
        assert_eq!(
            loader.load_and_apply(&mut ctl),
            CalibrationOutcome::AlreadyApplied
        );
        assert_eq!(sim.writes().len(), 1);
    }

    #[test]
    fn write_failure_is_reported_not_raised() {
        let sim = SimulatedMotor::new();
        sim.set_fail_writes(true);
        let mut ctl = MotorController::new(sim);
        let loader = CalibrationLoader::new(FixedCalibrationSource(None));
        match loader.load_and_apply(&mut ctl) {
            CalibrationOutcome::Applied { written, origin, .. } => {
                assert!(!written);
                assert_eq!(origin, RecordOrigin::Default);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
