#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and hall-calibration record parsing for the camera motor helper.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; defaults match the stock device layout.
//! - `CalibrationRecord` is the persisted hall-sensor blob: one line of
//!   eleven comma separated integers.
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Number of coefficients in a hall-sensor calibration record.
pub const CALIBRATION_FIELDS: usize = 11;

/// Factory fallback used whenever the persisted record is absent or unusable.
pub const DEFAULT_CALIBRATION: [i32; CALIBRATION_FIELDS] =
    [170, 170, 480, 0, 0, 480, 500, 0, 0, 500, 1500];

/// Hall-sensor calibration coefficients.
///
/// Text form: `170,170,480,0,0,480,500,0,0,500,1500`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRecord([i32; CALIBRATION_FIELDS]);

impl CalibrationRecord {
    pub const fn new(coefficients: [i32; CALIBRATION_FIELDS]) -> Self {
        Self(coefficients)
    }

    pub fn coefficients(&self) -> &[i32; CALIBRATION_FIELDS] {
        &self.0
    }

    /// Parse the first line of `text`. Fields may carry surrounding
    /// whitespace; anything other than exactly eleven integers is rejected.
    pub fn parse(text: &str) -> eyre::Result<Self> {
        let line = text.lines().next().unwrap_or("");
        if line.trim().is_empty() {
            eyre::bail!("calibration record is empty");
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(line.as_bytes());
        let record = match rdr.records().next() {
            Some(Ok(r)) => r,
            Some(Err(e)) => eyre::bail!("calibration record is not valid CSV: {e}"),
            None => eyre::bail!("calibration record is empty"),
        };

        if record.len() != CALIBRATION_FIELDS {
            eyre::bail!(
                "calibration record must have {CALIBRATION_FIELDS} fields, got {}",
                record.len()
            );
        }

        let mut out = [0i32; CALIBRATION_FIELDS];
        for (idx, field) in record.iter().enumerate() {
            out[idx] = field
                .parse::<i32>()
                .map_err(|e| eyre::eyre!("calibration field {} ({field:?}): {e}", idx + 1))?;
        }
        Ok(Self(out))
    }
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self(DEFAULT_CALIBRATION)
    }
}

impl fmt::Display for CalibrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for CalibrationRecord {
    type Err = eyre::Report;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Read and parse a persisted calibration record.
pub fn load_calibration_record(path: &Path) -> eyre::Result<CalibrationRecord> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read calibration record {:?}: {}", path, e))?;
    CalibrationRecord::parse(&text)
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MotorPaths {
    pub hall_calibration: PathBuf,
    pub enable: PathBuf,
    pub direction: PathBuf,
    pub position: PathBuf,
}

impl Default for MotorPaths {
    fn default() -> Self {
        Self {
            hall_calibration: PathBuf::from("/sys/class/motor/hall_calibration"),
            enable: PathBuf::from("/sys/class/motor/enable"),
            direction: PathBuf::from("/sys/class/motor/direction"),
            position: PathBuf::from("/sys/class/motor/position"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Where the factory tool persisted the hall calibration.
    pub persist_path: PathBuf,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            persist_path: PathBuf::from("/mnt/vendor/persist/engineermode/hall_calibration"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DebounceCfg {
    /// Coalescing window for opposite-direction camera events (ms).
    pub window_ms: u64,
}

impl Default for DebounceCfg {
    fn default() -> Self {
        Self { window_ms: 100 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CameraCfg {
    /// Camera id of the pop-up front camera.
    pub front_id: String,
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self {
            front_id: "1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct KeysCfg {
    /// Scan code raised when the lens is pushed down by hand.
    pub manual_to_down: u16,
    /// Scan code raised when an up stroke cannot complete.
    pub up_abnormal: u16,
    /// Scan code raised when a down stroke cannot complete.
    pub down_abnormal: u16,
}

impl Default for KeysCfg {
    fn default() -> Self {
        Self {
            manual_to_down: 184,
            up_abnormal: 186,
            down_abnormal: 189,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HomeCfg {
    /// argv of the command that brings the launcher to the foreground
    pub command: Vec<String>,
}

impl Default for HomeCfg {
    fn default() -> Self {
        Self {
            command: [
                "am",
                "start",
                "-a",
                "android.intent.action.MAIN",
                "-c",
                "android.intent.category.HOME",
                "-f",
                "0x10000000",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub motor: MotorPaths,
    pub calibration: CalibrationCfg,
    pub debounce: DebounceCfg,
    pub camera: CameraCfg,
    pub keys: KeysCfg,
    pub home: HomeCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Motor registers
        for (name, p) in [
            ("motor.hall_calibration", &self.motor.hall_calibration),
            ("motor.enable", &self.motor.enable),
            ("motor.direction", &self.motor.direction),
            ("motor.position", &self.motor.position),
            ("calibration.persist_path", &self.calibration.persist_path),
        ] {
            if p.as_os_str().is_empty() {
                eyre::bail!("{name} must not be empty");
            }
        }

        // Debounce
        if self.debounce.window_ms == 0 {
            eyre::bail!("debounce.window_ms must be >= 1");
        }
        if self.debounce.window_ms > 10_000 {
            eyre::bail!("debounce.window_ms is unreasonably large (>10s)");
        }

        // Camera
        if self.camera.front_id.trim().is_empty() {
            eyre::bail!("camera.front_id must not be empty");
        }

        // Keys
        let k = self.keys;
        if k.manual_to_down == 0 || k.up_abnormal == 0 || k.down_abnormal == 0 {
            eyre::bail!("keys.* scan codes must be > 0");
        }
        if k.manual_to_down == k.up_abnormal
            || k.manual_to_down == k.down_abnormal
            || k.up_abnormal == k.down_abnormal
        {
            eyre::bail!("keys.* scan codes must be distinct");
        }

        // Home
        if self.home.command.first().is_none_or(|p| p.trim().is_empty()) {
            eyre::bail!("home.command must name a program");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_text_matches_factory_string() {
        assert_eq!(
            CalibrationRecord::default().to_string(),
            "170,170,480,0,0,480,500,0,0,500,1500"
        );
    }

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.debounce.window_ms, 100);
        assert_eq!(cfg.camera.front_id, "1");
        assert_eq!(cfg.keys.up_abnormal, 186);
        cfg.validate().unwrap();
    }
}
