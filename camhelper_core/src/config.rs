//! Runtime configuration for `CameraMotorService`.
//!
//! Separate from the TOML-deserialized config in `camhelper_config`; see
//! `conversions` for the mapping.

use std::time::Duration;

use crate::advisor::KeyMap;
use crate::debouncer::DEFAULT_WINDOW;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCfg {
    /// Settling window applied to camera intents.
    pub window: Duration,
    /// Camera id whose availability drives the lens.
    pub front_camera_id: String,
    pub keys: KeyMap,
}

impl Default for ServiceCfg {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            front_camera_id: "1".to_string(),
            keys: KeyMap::default(),
        }
    }
}
