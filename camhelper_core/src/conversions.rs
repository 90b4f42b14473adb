//! `From` implementations bridging `camhelper_config` types to core types.

use std::time::Duration;

use crate::advisor::KeyMap;
use crate::config::ServiceCfg;

impl From<&camhelper_config::KeysCfg> for KeyMap {
    fn from(c: &camhelper_config::KeysCfg) -> Self {
        Self {
            manual_to_down: c.manual_to_down,
            up_abnormal: c.up_abnormal,
            down_abnormal: c.down_abnormal,
        }
    }
}

impl From<&camhelper_config::Config> for ServiceCfg {
    fn from(c: &camhelper_config::Config) -> Self {
        Self {
            window: Duration::from_millis(c.debounce.window_ms),
            front_camera_id: c.camera.front_id.clone(),
            keys: KeyMap::from(&c.keys),
        }
    }
}
