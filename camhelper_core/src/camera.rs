//! Front camera availability → open/close intents.
//!
//! "Unavailable" means some client opened the camera, so the lens must come
//! up; "available" means it was released and the lens may retract.

use std::sync::Arc;

use camhelper_traits::clock::Clock;
use tracing::trace;

use crate::actuator::IntentSink;
use crate::types::{Direction, RawIntentEvent};

pub struct CameraAvailabilityListener {
    front_id: String,
    sink: Arc<dyn IntentSink>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl core::fmt::Debug for CameraAvailabilityListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CameraAvailabilityListener")
            .field("front_id", &self.front_id)
            .finish()
    }
}

impl CameraAvailabilityListener {
    pub fn new(
        front_id: impl Into<String>,
        sink: Arc<dyn IntentSink>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            front_id: front_id.into(),
            sink,
            clock,
        }
    }

    pub fn front_id(&self) -> &str {
        &self.front_id
    }

    /// Returns false when `camera_id` is not the front camera.
    pub fn on_camera_available(&self, camera_id: &str) -> bool {
        self.forward(camera_id, Direction::Close)
    }

    /// Returns false when `camera_id` is not the front camera.
    pub fn on_camera_unavailable(&self, camera_id: &str) -> bool {
        self.forward(camera_id, Direction::Open)
    }

    fn forward(&self, camera_id: &str, direction: Direction) -> bool {
        if camera_id != self.front_id {
            trace!(camera_id, "ignoring other camera");
            return false;
        }
        self.sink
            .on_event(RawIntentEvent::camera(direction, self.clock.now()));
        true
    }
}
