//! Display-gated fall trigger.
//!
//! While enabled, every fall reported by the sensor becomes a forced close
//! intent. Enabling and disabling are idempotent: the sensor never holds
//! more than one listener registered by this trigger.

use std::sync::{Arc, Mutex};

use camhelper_traits::FallSensor;
use camhelper_traits::clock::Clock;
use tracing::{debug, error, info};

use crate::actuator::IntentSink;
use crate::hw_error::map_hw_error;
use crate::types::{DisplayPower, RawIntentEvent};
use crate::util::lock;

struct Gate<F> {
    sensor: F,
    enabled: bool,
}

pub struct FallTrigger<F: FallSensor> {
    gate: Mutex<Gate<F>>,
    sink: Arc<dyn IntentSink>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<F: FallSensor> core::fmt::Debug for FallTrigger<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FallTrigger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl<F: FallSensor> FallTrigger<F> {
    /// Created disabled.
    pub fn new(sensor: F, sink: Arc<dyn IntentSink>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            gate: Mutex::new(Gate {
                sensor,
                enabled: false,
            }),
            sink,
            clock,
        }
    }

    pub fn is_enabled(&self) -> bool {
        lock(&self.gate).enabled
    }

    /// Returns true when this call armed the trigger.
    pub fn enable(&self) -> bool {
        let mut gate = lock(&self.gate);
        if gate.enabled {
            debug!("fall trigger already enabled");
            return false;
        }
        let sink = self.sink.clone();
        let clock = self.clock.clone();
        let listener = Box::new(move || {
            info!("fall detected, retracting camera");
            sink.on_event(RawIntentEvent::fall(clock.now()));
        });
        match gate.sensor.register(listener) {
            Ok(()) => {
                gate.enabled = true;
                info!("fall trigger enabled");
                true
            }
            Err(e) => {
                let err = map_hw_error(e.as_ref());
                error!(error = %err, "failed to register fall listener");
                false
            }
        }
    }

    /// Returns true when this call disarmed the trigger.
    pub fn disable(&self) -> bool {
        let mut gate = lock(&self.gate);
        if !gate.enabled {
            debug!("fall trigger already disabled");
            return false;
        }
        match gate.sensor.unregister() {
            Ok(()) => {
                gate.enabled = false;
                info!("fall trigger disabled");
                true
            }
            Err(e) => {
                // Still registered; stay enabled so a later enable() cannot double-register.
                let err = map_hw_error(e.as_ref());
                error!(error = %err, "failed to unregister fall listener");
                false
            }
        }
    }

    pub fn on_display_power(&self, power: DisplayPower) {
        debug!(?power, "display power changed");
        match power {
            DisplayPower::On => {
                self.enable();
            }
            DisplayPower::Off => {
                self.disable();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingSink;
    use camhelper_hardware::SimulatedFallSensor;
    use camhelper_traits::MonotonicClock;

    fn trigger(sensor: &SimulatedFallSensor, sink: &Arc<RecordingSink>) -> FallTrigger<SimulatedFallSensor> {
        FallTrigger::new(sensor.clone(), sink.clone(), Arc::new(MonotonicClock::new()))
    }

    #[test]
    fn enable_twice_registers_once() {
        let sensor = SimulatedFallSensor::new();
        let sink = Arc::new(RecordingSink::default());
        let t = trigger(&sensor, &sink);

        assert!(t.enable());
        assert!(!t.enable());
        assert_eq!(sensor.registrations(), 1);

        sensor.trigger();
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_forced());
    }

    #[test]
    fn disabled_trigger_forwards_nothing() {
        let sensor = SimulatedFallSensor::new();
        let sink = Arc::new(RecordingSink::default());
        let t = trigger(&sensor, &sink);

        t.on_display_power(DisplayPower::On);
        t.on_display_power(DisplayPower::Off);
        t.on_display_power(DisplayPower::Off);
        assert!(!t.is_enabled());
        assert!(!sensor.trigger());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn failed_registration_leaves_trigger_disabled() {
        let sensor = SimulatedFallSensor::new();
        sensor.set_fail_register(true);
        let sink = Arc::new(RecordingSink::default());
        let t = trigger(&sensor, &sink);
        assert!(!t.enable());
        assert!(!t.is_enabled());

        sensor.set_fail_register(false);
        assert!(t.enable());
        assert_eq!(sensor.registrations(), 1);
    }
}
