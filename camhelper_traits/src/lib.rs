pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type used at every hardware trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raw register contract of the camera lift motor.
///
/// Implementations do plain I/O; interpretation of the position value and
/// logging of failures happen in `camhelper_core`.
pub trait MotorPort {
    /// Program the hall-sensor calibration string.
    fn write_calibration(&mut self, record: &str) -> Result<(), BoxError>;
    /// Select travel direction: `true` raises the camera, `false` lowers it.
    fn set_direction(&mut self, open: bool) -> Result<(), BoxError>;
    /// Start a stroke in the previously selected direction.
    fn enable_actuation(&mut self) -> Result<(), BoxError>;
    /// Raw content of the position register (first line).
    fn read_position(&mut self) -> Result<String, BoxError>;
}

impl<P: MotorPort + ?Sized> MotorPort for Box<P> {
    fn write_calibration(&mut self, record: &str) -> Result<(), BoxError> {
        (**self).write_calibration(record)
    }
    fn set_direction(&mut self, open: bool) -> Result<(), BoxError> {
        (**self).set_direction(open)
    }
    fn enable_actuation(&mut self) -> Result<(), BoxError> {
        (**self).enable_actuation()
    }
    fn read_position(&mut self) -> Result<String, BoxError> {
        (**self).read_position()
    }
}

/// Callback invoked once per detected fall.
pub type FallListener = Box<dyn Fn() + Send + Sync>;

/// Black-box fall detector. At most one listener is registered at a time.
pub trait FallSensor {
    fn register(&mut self, listener: FallListener) -> Result<(), BoxError>;
    fn unregister(&mut self) -> Result<(), BoxError>;
}

impl<F: FallSensor + ?Sized> FallSensor for Box<F> {
    fn register(&mut self, listener: FallListener) -> Result<(), BoxError> {
        (**self).register(listener)
    }
    fn unregister(&mut self) -> Result<(), BoxError> {
        (**self).unregister()
    }
}

/// Platform side effect that sends the user back to the home screen,
/// closing whichever app holds the camera.
pub trait ForegroundExit {
    fn exit_to_home(&self) -> Result<(), BoxError>;
}
