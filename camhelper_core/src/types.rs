//! Plain data shared between event producers, the debouncer and the actuator.

use std::fmt;
use std::time::Instant;

/// Which way the lens should travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    #[inline]
    pub fn is_open(self) -> bool {
        matches!(self, Direction::Open)
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Open => Direction::Close,
            Direction::Close => Direction::Open,
        }
    }
}

impl From<bool> for Direction {
    fn from(open: bool) -> Self {
        if open { Direction::Open } else { Direction::Close }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Open => "open",
            Direction::Close => "close",
        })
    }
}

/// Producer of a raw intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentSource {
    CameraAvailability,
    FallSensor,
}

/// One open/close wish from a producer, consumed once by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawIntentEvent {
    pub source: IntentSource,
    pub direction: Direction,
    pub timestamp: Instant,
}

impl RawIntentEvent {
    pub fn camera(direction: Direction, timestamp: Instant) -> Self {
        Self {
            source: IntentSource::CameraAvailability,
            direction,
            timestamp,
        }
    }

    /// Safety retraction requested by the fall detector.
    pub fn fall(timestamp: Instant) -> Self {
        Self {
            source: IntentSource::FallSensor,
            direction: Direction::Close,
            timestamp,
        }
    }

    /// Forced intents bypass debounce suppression.
    #[inline]
    pub fn is_forced(&self) -> bool {
        self.source == IntentSource::FallSensor && self.direction == Direction::Close
    }
}

/// Last actuation actually dispatched to the motor port.
///
/// Both fields are `None` until the first command goes out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotorState {
    pub commanded_open: Option<bool>,
    pub last_transition: Option<Instant>,
}

impl MotorState {
    pub fn commanded(direction: Direction, at: Instant) -> Self {
        Self {
            commanded_open: Some(direction.is_open()),
            last_transition: Some(at),
        }
    }
}

/// Raw code read from the position register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCode(pub i64);

impl PositionCode {
    /// Code reported by the driver once the lens is fully down.
    pub const RETRACTED: PositionCode = PositionCode(1);

    /// Parse register text; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(PositionCode)
    }

    #[inline]
    pub fn is_retracted(self) -> bool {
        self == Self::RETRACTED
    }
}

impl fmt::Display for PositionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display power broadcast state; gates the fall trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPower {
    On,
    Off,
}
