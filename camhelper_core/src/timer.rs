//! Single-slot cancelable deadline.
//!
//! The actuator thread sleeps until `due()` and then calls `fire(now)`.
//! A canceled timer never fires and an armed timer fires at most once:
//! `fire` consumes the slot, and re-arming hands out a fresh token.

use std::time::Instant;

/// Identifies one arming of a `DeferredTimer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Default)]
pub struct DeferredTimer {
    slot: Option<(TimerToken, Instant)>,
    next_id: u64,
}

impl DeferredTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for `due`, replacing any previous arming.
    pub fn arm(&mut self, due: Instant) -> TimerToken {
        self.next_id = self.next_id.wrapping_add(1);
        let token = TimerToken(self.next_id);
        self.slot = Some((token, due));
        token
    }

    /// Disarm. Returns the token that will now never fire.
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.slot.take().map(|(t, _)| t)
    }

    pub fn due(&self) -> Option<Instant> {
        self.slot.map(|(_, d)| d)
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    /// Fire if the deadline is at or before `now`.
    pub fn fire(&mut self, now: Instant) -> Option<TimerToken> {
        match self.slot {
            Some((token, due)) if due <= now => {
                self.slot = None;
                Some(token)
            }
            _ => None,
        }
    }
}
