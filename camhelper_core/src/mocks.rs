//! Recording doubles for the core seams, usable from tests and the CLI
//! simulator alike.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use camhelper_traits::{BoxError, ForegroundExit};

use crate::actuator::{CommandSink, IntentSink};
use crate::advisor::{Advisory, AdvisoryId, AdvisoryPresenter};
use crate::types::{Direction, RawIntentEvent};
use crate::util::lock;

/// Keeps every intent and command it receives, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RawIntentEvent>>,
    commands: Mutex<Vec<Direction>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<RawIntentEvent> {
        lock(&self.events).clone()
    }

    pub fn commands(&self) -> Vec<Direction> {
        lock(&self.commands).clone()
    }
}

impl IntentSink for RecordingSink {
    fn on_event(&self, event: RawIntentEvent) {
        lock(&self.events).push(event);
    }
}

impl CommandSink for RecordingSink {
    fn command(&self, direction: Direction) {
        lock(&self.commands).push(direction);
    }
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    presented: Mutex<Vec<Advisory>>,
    dismissed: Mutex<Vec<AdvisoryId>>,
}

impl RecordingPresenter {
    pub fn presented(&self) -> Vec<Advisory> {
        lock(&self.presented).clone()
    }

    pub fn dismissed(&self) -> Vec<AdvisoryId> {
        lock(&self.dismissed).clone()
    }

    /// Most recently presented advisory.
    pub fn last(&self) -> Option<Advisory> {
        lock(&self.presented).last().cloned()
    }
}

impl AdvisoryPresenter for RecordingPresenter {
    fn present(&self, advisory: &Advisory) {
        lock(&self.presented).push(advisory.clone());
    }

    fn dismiss(&self, id: AdvisoryId) {
        lock(&self.dismissed).push(id);
    }
}

/// Counts foreground exits; optionally fails them.
#[derive(Debug, Default)]
pub struct CountingHome {
    count: AtomicUsize,
    fail: AtomicBool,
}

impl CountingHome {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ForegroundExit for CountingHome {
    fn exit_to_home(&self) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Box::new(std::io::Error::other("home unavailable")));
        }
        Ok(())
    }
}
