//! Abnormal motor states reported through the key layer.
//!
//! The driver raises three pseudo-keys when the lens is forced down by hand
//! or a stroke cannot complete. Each press opens an advisory with a fixed
//! set of choices; the chosen answer resolves to a recovery command.
//! Only the most recent advisory can be answered.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use camhelper_traits::ForegroundExit;
use tracing::{debug, error, info, warn};

use crate::actuator::CommandSink;
use crate::error::CamError;
use crate::hw_error::map_hw_error;
use crate::types::Direction;
use crate::util::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    /// Lens pushed down by hand while raised.
    ManualOverrideEngaged,
    /// Up stroke could not complete.
    UpStrokeAbnormal,
    /// Down stroke could not complete.
    DownStrokeAbnormal,
}

impl FaultCode {
    /// Answers offered to the user for this fault.
    pub fn choices(self) -> &'static [UserChoice] {
        match self {
            FaultCode::ManualOverrideEngaged => &[UserChoice::Ok],
            FaultCode::UpStrokeAbnormal => &[UserChoice::Retry, UserChoice::Close],
            FaultCode::DownStrokeAbnormal => &[UserChoice::Retry],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::ManualOverrideEngaged => "manual_override",
            FaultCode::UpStrokeAbnormal => "up_stroke_abnormal",
            FaultCode::DownStrokeAbnormal => "down_stroke_abnormal",
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserChoice {
    Retry,
    Close,
    Ok,
}

impl UserChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            UserChoice::Retry => "retry",
            UserChoice::Close => "close",
            UserChoice::Ok => "ok",
        }
    }
}

impl fmt::Display for UserChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserChoice {
    type Err = CamError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retry" => Ok(UserChoice::Retry),
            "close" => Ok(UserChoice::Close),
            "ok" => Ok(UserChoice::Ok),
            other => Err(CamError::UnknownChoice(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryDecision {
    /// Fresh open command.
    RetryOpen,
    /// Close command followed by a foreground exit.
    ForceClose,
    /// Fresh close command.
    RetryClose,
    /// Nothing to actuate.
    Acknowledge,
}

impl RecoveryDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RetryOpen => "retry_open",
            Self::ForceClose => "force_close",
            Self::RetryClose => "retry_close",
            Self::Acknowledge => "acknowledge",
        }
    }

    /// `None` when `choice` is not offered for `fault`.
    pub fn decide(fault: FaultCode, choice: UserChoice) -> Option<Self> {
        match (fault, choice) {
            (FaultCode::ManualOverrideEngaged, UserChoice::Ok) => Some(Self::Acknowledge),
            (FaultCode::UpStrokeAbnormal, UserChoice::Retry) => Some(Self::RetryOpen),
            (FaultCode::UpStrokeAbnormal, UserChoice::Close) => Some(Self::ForceClose),
            (FaultCode::DownStrokeAbnormal, UserChoice::Retry) => Some(Self::RetryClose),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdvisoryId(pub u64);

impl fmt::Display for AdvisoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub id: AdvisoryId,
    pub fault: FaultCode,
    pub choices: &'static [UserChoice],
}

/// Shows advisories to the user. Answers come back through
/// `AbnormalStateAdvisor::resolve`.
///
/// Both methods run while the advisor holds its pending-advisory lock, so
/// they must not call back into the advisor.
pub trait AdvisoryPresenter: Send + Sync {
    fn present(&self, advisory: &Advisory);
    /// The advisory was superseded and must no longer be shown.
    fn dismiss(&self, id: AdvisoryId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub scan_code: u16,
    pub action: KeyAction,
}

/// Scan codes of the motor pseudo-keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMap {
    pub manual_to_down: u16,
    pub up_abnormal: u16,
    pub down_abnormal: u16,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            manual_to_down: 184,
            up_abnormal: 186,
            down_abnormal: 189,
        }
    }
}

impl KeyMap {
    pub fn fault_for(&self, scan_code: u16) -> Option<FaultCode> {
        if scan_code == self.manual_to_down {
            Some(FaultCode::ManualOverrideEngaged)
        } else if scan_code == self.up_abnormal {
            Some(FaultCode::UpStrokeAbnormal)
        } else if scan_code == self.down_abnormal {
            Some(FaultCode::DownStrokeAbnormal)
        } else {
            None
        }
    }
}

/// Whether the key layer should keep delivering the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Consumed,
    PassThrough,
}

pub struct AbnormalStateAdvisor {
    keys: KeyMap,
    commands: Arc<dyn CommandSink>,
    presenter: Arc<dyn AdvisoryPresenter>,
    home: Arc<dyn ForegroundExit + Send + Sync>,
    pending: Mutex<Option<Advisory>>,
    next_id: AtomicU64,
}

impl fmt::Debug for AbnormalStateAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbnormalStateAdvisor")
            .field("keys", &self.keys)
            .field("pending", &self.pending())
            .finish()
    }
}

impl AbnormalStateAdvisor {
    pub fn new(
        keys: KeyMap,
        commands: Arc<dyn CommandSink>,
        presenter: Arc<dyn AdvisoryPresenter>,
        home: Arc<dyn ForegroundExit + Send + Sync>,
    ) -> Self {
        Self {
            keys,
            commands,
            presenter,
            home,
            pending: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn pending(&self) -> Option<Advisory> {
        lock(&self.pending).clone()
    }

    /// Motor pseudo-keys are always consumed; only presses raise a fault.
    pub fn handle_key(&self, event: KeyEvent) -> KeyDisposition {
        let Some(fault) = self.keys.fault_for(event.scan_code) else {
            return KeyDisposition::PassThrough;
        };
        match event.action {
            KeyAction::Pressed => {
                self.on_fault(fault);
            }
            KeyAction::Released => debug!(?fault, "fault key released"),
        }
        KeyDisposition::Consumed
    }

    /// Raise an advisory for `fault`, superseding any pending one.
    pub fn on_fault(&self, fault: FaultCode) -> Advisory {
        warn!(?fault, "camera motor fault");
        if fault == FaultCode::ManualOverrideEngaged {
            self.exit_to_home();
        }

        // Allocate, dismiss and present under one lock: the last advisory
        // shown is always the one `resolve` accepts.
        let mut pending = lock(&self.pending);
        let advisory = Advisory {
            id: AdvisoryId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            fault,
            choices: fault.choices(),
        };
        if let Some(old) = pending.replace(advisory.clone()) {
            info!(stale = %old.id, current = %advisory.id, "advisory superseded");
            self.presenter.dismiss(old.id);
        }
        self.presenter.present(&advisory);
        advisory
    }

    /// Apply the user's answer to advisory `id`.
    ///
    /// Superseded or unknown ids and choices the advisory did not offer are
    /// rejected without actuating; an invalid choice leaves the advisory pending.
    pub fn resolve(&self, id: AdvisoryId, choice: UserChoice) -> Result<RecoveryDecision, CamError> {
        let (fault, decision) = {
            let mut pending = lock(&self.pending);
            let Some(current) = pending.take_if(|a| a.id == id) else {
                warn!(%id, %choice, "answer for stale advisory ignored");
                return Err(CamError::StaleAdvisory(id));
            };
            let Some(decision) = RecoveryDecision::decide(current.fault, choice) else {
                let fault = current.fault;
                *pending = Some(current);
                debug!(%id, ?fault, %choice, "choice not offered");
                return Err(CamError::InvalidChoice {
                    id,
                    choice: choice.to_string(),
                });
            };
            (current.fault, decision)
        };

        info!(%id, ?fault, ?decision, "advisory resolved");
        self.apply(decision);
        Ok(decision)
    }

    fn apply(&self, decision: RecoveryDecision) {
        match decision {
            RecoveryDecision::RetryOpen => self.commands.command(Direction::Open),
            RecoveryDecision::ForceClose => {
                self.commands.command(Direction::Close);
                self.exit_to_home();
            }
            RecoveryDecision::RetryClose => self.commands.command(Direction::Close),
            RecoveryDecision::Acknowledge => {}
        }
    }

    fn exit_to_home(&self) {
        if let Err(e) = self.home.exit_to_home() {
            let err = map_hw_error(e.as_ref());
            error!(error = %err, "foreground exit failed");
        }
    }
}
