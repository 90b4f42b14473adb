//! Foreground-exit side effect implemented by spawning a platform command.
use std::process::{Child, Command};

use camhelper_traits::{BoxError, ForegroundExit};
use tracing::{debug, warn};

use crate::error::HwError;

/// Starts `program args...` without waiting for it.
///
/// On Android this is typically
/// `am start -a android.intent.action.MAIN -c android.intent.category.HOME`.
/// Only a failed spawn is reported to the caller; the child is reaped on a
/// detached thread that logs a non-zero exit.
#[derive(Debug, Clone)]
pub struct CommandHome {
    program: String,
    args: Vec<String>,
}

impl CommandHome {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv-style list; `None` when the list is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    fn reap(&self, mut child: Child) -> Result<(), HwError> {
        let program = self.program.clone();
        std::thread::Builder::new()
            .name("camhelper-home".into())
            .spawn(move || match child.wait() {
                Ok(status) if status.success() => debug!(%program, "home command finished"),
                Ok(status) => warn!(
                    error = %HwError::HomeCommand(format!("{program} exited with {status}")),
                    "foreground exit failed"
                ),
                Err(e) => warn!(%program, error = %e, "home command wait failed"),
            })?;
        Ok(())
    }
}

impl ForegroundExit for CommandHome {
    fn exit_to_home(&self) -> Result<(), BoxError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(HwError::from)?;
        self.reap(child)?;
        Ok(())
    }
}
