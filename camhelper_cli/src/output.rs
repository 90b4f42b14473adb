//! stdout rendering of events, in plain text or JSON lines.

use std::io::Write;

use camhelper_core::{Advisory, AdvisoryId, AdvisoryPresenter};
use camhelper_traits::{BoxError, ForegroundExit};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    json: bool,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` in JSON mode, otherwise the text built by `text`.
    pub fn emit(&self, value: Value, text: impl FnOnce() -> String) {
        let line = if self.json {
            value.to_string()
        } else {
            text()
        };
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing the service over.
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

/// Shows advisories on stdout; answers come back as `choose` lines.
#[derive(Debug)]
pub struct StdoutPresenter(pub Printer);

impl AdvisoryPresenter for StdoutPresenter {
    fn present(&self, advisory: &Advisory) {
        let choices: Vec<&str> = advisory.choices.iter().map(|c| c.as_str()).collect();
        self.0.emit(
            json!({
                "event": "advisory",
                "id": advisory.id.0,
                "fault": advisory.fault.as_str(),
                "choices": choices,
            }),
            || {
                format!(
                    "advisory {} {} choices={}",
                    advisory.id,
                    advisory.fault,
                    choices.join(",")
                )
            },
        );
    }

    fn dismiss(&self, id: AdvisoryId) {
        self.0.emit(json!({ "event": "dismissed", "id": id.0 }), || {
            format!("dismissed {id}")
        });
    }
}

/// Simulated foreground exit: announces itself instead of running a command.
#[derive(Debug)]
pub struct StdoutHome(pub Printer);

impl ForegroundExit for StdoutHome {
    fn exit_to_home(&self) -> Result<(), BoxError> {
        self.0.emit(json!({ "event": "home" }), || "home".to_string());
        Ok(())
    }
}

pub fn position_name(open: Option<bool>) -> &'static str {
    match open {
        Some(true) => "open",
        Some(false) => "closed",
        None => "unknown",
    }
}
