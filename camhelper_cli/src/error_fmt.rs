//! Human-readable error descriptions and structured JSON error formatting.

use camhelper_core::{BuildError, CamError};

/// Which broad failure class a report belongs to.
fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<toml::de::Error>().is_some() || is_config_error(err) {
        return "Config";
    }
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "Config",
            _ => "Build",
        };
    }
    match err.downcast_ref::<CamError>() {
        Some(CamError::Config(_)) => "Config",
        Some(CamError::Io(_)) => "Io",
        Some(CamError::Hardware(_) | CamError::HardwareFault(_)) => "Hardware",
        Some(_) => "Error",
        None => "Error",
    }
}

/// Config loading wraps every failure in an "invalid configuration" context.
fn is_config_error(err: &eyre::Report) -> bool {
    err.chain()
        .any(|e| e.to_string().starts_with("invalid configuration"))
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingMotor => {
                "What happened: No motor port was provided to the service.\nLikely causes: Backend selection failed before the service was built.\nHow to fix: Re-run with --sim to rule out register access, or check [motor] paths.".to_string()
            }
            BuildError::MissingFallSensor | BuildError::MissingPresenter | BuildError::MissingForegroundExit => {
                format!("What happened: The service could not be assembled ({be}).\nLikely causes: Internal wiring error.\nHow to fix: Re-run with --log-level=debug and report the output.")
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CamError>() {
        return match ce {
            CamError::Io(msg) => format!(
                "What happened: A motor register could not be accessed ({msg}).\nLikely causes: Wrong [motor] paths, missing driver, or insufficient permissions.\nHow to fix: Check the paths in the config and that the process may read/write them."
            ),
            CamError::Hardware(msg) | CamError::HardwareFault(msg) => format!(
                "What happened: The motor driver rejected a command ({msg}).\nLikely causes: Driver busy or register write refused.\nHow to fix: Check the kernel log for motor driver errors, then retry."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<toml::de::Error>() {
        return format!(
            "What happened: The config file is not valid TOML.\nDetails: {te}\nHow to fix: Correct the syntax and rerun."
        );
    }

    let msg = format!("{err:#}");
    if is_config_error(err) {
        return format!(
            "What happened: {msg}.\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    format!(
        "Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug for details."
    )
}

/// Stable exit codes: 2 config, 3 build, 4 hardware or register I/O, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_name(err) {
        "Config" => 2,
        "Build" => 3,
        "Io" | "Hardware" => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_get_stable_codes() {
        let io = eyre::Report::new(CamError::Io("position".into()));
        assert_eq!(exit_code_for_error(&io), 4);
        assert!(humanize(&io).contains("register"));

        let build = eyre::Report::new(BuildError::MissingMotor);
        assert_eq!(exit_code_for_error(&build), 3);

        let cfg = eyre::Report::new(BuildError::InvalidConfig("window"));
        assert_eq!(exit_code_for_error(&cfg), 2);
    }

    #[test]
    fn validation_messages_count_as_config_errors() {
        let err = eyre::eyre!("debounce.window_ms must be >= 1").wrap_err("invalid configuration");
        assert_eq!(exit_code_for_error(&err), 2);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
    }

    #[test]
    fn unknown_errors_exit_one() {
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }
}
