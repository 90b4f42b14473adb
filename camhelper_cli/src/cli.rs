//! CLI argument definitions and shared statics.

use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "camhelper", version, about = "Pop-up front camera motor helper")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (stdout events, stderr logs and errors)
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Use the simulated motor instead of the sysfs registers
    #[arg(long, action = ArgAction::SetTrue)]
    pub sim: bool,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Program the hall calibration record (persisted or factory default)
    Calibrate,
    /// Print whether the lens is open, closed or unknown
    Position,
    /// Issue one immediate stroke
    #[command(group(ArgGroup::new("direction").required(true).args(["open", "close"])))]
    Actuate {
        /// Raise the lens
        #[arg(long, action = ArgAction::SetTrue)]
        open: bool,
        /// Lower the lens
        #[arg(long, action = ArgAction::SetTrue)]
        close: bool,
    },
    /// Run the service, reading events from stdin (one per line)
    #[command(long_about = "Run the camera motor service.\n\n\
        Events are read from stdin, one per line:\n\
        \x20 available <camera-id>      camera released\n\
        \x20 unavailable <camera-id>    camera opened by a client\n\
        \x20 fall                       fall detected\n\
        \x20 screen on|off              display power\n\
        \x20 key <scan-code> down|up    driver fault key\n\
        \x20 choose <advisory> retry|close|ok\n\
        \x20 wait <ms>                  sleep, then settle the actuator\n\
        \x20 status                     print motor status\n\
        \x20 quit                       stop\n\n\
        Ctrl-C stops the service cleanly.")]
    Run,
    /// Validate the config and probe the position register
    SelfCheck,
}
