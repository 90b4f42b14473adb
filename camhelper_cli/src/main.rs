#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod commands;
mod error_fmt;
mod hw;
mod output;
mod run;

use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::WrapErr;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::output::Printer;
use camhelper_config::{Config, Logging};
use camhelper_core::Direction;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = ?cli.config, sim = cli.sim, "config loaded");

    let printer = Printer::new(cli.json);
    match cli.cmd {
        Commands::Calibrate => commands::calibrate(&cfg, cli.sim, printer),
        Commands::Position => commands::position(&cfg, cli.sim, printer),
        Commands::Actuate { open, .. } => {
            commands::actuate(&cfg, cli.sim, Direction::from(open), printer)
        }
        Commands::Run => run::run(&cfg, cli.sim, printer),
        Commands::SelfCheck => commands::self_check(&cfg, cli.sim, printer),
    }
}

/// Defaults when no file is given; every failure carries an
/// "invalid configuration" context so it maps to the config exit code.
fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).wrap_err_with(|| {
                format!("invalid configuration: read config {}", p.display())
            })?;
            camhelper_config::load_toml(&text)
                .wrap_err_with(|| format!("invalid configuration: parse {}", p.display()))?
        }
        None => Config::default(),
    };
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &Logging) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    // stdout carries events; logs always go to stderr.
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = PathBuf::from(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let name = path
                .file_name()
                .map_or_else(|| "camhelper.log".into(), |n| n.to_os_string());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_level = logging.level.as_deref().unwrap_or("info");
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_filter(EnvFilter::new(file_level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))
}
