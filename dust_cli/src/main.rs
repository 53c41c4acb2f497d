#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `dust`: read and monitor a Sharp GP2Y dust sensor.

mod backend;
mod cli;
mod commands;
mod error_fmt;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;

use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, JSON_MODE};
use crate::error_fmt::{
    CONFIG_INVALID_CTX, CONFIG_PARSE_CTX, CONFIG_READ_CTX, exit_code_for_error,
    format_error_json, humanize,
};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    // Held here so the file sink is flushed on every exit path.
    let mut file_guard = None;
    if let Err(e) = try_main(&cli, &mut file_guard) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        drop(file_guard);
        std::process::exit(exit_code_for_error(&e));
    }
}

fn try_main(cli: &Cli, file_guard: &mut Option<WorkerGuard>) -> eyre::Result<()> {
    color_eyre::install()?;

    let text = std::fs::read_to_string(&cli.config)
        .wrap_err_with(|| format!("{CONFIG_READ_CTX} {}", cli.config.display()))?;
    let cfg: dust_config::Config = toml::from_str(&text).wrap_err(CONFIG_PARSE_CTX)?;
    cfg.validate().wrap_err(CONFIG_INVALID_CTX)?;

    *file_guard = init_tracing(cli, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    commands::run(cli, &cfg, shutdown)
}

/// Console logs on stderr (stdout carries readings), plus an optional
/// JSON-lines file sink from `[logging]`.
fn init_tracing(
    cli: &Cli,
    logging: &dust_config::Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let console = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };
    let mut layers = vec![console];
    let mut guard = None;

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        let level = logging.level.as_deref().unwrap_or("info");
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(level))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(guard)
}
