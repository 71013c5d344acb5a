use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// `ACTIONS_RUNNER_DEBUG=true` (GitHub Actions debug re-runs) counts as one `-v`
pub fn effective_verbosity(verbose: u8, actions_runner_debug: Option<&str>) -> u8 {
    match actions_runner_debug {
        Some(value) if value.eq_ignore_ascii_case("true") => verbose.max(1),
        _ => verbose,
    }
}

/// 0 = info, 1 = debug (hyper connection noise suppressed), 2+ = trace.
/// `RUST_LOG` wins over the verbosity flags; `--quiet` wins over both.
fn filter_directives(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "info",
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
        _ => "trace",
    }
}

pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(verbose_level)))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let file_appender = rolling_appender(&log_path)?;

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);

            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);

            registry.with(fmt_layer).init();
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).init();
    }

    Ok(())
}

/// Daily rotation: `sync.log` becomes `sync.2026-01-17` style files next to it
fn rolling_appender(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(log_dir)?;

    let log_prefix = log_file_prefix(log_path)?;
    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix))
}

fn log_file_prefix(log_path: &Path) -> Result<&str> {
    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;

    Ok(log_filename.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(log_filename))
}
