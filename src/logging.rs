//! Logging & tracing: three sinks rooted at `./logs/<timestamp>/`, the same
//! `tracing` + `tracing-subscriber` + `tracing-appender` trio this
//! codebase's own CLI bootstraps for itself.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guards must be held for the process lifetime or the non-blocking
/// appenders silently stop flushing.
pub struct LoggingGuards {
    _log_file: WorkerGuard,
    _error_file: WorkerGuard,
}

/// Initializes the log directory `./logs/<timestamp>/` with `log.log`
/// (INFO and above) and `error.log` (WARN and above), plus a colored
/// stream to stderr for interactive runs.
pub fn init(timestamp: &str) -> anyhow::Result<LoggingGuards> {
    let dir = PathBuf::from("./logs").join(timestamp);
    std::fs::create_dir_all(&dir)?;

    let (log_writer, log_guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "log.log"));
    let (error_writer, error_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, "error.log"));

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_layer = fmt::layer()
        .with_writer(log_writer.with_max_level(tracing::Level::INFO))
        .with_ansi(false);
    let error_layer = fmt::layer()
        .with_writer(error_writer.with_max_level(tracing::Level::WARN))
        .with_ansi(false);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(log_layer)
        .with(error_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(LoggingGuards {
        _log_file: log_guard,
        _error_file: error_guard,
    })
}

/// The run-wide timestamp shared across logger and report directory
/// naming: `WEBQA_TIMESTAMP` if set, else computed now. This flags
/// this global-by-convention; callers that need determinism should pass
/// an explicit value through instead of relying on the environment.
pub fn run_timestamp() -> String {
    std::env::var("WEBQA_TIMESTAMP").unwrap_or_else(|_| chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string())
}

pub fn log_dir_for(timestamp: &str) -> PathBuf {
    Path::new("./logs").join(timestamp)
}
