//! Bootstrap shared by both CLI subcommands: logging, the launcher the
//! engine drives browsers through, and the standard runner registry.

use std::sync::Arc;

use anyhow::Result;
use webqa_browser::BrowserLauncher;
use webqa_engine::logging::{self, LoggingGuards};
use webqa_engine::metrics;
use webqa_runners::RunnerRegistry;

/// Installs the three-sink tracing subscriber rooted at
/// `./logs/<timestamp>/` and returns its guards, which the caller must
/// hold for the process lifetime.
pub fn init_logging() -> Result<LoggingGuards> {
    let timestamp = logging::run_timestamp();
    logging::init(&timestamp)
}

/// Registers the Prometheus metrics exactly once, regardless of which
/// subcommand is entered.
pub fn init_metrics() {
    metrics::register();
}

pub fn default_launcher() -> Arc<dyn BrowserLauncher> {
    webqa_engine::launcher::default_launcher()
}

pub fn standard_registry() -> Arc<RunnerRegistry> {
    Arc::new(RunnerRegistry::standard())
}
