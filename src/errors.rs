//! Error taxonomy: one `thiserror` enum at the
//! orchestration boundary. Lower crates (webqa-session, webqa-browser, ...)
//! carry their own typed errors; this is where they funnel together for
//! the CLI/queue entry point. `anyhow` is reserved for the final reporting
//! boundary in `cli`/`queue`, never used inside a library crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Session(#[from] webqa_session::SessionError),

    #[error(transparent)]
    Scheduler(#[from] webqa_scheduler::SchedulerError),

    #[error(transparent)]
    Report(#[from] webqa_report::ReportError),

    #[error("no test configurations supplied, or all are disabled")]
    NoEnabledTests,

    #[error("task {0} not found")]
    UnknownTask(String),
}
