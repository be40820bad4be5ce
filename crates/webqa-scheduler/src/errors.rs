use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("session error: {0}")]
    Session(#[from] webqa_session::SessionError),
    #[error("no runner registered for test type {0:?}")]
    NoRunner(webqa_session::TestType),
    #[error("report generation failed: {0}")]
    Report(#[from] webqa_report::ReportError),
}
