//! Test session and result data model for the WebQA engine.
//!
//! This crate owns no behavior beyond the invariants of the data itself;
//! everything that mutates a session (runners, scheduler, report) lives in
//! its own crate and depends on this one.

mod config;
mod context;
mod errors;
mod result;
mod session;

pub use config::{BrowserConfig, LlmConfig, TestConfiguration, TestType, Viewport};
pub use context::TestExecutionContext;
pub use errors::SessionError;
pub use result::{
    ActionOutcome, ReportEntry, ResultCategory, ResultStatus, Screenshot, SubTestResult,
    SubTestStep, TestResult,
};
pub use session::{ReportPaths, TestSession};

pub use soulbrowser_core_types::TestId;
