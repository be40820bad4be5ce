//! Per-test execution bookkeeping, separate from the TestResult payload
//! so that duration accounting stays correct even if a runner never
//! produces a result (e.g. it panics before returning).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soulbrowser_core_types::TestId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestExecutionContext {
    pub test_id: TestId,
    /// The BrowserSession id this test ran under, if any (security tests
    /// run without one, see webqa-scheduler's sentinel session id).
    pub session_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub success: Option<bool>,
    pub error_message: Option<String>,
}

impl TestExecutionContext {
    pub fn new(test_id: TestId) -> Self {
        Self {
            test_id,
            session_id: None,
            start_time: None,
            end_time: None,
            success: None,
            error_message: None,
        }
    }

    /// One-shot: panics in debug builds if called twice, mirroring the
    /// source's single-assignment contract.
    pub fn start_execution(&mut self, session_id: Option<String>) {
        debug_assert!(self.start_time.is_none(), "start_execution called twice");
        self.session_id = session_id;
        self.start_time = Some(Utc::now());
    }

    pub fn complete_execution(&mut self, success: bool, error_message: Option<String>) {
        debug_assert!(self.end_time.is_none(), "complete_execution called twice");
        self.end_time = Some(Utc::now());
        self.success = Some(success);
        self.error_message = error_message;
    }

    /// duration = end_time - start_time.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => Some(e - s),
            _ => None,
        }
    }
}
