//! Test outcomes: TestResult, SubTestResult, SubTestStep and their status enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::TestType;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Warning,
    Cancelled,
    Incompleted,
}

impl ResultStatus {
    /// Treated as "not passed" for the failed_subtests count.
    pub fn is_passed(self) -> bool {
        matches!(self, ResultStatus::Passed)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultCategory {
    Function,
    Ui,
    Performance,
    Security,
}

impl From<TestType> for ResultCategory {
    fn from(t: TestType) -> Self {
        match t {
            TestType::UiAgentLanggraph | TestType::UxTest | TestType::ButtonTest => {
                ResultCategory::Ui
            }
            TestType::Performance => ResultCategory::Performance,
            TestType::WebBasicCheck => ResultCategory::Function,
            TestType::Security => ResultCategory::Security,
        }
    }
}

/// A screenshot attached to a step. `kind` is always "base64".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Screenshot {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
}

impl Screenshot {
    pub fn base64(data: impl Into<String>) -> Self {
        Self {
            kind: "base64".to_string(),
            data: data.into(),
        }
    }
}

/// One action or one verification within a case. `id` is the step's
/// 1-based ordinal position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubTestStep {
    pub id: u32,
    pub description: String,
    #[serde(default)]
    pub actions: Vec<ActionOutcome>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    /// Planner JSON or raw LLM response text, kept untyped since both
    /// shapes occur depending on whether this step came from `action` or
    /// `verify`.
    pub model_io: Option<serde_json::Value>,
    pub status: ResultStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

/// A named finer-grained unit within a TestResult; the issue-reporting
/// granularity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubTestResult {
    pub name: String,
    pub status: ResultStatus,
    #[serde(default)]
    pub steps: Vec<SubTestStep>,
    #[serde(default)]
    pub report: Vec<ReportEntry>,
    #[serde(default)]
    pub messages: HashMap<String, serde_json::Value>,
    pub final_summary: String,
    #[serde(default)]
    pub metrics: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportEntry {
    pub title: String,
    pub issues: Vec<String>,
}

/// Outcome of running one TestConfiguration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: soulbrowser_core_types::TestId,
    pub test_type: TestType,
    pub test_name: String,
    pub category: ResultCategory,
    pub status: ResultStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    #[serde(default)]
    pub metrics: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub sub_tests: Vec<SubTestResult>,
}

impl TestResult {
    /// Invariant: if any sub_test is FAILED and no higher-priority rule
    /// overrides, result.status is FAILED. Sub-test statuses are
    /// authoritative, so this is recomputed rather than trusted from the
    /// runner when a caller wants the derived top-level status.
    pub fn derive_status_from_sub_tests(sub_tests: &[SubTestResult]) -> ResultStatus {
        if sub_tests.is_empty() {
            return ResultStatus::Passed;
        }
        if sub_tests
            .iter()
            .any(|s| matches!(s.status, ResultStatus::Failed))
        {
            return ResultStatus::Failed;
        }
        if sub_tests
            .iter()
            .any(|s| matches!(s.status, ResultStatus::Cancelled))
        {
            return ResultStatus::Cancelled;
        }
        if sub_tests
            .iter()
            .any(|s| matches!(s.status, ResultStatus::Warning))
        {
            return ResultStatus::Warning;
        }
        ResultStatus::Passed
    }
}
