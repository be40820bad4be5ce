//! Shared scaffolding for runner implementations.

use chrono::{DateTime, Utc};
use webqa_session::{ResultCategory, ResultStatus, SubTestResult, TestConfiguration, TestResult};

/// Unrecoverable error inside a runner. Runners never
/// propagate these; `run_guarded` converts one into a FAILED TestResult.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("browser session required for test type {0:?} but none was provided")]
    SessionRequired(webqa_session::TestType),
    #[error("llm client configuration invalid: {0}")]
    LlmConfig(#[from] webqa_llm::LlmError),
}

/// Builds the common `TestResult` envelope (id, type, name, category,
/// timing) around a runner's sub-test results, deriving the top-level
/// status from them.
pub fn finish(
    test_config: &TestConfiguration,
    start_time: DateTime<Utc>,
    sub_tests: Vec<SubTestResult>,
    error_message: Option<String>,
) -> TestResult {
    let end_time = Utc::now();
    let status = if sub_tests.is_empty() && error_message.is_some() {
        ResultStatus::Failed
    } else {
        TestResult::derive_status_from_sub_tests(&sub_tests)
    };
    TestResult {
        test_id: test_config.test_id.clone(),
        test_type: test_config.test_type,
        test_name: test_config.test_name.clone(),
        category: ResultCategory::from(test_config.test_type),
        status,
        start_time,
        end_time,
        duration_ms: (end_time - start_time).num_milliseconds(),
        error_message,
        metrics: Default::default(),
        sub_tests,
    }
}

/// A result for a test kind whose prerequisites weren't met (non-Chromium
/// browser, missing external tool): INCOMPLETED, no sub-tests.
pub fn incompleted(test_config: &TestConfiguration, start_time: DateTime<Utc>, reason: impl Into<String>) -> TestResult {
    let end_time = Utc::now();
    TestResult {
        test_id: test_config.test_id.clone(),
        test_type: test_config.test_type,
        test_name: test_config.test_name.clone(),
        category: ResultCategory::from(test_config.test_type),
        status: ResultStatus::Incompleted,
        start_time,
        end_time,
        duration_ms: (end_time - start_time).num_milliseconds(),
        error_message: Some(reason.into()),
        metrics: Default::default(),
        sub_tests: vec![],
    }
}

/// Converts the declarative `LlmConfig` (session-owned, wire shape) into
/// webqa-llm's client-owned config.
pub fn to_llm_client_config(llm_config: &webqa_session::LlmConfig) -> webqa_llm::LlmClientConfig {
    webqa_llm::LlmClientConfig {
        api: llm_config.api.clone(),
        model: llm_config.model.clone(),
        api_key: llm_config.api_key.clone(),
        base_url: if llm_config.base_url.is_empty() {
            None
        } else {
            Some(llm_config.base_url.clone())
        },
        timeout_secs: 60,
    }
}
