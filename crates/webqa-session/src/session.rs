use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use soulbrowser_core_types::TestId;

use crate::config::{LlmConfig, TestConfiguration};
use crate::context::TestExecutionContext;
use crate::errors::SessionError;
use crate::result::TestResult;

/// Paths to the artifacts written by webqa-report for this run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportPaths {
    pub json_report: Option<String>,
    pub html_report: Option<String>,
    pub cases_json: Option<String>,
}

/// The root entity: one orchestration run. Exclusively owns
/// configurations, contexts and results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestSession {
    pub session_id: String,
    pub target_url: String,
    pub llm_config: LlmConfig,
    pub configurations: HashMap<String, TestConfiguration>,
    /// `test_id`s in the order they were submitted. `configurations` is a
    /// map (keyed lookup for the Executor/Aggregator), so this is the one
    /// place submission order survives for batch planning.
    pub submission_order: Vec<String>,
    pub contexts: HashMap<String, TestExecutionContext>,
    pub results: HashMap<String, TestResult>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub aggregated_results: Option<serde_json::Value>,
    pub report_paths: ReportPaths,
}

impl TestSession {
    pub fn new(
        session_id: impl Into<String>,
        target_url: impl Into<String>,
        llm_config: LlmConfig,
        configurations: Vec<TestConfiguration>,
    ) -> Self {
        let mut contexts = HashMap::new();
        let mut by_id = HashMap::new();
        let mut submission_order = Vec::with_capacity(configurations.len());
        for cfg in configurations {
            let key = cfg.test_id.0.clone();
            contexts.insert(key.clone(), TestExecutionContext::new(cfg.test_id.clone()));
            submission_order.push(key.clone());
            by_id.insert(key, cfg);
        }
        Self {
            session_id: session_id.into(),
            target_url: target_url.into(),
            llm_config,
            configurations: by_id,
            submission_order,
            contexts,
            results: HashMap::new(),
            start_time: Utc::now(),
            end_time: None,
            aggregated_results: None,
            report_paths: ReportPaths::default(),
        }
    }

    pub fn configuration(&self, test_id: &TestId) -> Option<&TestConfiguration> {
        self.configurations.get(&test_id.0)
    }

    /// Configurations in submission order, the input to batch planning.
    pub fn configurations_in_order(&self) -> Vec<&TestConfiguration> {
        self.submission_order
            .iter()
            .filter_map(|id| self.configurations.get(id))
            .collect()
    }

    pub fn context_mut(&mut self, test_id: &TestId) -> Option<&mut TestExecutionContext> {
        self.contexts.get_mut(&test_id.0)
    }

    /// Records a result; enforces the invariant that every result id must
    /// already appear in configurations) and rejects double-writes, since
    /// the Executor aggregation stage is meant to write each test_id once
    ///.
    pub fn update_test_result(&mut self, result: TestResult) -> Result<(), SessionError> {
        let key = result.test_id.0.clone();
        if !self.configurations.contains_key(&key) {
            return Err(SessionError::UnknownTestId(result.test_id));
        }
        if self.results.contains_key(&key) {
            return Err(SessionError::DuplicateResult(result.test_id));
        }
        self.results.insert(key, result);
        Ok(())
    }

    /// Seals the session: sets end_time, refuses to run twice.
    pub fn complete_session(&mut self) -> Result<(), SessionError> {
        if self.end_time.is_some() {
            return Err(SessionError::AlreadySealed);
        }
        self.end_time = Some(Utc::now());
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.end_time.is_some()
    }

    /// That invariant as a standalone check, useful in tests and as a
    /// final sanity pass before the aggregator runs.
    pub fn check_result_ids_subset_of_configurations(&self) -> bool {
        self.results.keys().all(|k| self.configurations.contains_key(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrowserConfig, TestType};

    fn sample_config(id: &str) -> TestConfiguration {
        TestConfiguration {
            test_id: TestId(id.to_string()),
            test_type: TestType::UxTest,
            test_name: format!("test {id}"),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: HashMap::new(),
            timeout_secs: 300,
            retry_count: 0,
            dependencies: vec![],
        }
    }

    fn sample_llm_config() -> LlmConfig {
        LlmConfig {
            api: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
            base_url: "https://example.invalid".to_string(),
            temperature: None,
            top_p: None,
        }
    }

    #[test]
    fn rejects_result_for_unknown_test_id() {
        let mut session = TestSession::new(
            "s1",
            "https://example.test",
            sample_llm_config(),
            vec![sample_config("a")],
        );
        let stray = crate::result::TestResult {
            test_id: TestId("not-configured".to_string()),
            test_type: TestType::UxTest,
            test_name: "x".to_string(),
            category: crate::result::ResultCategory::Ui,
            status: crate::result::ResultStatus::Passed,
            start_time: Utc::now(),
            end_time: Utc::now(),
            duration_ms: 0,
            error_message: None,
            metrics: HashMap::new(),
            sub_tests: vec![],
        };
        assert!(matches!(
            session.update_test_result(stray),
            Err(SessionError::UnknownTestId(_))
        ));
    }

    #[test]
    fn complete_session_is_one_shot() {
        let mut session = TestSession::new(
            "s1",
            "https://example.test",
            sample_llm_config(),
            vec![sample_config("a")],
        );
        assert!(session.complete_session().is_ok());
        assert!(matches!(
            session.complete_session(),
            Err(SessionError::AlreadySealed)
        ));
    }
}
