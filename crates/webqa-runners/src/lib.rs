//! Test Runners: per-test-kind adapters invoked
//! by the Parallel Executor.

mod button_test;
mod common;
mod lighthouse;
mod registry;
mod runner;
mod security;
mod ui_agent_langgraph;
mod ux_test;
mod web_basic_check;

pub use button_test::ButtonTestRunner;
pub use common::RunnerError;
pub use lighthouse::LighthouseTestRunner;
pub use registry::RunnerRegistry;
pub use runner::TestRunner;
pub use security::SecurityTestRunner;
pub use ui_agent_langgraph::UiAgentLangGraphRunner;
pub use ux_test::UxTestRunner;
pub use web_basic_check::WebBasicCheckRunner;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_session::{BrowserConfig, LlmConfig, ResultStatus, TestConfiguration, TestType};

    use super::*;

    fn llm_config() -> LlmConfig {
        LlmConfig {
            api: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
            base_url: String::new(),
            temperature: None,
            top_p: None,
        }
    }

    fn config(test_type: TestType) -> TestConfiguration {
        TestConfiguration {
            test_id: soulbrowser_core_types::TestId("t1".to_string()),
            test_type,
            test_name: "sample".to_string(),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: Default::default(),
            timeout_secs: 300,
            retry_count: 0,
            dependencies: vec![],
        }
    }

    #[tokio::test]
    async fn security_runner_always_incompletes_without_a_session() {
        let runner = SecurityTestRunner;
        let result = runner
            .run_test(None, &config(TestType::Security), &llm_config(), "https://example.test")
            .await;
        assert_eq!(result.status, ResultStatus::Incompleted);
    }

    #[tokio::test]
    async fn lighthouse_runner_incompletes_for_non_chromium_browser() {
        let runner = LighthouseTestRunner;
        let mut cfg = config(TestType::Performance);
        cfg.test_specific_config.insert("browser_type".to_string(), json!("firefox"));
        let result = runner.run_test(None, &cfg, &llm_config(), "https://example.test").await;
        assert_eq!(result.status, ResultStatus::Incompleted);
        assert!(result.error_message.unwrap().contains("firefox"));
    }

    #[tokio::test]
    async fn button_runner_requires_a_session() {
        let runner = ButtonTestRunner;
        let result = runner
            .run_test(None, &config(TestType::ButtonTest), &llm_config(), "https://example.test")
            .await;
        assert_eq!(result.status, ResultStatus::Failed);
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn button_runner_clicks_every_interactive_element() {
        let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
        session.initialize(&MockLauncher).await.unwrap();
        let runner = ButtonTestRunner;
        let result = runner
            .run_test(
                Some(session),
                &config(TestType::ButtonTest),
                &llm_config(),
                "https://example.test",
            )
            .await;
        assert_eq!(result.sub_tests.len(), 1);
    }
}
