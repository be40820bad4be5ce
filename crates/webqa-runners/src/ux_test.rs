//! UXTestRunner: TextCheck (LLM + page text) and ContentCheck
//! (LLM + scrolled screenshots), failing if either sub-test failed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use webqa_browser::BrowserSession;
use webqa_dom::BrowserDomCrawler;
use webqa_llm::OpenAiClient;
use webqa_session::{LlmConfig, ResultStatus, TestConfiguration, TestResult};
use webqa_ui_tester::UiTester;

use crate::common::{finish, to_llm_client_config, RunnerError};
use crate::runner::TestRunner;

const TEXT_CHECK_ASSERTION: &str =
    "The visible page text is grammatically correct, free of placeholder/lorem-ipsum content, and consistent with the page's stated purpose.";
const CONTENT_CHECK_ASSERTION: &str =
    "Images, layout and styling render correctly across the page with no broken images, overlapping elements or obvious layout breakage.";

pub struct UxTestRunner;

#[async_trait]
impl TestRunner for UxTestRunner {
    async fn run_test(
        &self,
        session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        llm_config: &LlmConfig,
        _target_url: &str,
    ) -> TestResult {
        let start_time = Utc::now();
        let Some(session) = session else {
            return finish(
                test_config,
                start_time,
                vec![],
                Some(RunnerError::SessionRequired(test_config.test_type).to_string()),
            );
        };

        let llm = match OpenAiClient::new(to_llm_client_config(llm_config)) {
            Ok(client) => client,
            Err(e) => return finish(test_config, start_time, vec![], Some(RunnerError::LlmConfig(e).to_string())),
        };

        let crawler = Box::new(BrowserDomCrawler::new(session.clone()));
        let mut tester = UiTester::new(session, crawler, Box::new(llm));

        tester.start_case("TextCheck", None).await;
        let (_, text_output) = tester.verify(TEXT_CHECK_ASSERTION).await;
        let text_passed = is_passed(&text_output);
        tester
            .finish_case(
                status_for(text_passed),
                if text_passed { "text check passed" } else { "text check failed" },
            )
            .await;

        tester.start_case("ContentCheck", None).await;
        let (_, content_output) = tester.verify(CONTENT_CHECK_ASSERTION).await;
        let content_passed = is_passed(&content_output);
        tester
            .finish_case(
                status_for(content_passed),
                if content_passed { "content check passed" } else { "content check failed" },
            )
            .await;

        let report = tester.generate_runner_format_report(test_config.test_id.0.clone(), test_config.test_name.clone());
        finish(test_config, start_time, report.sub_tests, None)
    }
}

fn is_passed(output: &serde_json::Value) -> bool {
    output.get("Validation Result").and_then(|v| v.as_str()) == Some("Validation Passed")
}

fn status_for(passed: bool) -> ResultStatus {
    if passed {
        ResultStatus::Passed
    } else {
        ResultStatus::Failed
    }
}
