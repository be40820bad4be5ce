//! UITester.

mod elements;
mod errors;
mod prompt;
mod tester;

pub use elements::describe_elements;
pub use errors::UiTesterError;
pub use tester::{RunnerReport, UiTester};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_dom::test_support::MockCrawler;
    use webqa_llm::test_support::ScriptedClient;
    use webqa_session::{BrowserConfig, ResultStatus};

    use super::*;

    fn sample_dom() -> serde_json::Value {
        json!({
            "node": {"id": 1, "tagName": "DIV", "attributes": [], "isInteractive": false, "innerText": ""},
            "children": [
                {"node": {"id": 2, "tagName": "BUTTON", "attributes": [], "isInteractive": true, "innerText": "Submit",
                          "isVisible": true, "center_x": 10.0, "center_y": 20.0}, "children": []}
            ]
        })
    }

    async fn tester_with_plan(plan: &str) -> UiTester {
        let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
        session.initialize(&MockLauncher).await.unwrap();
        let crawler = Box::new(MockCrawler::new(sample_dom()));
        let llm = Box::new(ScriptedClient::new(vec![Ok(plan.to_string())]));
        UiTester::new(session, crawler, llm)
    }

    #[tokio::test]
    async fn start_case_resets_step_counter() {
        let mut tester = tester_with_plan("{}").await;
        tester.start_case("case-1", None).await;
        tester.finish_case(ResultStatus::Passed, "done").await;
        assert_eq!(tester.generate_runner_format_report("t1", "Test").total_cases, 1);
    }

    #[tokio::test]
    async fn action_with_empty_plan_fails_after_retries() {
        let mut tester = tester_with_plan("{}").await;
        tester.start_case("case-1", None).await;
        let (step, outcome) = tester.action("click submit", None).await;
        assert!(!outcome.success);
        assert_eq!(step.status, ResultStatus::Failed);
    }

    #[tokio::test]
    async fn action_with_valid_plan_executes_tap() {
        let plan = json!({"actions": [{"type": "Tap", "locate": {"id": "1"}}]}).to_string();
        let mut tester = tester_with_plan(&plan).await;
        tester.start_case("case-1", None).await;
        let (step, outcome) = tester.action("click submit", None).await;
        assert!(outcome.success);
        assert_eq!(step.status, ResultStatus::Passed);
        assert!(!step.screenshots.is_empty());
    }

    #[tokio::test]
    async fn verify_normalizes_passed_result() {
        let response = json!({"Validation Result": "Validation Passed", "Details": []}).to_string();
        let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
        session.initialize(&MockLauncher).await.unwrap();
        let crawler = Box::new(MockCrawler::new(sample_dom()));
        let llm = Box::new(ScriptedClient::new(vec![Ok(response)]));
        let mut tester = UiTester::new(session, crawler, llm);
        tester.start_case("case-1", None).await;
        let (step, output) = tester.verify("the submit button is visible").await;
        assert_eq!(step.status, ResultStatus::Passed);
        assert_eq!(output["Validation Result"], "Validation Passed");
    }

    #[tokio::test]
    async fn finish_case_attaches_network_and_console_monitoring_to_messages() {
        let mut tester = tester_with_plan("{}").await;
        tester.start_case("case-1", None).await;
        tester.finish_case(ResultStatus::Passed, "done").await;
        let report = tester.generate_runner_format_report("t1", "Test");
        let messages = &report.sub_tests[0].messages;
        assert!(messages.contains_key("network"));
        assert!(messages.contains_key("console"));
    }
}
