//! UIAgentLangGraphRunner: constructs a UITester, drives the
//! Agent Loop to termination, converts its runner-format report into a
//! TestResult.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use webqa_browser::BrowserSession;
use webqa_dom::BrowserDomCrawler;
use webqa_llm::OpenAiClient;
use webqa_session::{LlmConfig, ResultStatus, TestConfiguration, TestResult};
use webqa_ui_tester::UiTester;
use agent_core::{AgentLoop, LoopOutcome};

use crate::common::{finish, to_llm_client_config, RunnerError};
use crate::runner::TestRunner;

/// Sums each case's `messages.network.{responses,failed_requests}` and
/// `messages.console` arrays, plus step counts, across every case.
fn summarize_case_messages(sub_tests: &[webqa_session::SubTestResult]) -> (usize, usize, usize, usize) {
    let mut total_failed_requests = 0;
    let mut total_requests = 0;
    let mut total_console_errors = 0;
    let mut total_steps = 0;

    for case in sub_tests {
        total_steps += case.steps.len();
        if let Some(network) = case.messages.get("network").and_then(|v| v.as_object()) {
            total_failed_requests += network.get("failed_requests").and_then(|v| v.as_array()).map_or(0, Vec::len);
            total_requests += network.get("responses").and_then(|v| v.as_array()).map_or(0, Vec::len);
        }
        if let Some(console) = case.messages.get("console").and_then(|v| v.as_array()) {
            total_console_errors += console.len();
        }
    }
    (total_failed_requests, total_requests, total_console_errors, total_steps)
}

pub struct UiAgentLangGraphRunner;

#[async_trait]
impl TestRunner for UiAgentLangGraphRunner {
    async fn run_test(
        &self,
        session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        llm_config: &LlmConfig,
        target_url: &str,
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

        let client_config = to_llm_client_config(llm_config);
        let llm = match OpenAiClient::new(client_config) {
            Ok(client) => client,
            Err(e) => return finish(test_config, start_time, vec![], Some(RunnerError::LlmConfig(e).to_string())),
        };

        // The tester owns a boxed LlmClient for its own action/verify calls;
        // the Agent Loop's planner/reflector calls go through a second,
        // independently-owned client so both can hold `&dyn LlmClient`
        // borrows at once without aliasing one value two ways.
        let loop_llm = match OpenAiClient::new(to_llm_client_config(llm_config)) {
            Ok(client) => client,
            Err(e) => return finish(test_config, start_time, vec![], Some(RunnerError::LlmConfig(e).to_string())),
        };

        let crawler = Box::new(BrowserDomCrawler::new(session.clone()));
        let mut tester = UiTester::new(session, crawler, Box::new(llm));
        let business_objectives = test_config.business_objectives().unwrap_or("").to_string();

        let report_dir = webqa_report::resolve_report_dir(None);
        let mut agent_loop = AgentLoop::new(&loop_llm, &mut tester, target_url, business_objectives).with_report_dir(report_dir);
        let outcome = agent_loop.run(false).await;
        let cases_json_path = agent_loop.state().cases_json_path.clone();

        let report = tester.generate_runner_format_report(test_config.test_id.0.clone(), test_config.test_name.clone());
        let error_message = match outcome {
            LoopOutcome::NoCases => Some("planner produced no test cases".to_string()),
            _ => None,
        };

        let (total_failed_requests, total_requests, total_console_errors, total_steps) =
            summarize_case_messages(&report.sub_tests);

        let mut result = finish(test_config, start_time, report.sub_tests, error_message);
        result
            .metrics
            .insert("total_cases".to_string(), serde_json::json!(report.total_cases));
        result
            .metrics
            .insert("passed_cases".to_string(), serde_json::json!(report.passed_cases));
        result
            .metrics
            .insert("failed_cases".to_string(), serde_json::json!(report.failed_cases));
        let success_rate = if report.total_cases == 0 {
            0.0
        } else {
            report.passed_cases as f64 / report.total_cases as f64
        };
        result
            .metrics
            .insert("success_rate".to_string(), serde_json::json!(success_rate));
        result.metrics.insert("total_steps".to_string(), serde_json::json!(total_steps));
        result
            .metrics
            .insert("network_failed_requests_count".to_string(), serde_json::json!(total_failed_requests));
        result
            .metrics
            .insert("network_total_requests_count".to_string(), serde_json::json!(total_requests));
        result
            .metrics
            .insert("console_error_count".to_string(), serde_json::json!(total_console_errors));
        if let Some(path) = cases_json_path {
            result.metrics.insert("cases_json_path".to_string(), serde_json::json!(path));
        }

        if matches!(outcome, LoopOutcome::NoCases) {
            result.status = ResultStatus::Incompleted;
        }
        result
    }
}
