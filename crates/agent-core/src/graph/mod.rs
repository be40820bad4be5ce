//! Agent Loop: LangGraph-style state machine
//! driving one test session's cases through the UITester.

mod controller;
mod prompt;
mod types;
mod worker;

pub use controller::AgentLoop;
pub use types::{
    AgentCase, AgentState, CaseResult, CaseStatus, CaseStep, LoopOutcome, ReflectionDecision,
    ReflectionOutcome,
};
pub use worker::agent_worker_node;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_dom::test_support::MockCrawler;
    use webqa_llm::test_support::ScriptedClient;
    use webqa_session::BrowserConfig;
    use webqa_ui_tester::UiTester;

    use super::*;

    fn sample_dom() -> serde_json::Value {
        json!({
            "node": {"id": 1, "tagName": "DIV", "attributes": [], "isInteractive": false, "innerText": ""},
            "children": []
        })
    }

    async fn new_tester(llm_responses: Vec<Result<String, String>>) -> UiTester {
        let session = Arc::new(BrowserSession::new(BrowserConfig::default()));
        session.initialize(&MockLauncher).await.unwrap();
        let crawler = Box::new(MockCrawler::new(sample_dom()));
        let case_llm = Box::new(ScriptedClient::new(llm_responses));
        UiTester::new(session, crawler, case_llm)
    }

    #[tokio::test]
    async fn loop_completes_with_no_cases_when_planner_returns_empty_array() {
        let mut tester = new_tester(vec![]).await;
        let loop_llm = ScriptedClient::new(vec![Ok("[]".to_string())]);
        let mut agent_loop = AgentLoop::new(&loop_llm, &mut tester, "https://example.com", "verify homepage loads");
        let outcome = agent_loop.run(false).await;
        assert_eq!(outcome, LoopOutcome::NoCases);
    }

    #[tokio::test]
    async fn loop_forces_finish_after_replan_cap() {
        let mut tester = new_tester(vec![]).await;
        let plan = json!([{"name": "case-1", "objective": "check", "steps": []}]).to_string();
        let replan_response = json!({"decision": "REPLAN", "new_plan": [{"name": "case-2", "objective": "check2", "steps": []}]}).to_string();
        let loop_llm = ScriptedClient::new(vec![
            Ok(plan),
            Ok(replan_response.clone()),
            Ok(replan_response.clone()),
            Ok(replan_response),
        ]);
        let mut agent_loop = AgentLoop::new(&loop_llm, &mut tester, "https://example.com", "verify homepage loads");
        let outcome = agent_loop.run(false).await;
        assert_eq!(outcome, LoopOutcome::Completed);
        assert!(agent_loop.state().replan_count <= 3);
    }
}
