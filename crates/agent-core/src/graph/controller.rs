//! Agent Loop controller: the
//! `setup_session → plan_test_cases → get_next_test_case →
//! execute_single_case → reflect_and_replan → {...} → cleanup_session`
//! state machine, driven as a plain loop rather than a literal graph
//! object — the nodes are methods, the edges are `match` arms.

use std::path::PathBuf;

use serde_json::Value;
use webqa_llm::{get_response_with_retry, LlmClient, PLANNING_TEMPERATURE};
use webqa_ui_tester::UiTester;

use super::prompt::{planner_user_prompt, reflector_user_prompt, PLANNER_SYSTEM_PROMPT, REFLECTOR_SYSTEM_PROMPT};
use super::types::{AgentCase, AgentState, LoopOutcome, ReflectionDecision, ReflectionOutcome};
use super::worker::agent_worker_node;

/// The reflector is the sole writer of `current_test_case_index`;
/// a third REPLAN is forced to FINISH.
const MAX_REPLANS: u32 = 2;
const PLAN_RETRY_ATTEMPTS: u32 = 2;
const PLAN_RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);

pub struct AgentLoop<'a> {
    llm: &'a dyn LlmClient,
    tester: &'a mut UiTester,
    target_url: String,
    business_objectives: String,
    state: AgentState,
    report_dir: Option<PathBuf>,
}

impl<'a> AgentLoop<'a> {
    pub fn new(llm: &'a dyn LlmClient, tester: &'a mut UiTester, target_url: impl Into<String>, business_objectives: impl Into<String>) -> Self {
        Self {
            llm,
            tester,
            target_url: target_url.into(),
            business_objectives: business_objectives.into(),
            state: AgentState::default(),
            report_dir: None,
        }
    }

    /// Directory `cases.json` is persisted into on each (re)plan. Left
    /// unset, planning never touches disk — the unit tests in this
    /// crate rely on that to stay hermetic.
    pub fn with_report_dir(mut self, report_dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(report_dir.into());
        self
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Drives the full state machine to completion. `generate_only`
    /// is read from the state before the first planning call, matching
    /// the graph's `should_start_cases` guard.
    pub async fn run(&mut self, generate_only: bool) -> LoopOutcome {
        self.state.generate_only = generate_only;
        self.plan_test_cases().await;

        if self.state.generate_only {
            return LoopOutcome::GeneratedOnly;
        }
        if self.state.test_cases.is_empty() {
            return LoopOutcome::NoCases;
        }

        loop {
            self.get_next_test_case();
            self.execute_single_case().await;
            match self.reflect_and_replan().await {
                ReflectionDecision::Finish => return LoopOutcome::Completed,
                ReflectionDecision::Replan => {
                    self.plan_test_cases().await;
                }
                ReflectionDecision::Continue => {
                    if self.state.current_test_case_index >= self.state.test_cases.len() {
                        return LoopOutcome::Completed;
                    }
                }
            }
        }
    }

    /// `plan_test_cases`: fresh LLM plan, or splice `replanned_cases`
    /// after the current index when `is_replan`. Either way, the
    /// resulting `test_cases` are persisted to `cases.json` in the
    /// report dir (§6), each enriched with `status:"pending"` and `url`.
    async fn plan_test_cases(&mut self) {
        if self.state.is_replan {
            let insert_at = (self.state.current_test_case_index + 1).min(self.state.test_cases.len());
            let target_url = self.target_url.clone();
            for (offset, mut case) in self.state.replanned_cases.drain(..).enumerate() {
                enrich_case(&mut case, &target_url);
                self.state.test_cases.insert(insert_at + offset, case);
            }
            self.state.is_replan = false;
            self.state.replan_count += 1;
            self.persist_cases_json().await;
            return;
        }

        let prompt = planner_user_prompt(&self.target_url, &self.business_objectives);
        let response = get_response_with_retry(
            self.llm,
            PLANNER_SYSTEM_PROMPT,
            &prompt,
            None,
            PLANNING_TEMPERATURE,
            PLAN_RETRY_ATTEMPTS,
            PLAN_RETRY_BACKOFF,
        )
        .await;

        let cases: Vec<Value> = match response {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "planner LLM call failed, proceeding with no cases");
                Vec::new()
            }
        };
        let target_url = self.target_url.clone();
        self.state.test_cases = cases
            .into_iter()
            .map(|mut case| {
                enrich_case(&mut case, &target_url);
                case
            })
            .collect();
        self.persist_cases_json().await;
    }

    /// Writes the current `test_cases` to `<report_dir>/cases.json` and
    /// records the path in `state.cases_json_path`. A no-op when no
    /// report dir was set (e.g. in hermetic unit tests).
    async fn persist_cases_json(&mut self) {
        let Some(dir) = self.report_dir.clone() else {
            return;
        };
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::error!(error = %e, dir = %dir.display(), "failed to create report dir for cases.json");
            return;
        }
        let json = match serde_json::to_string_pretty(&self.state.test_cases) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize cases.json");
                return;
            }
        };
        let path = dir.join("cases.json");
        if let Err(e) = tokio::fs::write(&path, json).await {
            tracing::error!(error = %e, path = %path.display(), "failed to write cases.json");
            return;
        }
        self.state.cases_json_path = Some(path.display().to_string());
    }

    fn get_next_test_case(&mut self) {
        self.state.current_case = self.state.test_cases.get(self.state.current_test_case_index).cloned();
    }

    async fn execute_single_case(&mut self) {
        let Some(raw_case) = self.state.current_case.clone() else {
            return;
        };
        let case: AgentCase = match serde_json::from_value(raw_case) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "malformed test case, skipping");
                return;
            }
        };

        self.tester.start_case(&case.name, None).await;
        let result = agent_worker_node(self.tester, &case, None).await;
        let status = if result.status == "passed" {
            webqa_session::ResultStatus::Passed
        } else {
            webqa_session::ResultStatus::Failed
        };
        self.tester.finish_case(status, result.summary.clone()).await;
        self.state.completed_cases.push(result);
    }

    /// `reflect_and_replan`: increments the index first, then either forces FINISH at
    /// the replan cap or asks the LLM.
    async fn reflect_and_replan(&mut self) -> ReflectionDecision {
        self.state.current_test_case_index += 1;

        if self.state.replan_count >= MAX_REPLANS {
            let outcome = ReflectionOutcome {
                decision: ReflectionDecision::Finish,
                reasoning: "replan cap reached".to_string(),
                new_plan: vec![],
            };
            self.state.reflection_history.push(outcome);
            return ReflectionDecision::Finish;
        }

        let current_plan = serde_json::to_string(&self.state.test_cases).unwrap_or_default();
        let completed = serde_json::to_string(&self.state.completed_cases).unwrap_or_default();
        let prompt = reflector_user_prompt(&self.business_objectives, &current_plan, &completed, "", "");

        let response = get_response_with_retry(
            self.llm,
            REFLECTOR_SYSTEM_PROMPT,
            &prompt,
            None,
            PLANNING_TEMPERATURE,
            1,
            PLAN_RETRY_BACKOFF,
        )
        .await;

        let outcome = match response.ok().and_then(|text| serde_json::from_str::<ReflectionOutcome>(&text).ok()) {
            Some(outcome) => outcome,
            None => ReflectionOutcome {
                decision: ReflectionDecision::Continue,
                reasoning: "reflection response was malformed, defaulting to continue".to_string(),
                new_plan: vec![],
            },
        };

        let decision = outcome.decision;
        self.state.reflection_history.push(outcome.clone());

        if decision == ReflectionDecision::Replan && !outcome.new_plan.is_empty() {
            self.state.is_replan = true;
            self.state.replanned_cases = outcome.new_plan;
        }
        decision
    }
}

/// Enriches one planner-produced case with `status:"pending"` and
/// `url`, matching §6's persisted `cases.json` shape. A no-op for
/// anything that isn't a JSON object.
fn enrich_case(case: &mut Value, target_url: &str) {
    if let Some(obj) = case.as_object_mut() {
        obj.entry("status").or_insert(Value::String("pending".to_string()));
        obj.entry("url").or_insert(Value::String(target_url.to_string()));
    }
}
