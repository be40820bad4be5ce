//! UITester: the per-case recorder that turns a natural
//! language instruction/assertion into a crawl → plan/verify → execute
//! → screenshot cycle and accumulates runner-shaped step records.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use webqa_actions::ActionHandler;
use webqa_browser::BrowserSession;
use webqa_dom::DomCrawler;
use webqa_executor_actions::ActionExecutor;
use webqa_llm::{get_response_with_retry, Images, LlmClient, PLANNING_TEMPERATURE, VERIFICATION_TEMPERATURE};
use webqa_session::{ActionOutcome, ReportEntry, ResultStatus, Screenshot, SubTestResult, SubTestStep};

use crate::elements::describe_elements;
use crate::errors::UiTesterError;
use crate::prompt::{prepare_prompt, PLANNER_OUTPUT_PROMPT, PLANNER_SYSTEM_PROMPT, VERIFICATION_PROMPT, VERIFICATION_SYSTEM_PROMPT};

const PLAN_MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF: std::time::Duration = std::time::Duration::from_secs(1);

struct CaseState {
    name: String,
    #[allow(dead_code)]
    case_info: Value,
    steps: Vec<SubTestStep>,
    #[allow(dead_code)]
    start_time: chrono::DateTime<Utc>,
}

pub struct RunnerReport {
    pub test_id: String,
    pub test_name: String,
    pub sub_tests: Vec<SubTestResult>,
    pub total_cases: usize,
    pub passed_cases: usize,
    pub failed_cases: usize,
}

pub struct UiTester {
    handler: ActionHandler,
    crawler: Box<dyn DomCrawler>,
    llm: Box<dyn LlmClient>,
    current_case: Option<CaseState>,
    all_cases: Vec<SubTestResult>,
    step_counter: u32,
}

impl UiTester {
    pub fn new(session: Arc<BrowserSession>, crawler: Box<dyn DomCrawler>, llm: Box<dyn LlmClient>) -> Self {
        Self {
            handler: ActionHandler::new(session),
            crawler,
            llm,
            current_case: None,
            all_cases: Vec::new(),
            step_counter: 0,
        }
    }

    /// Opens a new case, force-finishing any still-active one as
    /// `interrupted`.
    pub async fn start_case(&mut self, case_name: &str, case_info: Option<Value>) {
        if self.current_case.is_some() {
            tracing::warn!(case_name, "starting new case while previous one is active, interrupting it");
            self.finish_case(ResultStatus::Cancelled, "Case was interrupted by new case start").await;
        }
        self.current_case = Some(CaseState {
            name: case_name.to_string(),
            case_info: case_info.unwrap_or(Value::Null),
            steps: Vec::new(),
            start_time: Utc::now(),
        });
        self.step_counter = 0;
    }

    fn add_step_data(&mut self, mut step: SubTestStep) -> Result<(), UiTesterError> {
        let case = self.current_case.as_mut().ok_or(UiTesterError::NoActiveCase)?;
        self.step_counter += 1;
        step.id = self.step_counter;
        case.steps.push(step);
        Ok(())
    }

    /// Executes one AI-driven action instruction and returns the
    /// runner-shaped step plus a `{success, message}` summary. Never
    /// propagates an error: crawl/LLM/execution failures are recorded
    /// as a failed step, mirroring the source's blanket try/except.
    pub async fn action(&mut self, instruction: &str, file_path: Option<&str>) -> (SubTestStep, ActionOutcome) {
        let start_time = Utc::now();
        match self.run_action(instruction, file_path).await {
            Ok((step, outcome)) => (step, outcome),
            Err(e) => {
                let outcome = ActionOutcome {
                    success: false,
                    message: format!("An exception occurred in action: {e}"),
                };
                let step = SubTestStep {
                    id: 0,
                    description: format!("action: {instruction}"),
                    actions: vec![],
                    screenshots: vec![],
                    model_io: None,
                    status: ResultStatus::Failed,
                    start_time,
                    end_time: Utc::now(),
                    error: Some(e.to_string()),
                };
                let _ = self.add_step_data(step.clone());
                (step, outcome)
            }
        }
    }

    async fn run_action(
        &mut self,
        instruction: &str,
        file_path: Option<&str>,
    ) -> Result<(SubTestStep, ActionOutcome), UiTesterError> {
        let start_time = Utc::now();

        let id_outcome = self.crawler.crawl(true, false, true).await?;
        self.handler.set_element_buffer(id_outcome.elements.clone());
        let page_description = describe_elements(&id_outcome.elements);

        let text_outcome = self.crawler.crawl(false, true, true).await?;
        let page_structure = self.crawler.get_text(&text_outcome);

        let marker_screenshot = self.handler.b64_page_screenshot(true).await?;
        self.crawler.remove_marker().await?;

        let user_prompt = prepare_prompt(instruction, &page_description, PLANNER_OUTPUT_PROMPT, &page_structure);
        let plan = self.generate_plan(&user_prompt, &marker_screenshot).await?;

        let actions = plan
            .get("actions")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut action_outcomes = Vec::new();
        let mut screenshots = vec![Screenshot::base64(marker_screenshot.clone())];
        let mut final_outcome = ActionOutcome {
            success: true,
            message: "All actions executed successfully".to_string(),
        };

        let executor = ActionExecutor::new(&self.handler);
        for mut action in actions {
            if action.get("type").and_then(Value::as_str) == Some("Upload") {
                if let Some(path) = file_path {
                    if let Some(param) = action.get_mut("param") {
                        if param.get("file_path").is_none() {
                            param["file_path"] = Value::String(path.to_string());
                        }
                    }
                }
            }
            let result = executor.execute(&action).await;
            tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
            let post_screenshot = self.handler.b64_page_screenshot(true).await.ok();
            if let Some(shot) = &post_screenshot {
                screenshots.push(Screenshot::base64(shot.clone()));
            }
            action_outcomes.push(ActionOutcome {
                success: result.success,
                message: result.message.clone(),
            });
            if !result.success {
                final_outcome = ActionOutcome {
                    success: false,
                    message: result.message,
                };
                break;
            }
        }

        let status = if final_outcome.success { ResultStatus::Passed } else { ResultStatus::Failed };
        let step = SubTestStep {
            id: 0,
            description: format!("action: {instruction}"),
            actions: action_outcomes,
            screenshots,
            model_io: Some(plan),
            status,
            start_time,
            end_time: Utc::now(),
            error: None,
        };
        self.add_step_data(step.clone())?;
        Ok((step, final_outcome))
    }

    /// `_generate_plan`: up to `PLAN_MAX_ATTEMPTS` retries with a 1s
    /// backoff, re-querying the LLM on parse/empty-actions failures
    /// (not merely network failures, unlike `get_response_with_retry`).
    async fn generate_plan(&self, user_prompt: &str, marker_screenshot: &str) -> Result<Value, UiTesterError> {
        let mut last_error = String::new();
        for attempt in 0..PLAN_MAX_ATTEMPTS {
            let response = get_response_with_retry(
                self.llm.as_ref(),
                PLANNER_SYSTEM_PROMPT,
                user_prompt,
                Some(Images::One(marker_screenshot.to_string())),
                PLANNING_TEMPERATURE,
                1,
                RETRY_BACKOFF,
            )
            .await;
            match response {
                Ok(text) => match serde_json::from_str::<Value>(&text) {
                    Ok(plan) if plan.get("actions").and_then(Value::as_array).is_some_and(|a| !a.is_empty()) => {
                        return Ok(plan)
                    }
                    Ok(_) => last_error = "No valid actions found in plan".to_string(),
                    Err(e) => last_error = format!("Invalid JSON response: {e}"),
                },
                Err(e) => last_error = e.to_string(),
            }
            tracing::warn!(attempt, error = %last_error, "plan generation attempt failed, retrying");
            if attempt + 1 < PLAN_MAX_ATTEMPTS {
                tokio::time::sleep(RETRY_BACKOFF).await;
            }
        }
        Err(UiTesterError::Plan(last_error))
    }

    /// Executes an assertion-style verification and returns the runner
    /// step plus the normalized `{Validation Result, Details}` output.
    pub async fn verify(&mut self, assertion: &str) -> (SubTestStep, Value) {
        let start_time = Utc::now();
        match self.run_verify(assertion, start_time).await {
            Ok(result) => result,
            Err(e) => {
                let step = SubTestStep {
                    id: 0,
                    description: format!("verify: {assertion}"),
                    actions: vec![],
                    screenshots: vec![],
                    model_io: None,
                    status: ResultStatus::Failed,
                    start_time,
                    end_time: Utc::now(),
                    error: Some(e.to_string()),
                };
                let _ = self.add_step_data(step.clone());
                let output = serde_json::json!({
                    "Validation Result": "Validation Failed",
                    "Details": [e.to_string()],
                });
                (step, output)
            }
        }
    }

    async fn run_verify(
        &mut self,
        assertion: &str,
        start_time: chrono::DateTime<Utc>,
    ) -> Result<(SubTestStep, Value), UiTesterError> {
        let id_outcome = self.crawler.crawl(true, false, true).await?;
        let page_description = describe_elements(&id_outcome.elements);

        let marker_screenshot = self.handler.b64_page_screenshot(true).await?;
        self.crawler.remove_marker().await?;
        let plain_screenshot = self.handler.b64_page_screenshot(true).await?;

        let text_outcome = self.crawler.crawl(false, true, true).await?;
        let page_structure = self.crawler.get_text(&text_outcome);

        let user_prompt = prepare_prompt(
            &format!("assertion: {assertion}"),
            &format!("page label: {page_description}"),
            VERIFICATION_PROMPT,
            &page_structure,
        );

        let raw = self
            .llm
            .get_response(
                VERIFICATION_SYSTEM_PROMPT,
                &user_prompt,
                Some(Images::Many(vec![marker_screenshot.clone(), plain_screenshot.clone()])),
                VERIFICATION_TEMPERATURE,
            )
            .await?;

        let model_output = normalize_verification_output(&raw);
        let passed = model_output.get("Validation Result").and_then(Value::as_str) == Some("Validation Passed");

        let step = SubTestStep {
            id: 0,
            description: format!("verify: {assertion}"),
            actions: vec![],
            screenshots: vec![Screenshot::base64(marker_screenshot), Screenshot::base64(plain_screenshot)],
            model_io: serde_json::from_str(&raw).ok().or(Some(Value::String(raw))),
            status: if passed { ResultStatus::Passed } else { ResultStatus::Failed },
            start_time,
            end_time: Utc::now(),
            error: None,
        };
        self.add_step_data(step.clone())?;
        Ok((step, model_output))
    }

    pub async fn finish_case(&mut self, status: ResultStatus, summary: impl Into<String>) {
        let Some(case) = self.current_case.take() else {
            tracing::warn!("no active case to finish");
            return;
        };
        let snapshot = self.handler.session().monitoring_snapshot().await;
        let mut messages = std::collections::HashMap::new();
        messages.insert("network".to_string(), snapshot.network);
        messages.insert("console".to_string(), snapshot.console);
        let result = SubTestResult {
            name: case.name,
            status,
            steps: case.steps,
            report: Vec::<ReportEntry>::new(),
            messages,
            final_summary: summary.into(),
            metrics: Default::default(),
        };
        self.all_cases.push(result);
    }

    /// Aggregates all finished cases into a single runner-shaped report
    ///.
    pub fn generate_runner_format_report(&self, test_id: impl Into<String>, test_name: impl Into<String>) -> RunnerReport {
        let total_cases = self.all_cases.len();
        let passed_cases = self.all_cases.iter().filter(|c| c.status.is_passed()).count();
        RunnerReport {
            test_id: test_id.into(),
            test_name: test_name.into(),
            sub_tests: self.all_cases.clone(),
            total_cases,
            passed_cases,
            failed_cases: total_cases - passed_cases,
        }
    }
}

/// Normalizes a verification response into `{"Validation Result": ...,
/// "Details": [String]}`, tolerating non-JSON text.
fn normalize_verification_output(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) if parsed.is_object() => {
            let result = parsed
                .get("Validation Result")
                .and_then(Value::as_str)
                .unwrap_or("Validation Failed")
                .to_string();
            let details = match parsed.get("Details") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                    .collect(),
                Some(Value::String(s)) => vec![s.clone()],
                Some(other) => vec![other.to_string()],
                None => vec![],
            };
            serde_json::json!({"Validation Result": result, "Details": details})
        }
        _ => serde_json::json!({
            "Validation Result": "Validation Failed",
            "Details": [format!("LLM returned invalid JSON: {raw}")],
        }),
    }
}
