//! Agent Loop state and case shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReflectionDecision {
    Continue,
    Replan,
    Finish,
}

/// One planned test case, kept as a loosely-typed JSON object (plus the
/// handful of fields the loop itself reads) since the planner's schema
/// is extended ad hoc per run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentCase {
    pub name: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub success_criteria: Vec<String>,
    #[serde(default)]
    pub steps: Vec<CaseStep>,
    #[serde(default)]
    pub preamble_actions: Vec<CaseStep>,
    #[serde(default)]
    pub reset_session: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "pending".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseStep {
    Action {
        action: String,
        #[serde(default)]
        file_path: Option<String>,
    },
    Verify {
        verify: String,
    },
}

/// Outcome of one `agent_worker_node` run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CaseStatus {
    Passed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    pub status: String,
    pub summary: String,
    #[serde(default)]
    pub failed_steps: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReflectionOutcome {
    pub decision: ReflectionDecision,
    pub reasoning: String,
    #[serde(default)]
    pub new_plan: Vec<Value>,
}

/// The loop's mutable state, threaded through every node.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub test_cases: Vec<Value>,
    pub current_test_case_index: usize,
    pub current_case: Option<Value>,
    pub completed_cases: Vec<CaseResult>,
    pub reflection_history: Vec<ReflectionOutcome>,
    pub is_replan: bool,
    pub replan_count: u32,
    pub replanned_cases: Vec<Value>,
    pub generate_only: bool,
    /// Path `cases.json` was last written to, set once `plan_test_cases`
    /// has a report dir to persist into.
    #[serde(default)]
    pub cases_json_path: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoopOutcome {
    Completed,
    GeneratedOnly,
    NoCases,
}
