//! `agent_worker_node`: drives one case's preamble + steps
//! through a `UiTester`, then derives a pass/fail summary.

use webqa_ui_tester::UiTester;

use super::types::{AgentCase, CaseResult, CaseStep};

const NAVIGATION_KEYWORDS: &[&str] = &[
    "navigate", "go to", "open", "visit", "browse", "load", "导航", "打开", "访问", "跳转", "前往",
];

fn is_navigation_instruction(instruction: &str) -> bool {
    let lower = instruction.to_lowercase();
    NAVIGATION_KEYWORDS.iter().any(|kw| lower.contains(kw)) || instruction.contains("://")
}

fn normalize(url: &str) -> String {
    webqa_browser::normalize_url(url)
}

/// Executes `case.preamble_actions` then `case.steps` in order, skipping
/// a preamble navigation step that would just re-navigate to the
/// current page when `reset_session` already put us there.
pub async fn agent_worker_node(tester: &mut UiTester, case: &AgentCase, current_url: Option<&str>) -> CaseResult {
    let mut failed_steps = Vec::new();

    for step in &case.preamble_actions {
        if let CaseStep::Action { action, .. } = step {
            if case.reset_session && is_navigation_instruction(action) {
                if let (Some(current), Some(target)) = (current_url, case.url.as_deref()) {
                    if normalize(current) == normalize(target) {
                        continue;
                    }
                }
            }
        }
        if let Some(failure) = run_step(tester, step).await {
            return CaseResult {
                name: case.name.clone(),
                status: "failed".to_string(),
                summary: format!("FINAL_SUMMARY: failed during preamble: {failure}"),
                failed_steps: vec![failure],
            };
        }
    }

    for (index, step) in case.steps.iter().enumerate() {
        if let Some(failure) = run_step(tester, step).await {
            failed_steps.push(format!("step {}: {failure}", index + 1));
            break;
        }
    }

    build_summary(case, failed_steps)
}

async fn run_step(tester: &mut UiTester, step: &CaseStep) -> Option<String> {
    match step {
        CaseStep::Action { action, file_path } => {
            let (_, outcome) = tester.action(action, file_path.as_deref()).await;
            if outcome.success {
                None
            } else {
                Some(outcome.message)
            }
        }
        CaseStep::Verify { verify } => {
            let (_, output) = tester.verify(verify).await;
            let passed = output.get("Validation Result").and_then(|v| v.as_str()) == Some("Validation Passed");
            if passed {
                None
            } else {
                Some(format!("assertion failed: {verify}"))
            }
        }
    }
}

/// Builds the `FINAL_SUMMARY:`-prefixed status summary.
fn build_summary(case: &AgentCase, failed_steps: Vec<String>) -> CaseResult {
    if failed_steps.is_empty() {
        CaseResult {
            name: case.name.clone(),
            status: "passed".to_string(),
            summary: format!("FINAL_SUMMARY: test case completed successfully: {}", case.objective),
            failed_steps,
        }
    } else {
        CaseResult {
            name: case.name.clone(),
            status: "failed".to_string(),
            summary: format!(
                "FINAL_SUMMARY: test case failed at step {}: {}",
                failed_steps.len(),
                failed_steps.last().cloned().unwrap_or_default()
            ),
            failed_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_navigation_instruction_in_english_and_chinese() {
        assert!(is_navigation_instruction("Navigate to the homepage"));
        assert!(is_navigation_instruction("打开登录页面"));
        assert!(!is_navigation_instruction("click the submit button"));
    }

    #[test]
    fn summary_reports_passed_with_no_failures() {
        let case = AgentCase {
            name: "case".to_string(),
            objective: "check login".to_string(),
            success_criteria: vec![],
            steps: vec![],
            preamble_actions: vec![],
            reset_session: false,
            url: None,
            status: "pending".to_string(),
        };
        let result = build_summary(&case, vec![]);
        assert_eq!(result.status, "passed");
        assert!(result.summary.contains("completed successfully"));
    }

    #[test]
    fn summary_reports_failed_with_failure_list() {
        let case = AgentCase {
            name: "case".to_string(),
            objective: "check login".to_string(),
            success_criteria: vec![],
            steps: vec![],
            preamble_actions: vec![],
            reset_session: false,
            url: None,
            status: "pending".to_string(),
        };
        let result = build_summary(&case, vec!["step 1: boom".to_string()]);
        assert_eq!(result.status, "failed");
        assert!(result.summary.contains("test case failed"));
    }
}
