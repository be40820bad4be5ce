//! Result Aggregator: collates TestSession
//! results into the two-tab UI structure ("摘要与建议" / "问题列表"),
//! LLM-summarizing non-passed sub-tests with a keyword-based fallback.

use serde_json::{json, Value};
use webqa_llm::{LlmClient, VERIFICATION_TEMPERATURE};
use webqa_session::{ResultStatus, SubTestResult, TestSession};

const HIGH_KEYWORDS: &[&str] = &["error", "fail", "严重", "错误", "崩溃", "无法"];
const LOW_KEYWORDS: &[&str] = &["warning", "警告", "建议", "优化", "改进"];

const ISSUE_EXTRACTION_SYSTEM_PROMPT: &str = "You are a QA assistant. Given a JSON description of a failed or \
warning sub-test, extract a concise list of distinct issues and their severity. Respond with JSON only: \
{\"issue_count\": <int>, \"issues\": [<string>, ...], \"severity\": \"high\"|\"medium\"|\"low\"}.";

/// Aggregates one session's results. Never fails: an LLM error
/// for one sub-test degrades that entry to the keyword heuristic rather
/// than aborting the whole aggregation.
pub async fn aggregate_results(session: &TestSession, llm: Option<&dyn LlmClient>) -> Value {
    let mut total = 0u64;
    let mut passed = 0u64;
    let mut issues = Vec::new();

    for result in session.results.values() {
        if let Some(message) = result.error_message.as_deref() {
            if !message.is_empty() {
                issues.push(json!({
                    "test_id": result.test_id.0,
                    "test_name": result.test_name,
                    "sub_test": Value::Null,
                    "status": status_label(result.status),
                    "severity": severity_from_status(result.status),
                    "issue_count": 1,
                    "issues": [message],
                }));
            }
        }

        for sub in &result.sub_tests {
            total += 1;
            if sub.status.is_passed() {
                passed += 1;
                continue;
            }

            let (severity, sub_issues, issue_count) = match llm {
                Some(client) => match extract_via_llm(client, sub).await {
                    Some(extracted) => extracted,
                    None => heuristic(sub),
                },
                None => heuristic(sub),
            };

            issues.push(json!({
                "test_id": result.test_id.0,
                "test_name": result.test_name,
                "sub_test": sub.name,
                "status": status_label(sub.status),
                "severity": severity,
                "issue_count": issue_count,
                "issues": sub_issues,
            }));
        }
    }

    let failed = total - passed;
    json!({
        "摘要与建议": {
            "total_subtests": total,
            "passed_subtests": passed,
            "failed_subtests": failed,
        },
        "问题列表": issues,
    })
}

fn status_label(status: ResultStatus) -> &'static str {
    match status {
        ResultStatus::Pending => "PENDING",
        ResultStatus::Running => "RUNNING",
        ResultStatus::Passed => "PASSED",
        ResultStatus::Failed => "FAILED",
        ResultStatus::Warning => "WARNING",
        ResultStatus::Cancelled => "CANCELLED",
        ResultStatus::Incompleted => "INCOMPLETED",
    }
}

/// Severity inferred purely from status, used both as the fallback when
/// an LLM extraction omits `severity` and for bare error_message issues
/// that have no sub-test status of their own.
fn severity_from_status(status: ResultStatus) -> &'static str {
    match status {
        ResultStatus::Warning => "low",
        ResultStatus::Failed => "high",
        _ => "medium",
    }
}

/// Keyword scan over `final_summary`: high on error/crash
/// language, low on warning/suggestion language, medium otherwise.
fn heuristic(sub: &SubTestResult) -> (&'static str, Vec<String>, usize) {
    let lower = sub.final_summary.to_lowercase();
    let severity = if HIGH_KEYWORDS.iter().any(|kw| lower.contains(kw) || sub.final_summary.contains(kw)) {
        "high"
    } else if LOW_KEYWORDS.iter().any(|kw| lower.contains(kw) || sub.final_summary.contains(kw)) {
        "low"
    } else {
        severity_from_status(sub.status)
    };
    (severity, vec![sub.final_summary.clone()], 1)
}

async fn extract_via_llm(llm: &dyn LlmClient, sub: &SubTestResult) -> Option<(&'static str, Vec<String>, usize)> {
    let compact = json!({
        "name": sub.name,
        "status": status_label(sub.status),
        "report": sub.report,
        "metrics": sub.metrics,
        "final_summary": sub.final_summary,
    });
    let response = llm
        .get_response(
            ISSUE_EXTRACTION_SYSTEM_PROMPT,
            &compact.to_string(),
            None,
            VERIFICATION_TEMPERATURE,
        )
        .await
        .ok()?;
    let parsed: Value = serde_json::from_str(&response).ok()?;
    let issues: Vec<String> = parsed
        .get("issues")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .filter(|v: &Vec<String>| !v.is_empty())?;
    let issue_count = parsed
        .get("issue_count")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(issues.len());
    let severity = match parsed.get("severity").and_then(Value::as_str) {
        Some("high") => "high",
        Some("low") => "low",
        Some("medium") => "medium",
        _ => severity_from_status(sub.status),
    };
    Some((severity, issues, issue_count))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use soulbrowser_core_types::TestId;
    use webqa_llm::test_support::ScriptedClient;
    use webqa_session::{BrowserConfig, LlmConfig, ResultCategory, TestConfiguration, TestResult, TestType};

    use super::*;

    fn sub(name: &str, status: ResultStatus, summary: &str) -> SubTestResult {
        SubTestResult {
            name: name.to_string(),
            status,
            steps: vec![],
            report: vec![],
            messages: HashMap::new(),
            final_summary: summary.to_string(),
            metrics: HashMap::new(),
        }
    }

    fn session_with(sub_tests: Vec<SubTestResult>, error_message: Option<String>) -> TestSession {
        let config = TestConfiguration {
            test_id: TestId("t1".to_string()),
            test_type: TestType::UxTest,
            test_name: "t1".to_string(),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: HashMap::new(),
            timeout_secs: 300,
            retry_count: 0,
            dependencies: vec![],
        };
        let llm_config = LlmConfig {
            api: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
            base_url: "https://example.invalid".to_string(),
            temperature: None,
            top_p: None,
        };
        let mut session = TestSession::new("s1", "https://example.test", llm_config, vec![config]);
        let now = Utc::now();
        session
            .update_test_result(TestResult {
                test_id: TestId("t1".to_string()),
                test_type: TestType::UxTest,
                test_name: "t1".to_string(),
                category: ResultCategory::Ui,
                status: TestResult::derive_status_from_sub_tests(&sub_tests),
                start_time: now,
                end_time: now,
                duration_ms: 0,
                error_message,
                metrics: HashMap::new(),
                sub_tests,
            })
            .unwrap();
        session
    }

    #[tokio::test]
    async fn counts_total_passed_and_failed_subtests() {
        let session = session_with(
            vec![
                sub("a", ResultStatus::Passed, "ok"),
                sub("b", ResultStatus::Failed, "crashed with error"),
            ],
            None,
        );
        let aggregated = aggregate_results(&session, None).await;
        assert_eq!(aggregated["摘要与建议"]["total_subtests"], 2);
        assert_eq!(aggregated["摘要与建议"]["passed_subtests"], 1);
        assert_eq!(aggregated["摘要与建议"]["failed_subtests"], 1);
        let issues = aggregated["问题列表"].as_array().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0]["severity"], "high");
    }

    #[tokio::test]
    async fn heuristic_marks_warning_keywords_as_low_severity() {
        let session = session_with(vec![sub("a", ResultStatus::Warning, "minor warning, suggest optimization")], None);
        let aggregated = aggregate_results(&session, None).await;
        let issues = aggregated["问题列表"].as_array().unwrap();
        assert_eq!(issues[0]["severity"], "low");
    }

    #[tokio::test]
    async fn llm_extraction_is_preferred_over_heuristic_when_available() {
        let llm = ScriptedClient::new(vec![Ok(json!({
            "issue_count": 2,
            "issues": ["button unresponsive", "layout overlaps on mobile"],
            "severity": "medium",
        })
        .to_string())]);
        let session = session_with(vec![sub("a", ResultStatus::Failed, "something failed")], None);
        let aggregated = aggregate_results(&session, Some(&llm)).await;
        let issues = aggregated["问题列表"].as_array().unwrap();
        assert_eq!(issues[0]["severity"], "medium");
        assert_eq!(issues[0]["issue_count"], 2);
    }

    #[tokio::test]
    async fn bare_error_message_without_sub_tests_becomes_an_issue() {
        let session = session_with(vec![], Some("unhandled exception".to_string()));
        let aggregated = aggregate_results(&session, None).await;
        let issues = aggregated["问题列表"].as_array().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0]["issues"][0], "unhandled exception");
    }
}
