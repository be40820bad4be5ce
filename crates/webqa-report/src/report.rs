//! Persisted artifacts: `test_results.json`,
//! `test_report.html`, and the combined `aggregate_and_report` entry
//! point the Parallel Executor's finalize step calls.

use std::path::{Path, PathBuf};

use chrono::Utc;
use webqa_llm::LlmClient;
use webqa_session::TestSession;

use crate::aggregator::aggregate_results;
use crate::errors::ReportError;

/// The three known tag shapes substituted into the HTML template.
/// Each is replaced exactly once.
const STYLE_TAG: &str = r#"<link rel="stylesheet" href="/assets/style.css">"#;
const DATA_SCRIPT_TAG: &str = r#"<script src="/data.js"></script>"#;
const MODULE_SCRIPT_TAG: &str = r#"<script type="module" crossorigin src="/assets/index.js"></script>"#;

/// Inlines `css` and `js` and replaces `window.testResultData` at
/// the three fixed template sites.
fn inline_report_html(template: &str, css: &str, js: &str, data_json: &str) -> String {
    let with_style = template.replacen(STYLE_TAG, &format!("<style>{css}</style>"), 1);
    let with_data = with_style.replacen(
        DATA_SCRIPT_TAG,
        &format!("<script>window.testResultData = {data_json};</script>"),
        1,
    );
    with_data.replacen(MODULE_SCRIPT_TAG, &format!(r#"<script type="module">{js}</script>"#), 1)
}

/// Resolves the run's report directory: `report_dir` if supplied,
/// otherwise `./reports/test_<WEBQA_TIMESTAMP>/` with the timestamp
/// taken from the environment, or computed now as a last resort.
pub fn resolve_report_dir(report_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = report_dir {
        return dir.to_path_buf();
    }
    let timestamp = std::env::var("WEBQA_TIMESTAMP")
        .unwrap_or_else(|_| Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string());
    PathBuf::from("./reports").join(format!("test_{timestamp}"))
}

/// `generate_json_report`: serializes the whole session,
/// `default=str`-equivalent for non-JSON scalars is satisfied by serde's
/// derived `Serialize` on every entity in webqa-session.
pub async fn generate_json_report(session: &TestSession, report_dir: &Path) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(report_dir)
        .await
        .map_err(|e| ReportError::CreateDir(report_dir.display().to_string(), e))?;
    let path = report_dir.join("test_results.json");
    let json = serde_json::to_string_pretty(session)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| ReportError::Write(path.display().to_string(), e))?;
    Ok(path)
}

/// `generate_html_report_fully_inlined`: reads the template
/// plus its CSS/JS bundles and inlines them alongside a
/// `window.testResultData` blob built from `aggregated`. The template,
/// CSS and JS assets themselves are the out-of-scope "HTML report
/// renderer"; only the inlining logic lives here, so a caller that
/// has no template assets gets a minimal generated one.
pub async fn generate_html_report_fully_inlined(
    session: &TestSession,
    aggregated: &serde_json::Value,
    report_dir: &Path,
    template: Option<&str>,
    css: Option<&str>,
    js: Option<&str>,
) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(report_dir)
        .await
        .map_err(|e| ReportError::CreateDir(report_dir.display().to_string(), e))?;

    let data = serde_json::json!({
        "session_id": session.session_id,
        "target_url": session.target_url,
        "aggregated": aggregated,
    });
    let data_json = data.to_string();

    let template = template.unwrap_or(DEFAULT_TEMPLATE);
    let html = inline_report_html(template, css.unwrap_or(""), js.unwrap_or(""), &data_json);

    let path = report_dir.join("test_report.html");
    tokio::fs::write(&path, html)
        .await
        .map_err(|e| ReportError::Write(path.display().to_string(), e))?;
    Ok(path)
}

/// A fallback shell used when no template asset is supplied; keeps the
/// three replacement tags so the inlining logic always has something
/// real to substitute against.
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>WebQA Report</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<div id="root"></div>
<script src="/data.js"></script>
<script type="module" crossorigin src="/assets/index.js"></script>
</body>
</html>
"#;

/// Always a 3-field struct; callers should never need to distinguish
/// a 2-tuple shape from a 3-tuple one.
pub struct AggregateAndReport {
    pub results: serde_json::Value,
    pub json_report_path: PathBuf,
    pub html_report_path: PathBuf,
}

/// The single entry point the Parallel Executor's finalize step calls:
/// aggregate, then write both artifacts. Never fails the caller's
/// session: an I/O error here is surfaced to the caller but does not
/// itself mark the session failed — that is the scheduler's decision
/// to make.
pub async fn aggregate_and_report(
    session: &mut TestSession,
    llm: Option<&dyn LlmClient>,
    report_dir: Option<&Path>,
) -> Result<AggregateAndReport, ReportError> {
    let aggregated = aggregate_results(session, llm).await;
    session.aggregated_results = Some(aggregated.clone());

    let dir = resolve_report_dir(report_dir);
    let json_path = generate_json_report(session, &dir).await?;
    let html_path = generate_html_report_fully_inlined(session, &aggregated, &dir, None, None, None).await?;

    session.report_paths.json_report = Some(json_path.display().to_string());
    session.report_paths.html_report = Some(html_path.display().to_string());

    Ok(AggregateAndReport {
        results: aggregated,
        json_report_path: json_path,
        html_report_path: html_path,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use soulbrowser_core_types::TestId;
    use webqa_session::{BrowserConfig, LlmConfig, TestConfiguration, TestType};

    use super::*;

    fn session() -> TestSession {
        let config = TestConfiguration {
            test_id: TestId("t1".to_string()),
            test_type: TestType::UxTest,
            test_name: "t1".to_string(),
            enabled: false,
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
        TestSession::new("s1", "https://example.test", llm_config, vec![config])
    }

    #[tokio::test]
    async fn writes_json_and_html_reports_for_a_disabled_only_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut sess = session();
        let report = aggregate_and_report(&mut sess, None, Some(dir.path())).await.unwrap();
        assert!(report.json_report_path.exists());
        assert!(report.html_report_path.exists());
        assert_eq!(report.results["摘要与建议"]["total_subtests"], 0);
        assert!(sess.report_paths.json_report.is_some());
        assert!(sess.report_paths.html_report.is_some());
    }

    #[test]
    fn inlining_replaces_all_three_tags_exactly_once() {
        let out = inline_report_html(DEFAULT_TEMPLATE, "body{}", "console.log(1)", "{}");
        assert!(!out.contains(STYLE_TAG));
        assert!(!out.contains(DATA_SCRIPT_TAG));
        assert!(!out.contains(MODULE_SCRIPT_TAG));
        assert!(out.contains("<style>body{}</style>"));
        assert!(out.contains("window.testResultData = {};"));
        assert!(out.contains(r#"<script type="module">console.log(1)</script>"#));
    }

    #[test]
    fn report_dir_prefers_explicit_argument_over_environment() {
        let dir = resolve_report_dir(Some(Path::new("/tmp/explicit")));
        assert_eq!(dir, PathBuf::from("/tmp/explicit"));
    }
}
