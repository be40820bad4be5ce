//! ButtonTestRunner: crawls clickable elements,
//! clicks each in turn, re-navigating to the starting URL between
//! clicks, and tallies click failures into a single sub-test.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use webqa_actions::ActionHandler;
use webqa_browser::BrowserSession;
use webqa_dom::{BrowserDomCrawler, DomCrawler};
use webqa_session::{
    ActionOutcome, LlmConfig, ReportEntry, ResultStatus, Screenshot, SubTestResult, SubTestStep, TestConfiguration,
    TestResult,
};

use crate::common::{finish, RunnerError};
use crate::runner::TestRunner;

pub struct ButtonTestRunner;

#[async_trait]
impl TestRunner for ButtonTestRunner {
    async fn run_test(
        &self,
        session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        _llm_config: &LlmConfig,
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

        let crawler = BrowserDomCrawler::new(session.clone());
        let cookies = test_config.cookies().cloned();

        let outcome = match crawler.crawl(false, false, false).await {
            Ok(o) => o,
            Err(e) => return finish(test_config, start_time, vec![], Some(e.to_string())),
        };

        let mut handler = ActionHandler::new(session.clone());
        handler.set_element_buffer(outcome.elements.clone());

        let mut ids: Vec<String> = outcome.elements.iter().map(|(id, _)| id.clone()).collect();
        ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));

        let mut steps = Vec::with_capacity(ids.len());
        let mut failed = 0usize;

        for id in &ids {
            let step_start = Utc::now();
            let before = handler.b64_page_screenshot(false).await.ok();
            let clicked = handler.click(id).await;
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            let after = handler.b64_page_screenshot(false).await.ok();

            if !clicked {
                failed += 1;
            }
            let mut screenshots = Vec::new();
            if let Some(b) = before {
                screenshots.push(Screenshot::base64(b));
            }
            if let Some(a) = after {
                screenshots.push(Screenshot::base64(a));
            }
            steps.push(SubTestStep {
                id: 0,
                description: format!("click element {id}"),
                actions: vec![ActionOutcome {
                    success: clicked,
                    message: if clicked {
                        "click succeeded".to_string()
                    } else {
                        "click failed".to_string()
                    },
                }],
                screenshots,
                model_io: None,
                status: if clicked { ResultStatus::Passed } else { ResultStatus::Failed },
                start_time: step_start,
                end_time: Utc::now(),
                error: None,
            });

            if session.navigate(target_url, cookies.as_ref()).await.is_err() {
                tracing::warn!(target_url, "failed to re-navigate to starting URL between clicks");
            }
        }
        for (ordinal, step) in steps.iter_mut().enumerate() {
            step.id = ordinal as u32 + 1;
        }

        let status = if failed == 0 {
            ResultStatus::Passed
        } else if failed == ids.len() && !ids.is_empty() {
            ResultStatus::Failed
        } else {
            ResultStatus::Warning
        };

        let sub_test = SubTestResult {
            name: "遍历测试".to_string(),
            status,
            steps,
            report: vec![ReportEntry {
                title: "遍历测试结果".to_string(),
                issues: vec![format!("可点击元素{}个，点击行为失败{}个", ids.len(), failed)],
            }],
            messages: Default::default(),
            final_summary: format!("{} clickable elements, {} click failures", ids.len(), failed),
            metrics: Default::default(),
        };

        finish(test_config, start_time, vec![sub_test], None)
    }
}
