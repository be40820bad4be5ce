//! LighthouseTestRunner: a thin wrapper around the external
//! `lighthouse` CLI, which is out of scope. Only the Chromium
//! prerequisite is checked in-process; invoking the tool itself is left
//! to the out-of-scope external-tool boundary, so this always completes
//! as INCOMPLETED once prerequisites are confirmed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use webqa_browser::BrowserSession;
use webqa_session::{LlmConfig, TestConfiguration, TestResult};

use crate::common::incompleted;
use crate::runner::TestRunner;

pub struct LighthouseTestRunner;

#[async_trait]
impl TestRunner for LighthouseTestRunner {
    async fn run_test(
        &self,
        _session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        _llm_config: &LlmConfig,
        _target_url: &str,
    ) -> TestResult {
        let start_time = Utc::now();
        let browser_type = test_config
            .test_specific_config
            .get("browser_type")
            .and_then(|v| v.as_str())
            .unwrap_or("chromium");

        if browser_type != "chromium" {
            return incompleted(
                test_config,
                start_time,
                format!("Lighthouse requires a Chromium browser session, got \"{browser_type}\""),
            );
        }
        incompleted(
            test_config,
            start_time,
            "Lighthouse invocation is an out-of-scope external tool; prerequisites were satisfied but no report was generated",
        )
    }
}
