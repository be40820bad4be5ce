//! SecurityTestRunner: a thin wrapper around an external
//! scanner (e.g. Nuclei), out of scope. SECURITY_TEST never gets a
//! real BrowserSession, so
//! this runner ignores `session` entirely and always completes as
//! INCOMPLETED — actual tool invocation is left to the external-tool
//! boundary.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use webqa_browser::BrowserSession;
use webqa_session::{LlmConfig, TestConfiguration, TestResult};

use crate::common::incompleted;
use crate::runner::TestRunner;

pub struct SecurityTestRunner;

#[async_trait]
impl TestRunner for SecurityTestRunner {
    async fn run_test(
        &self,
        _session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        _llm_config: &LlmConfig,
        target_url: &str,
    ) -> TestResult {
        let start_time = Utc::now();
        incompleted(
            test_config,
            start_time,
            format!("security scan invocation for {target_url} is an out-of-scope external tool"),
        )
    }
}
