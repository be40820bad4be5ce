use std::sync::Arc;

use async_trait::async_trait;
use webqa_browser::BrowserSession;
use webqa_session::{LlmConfig, TestConfiguration, TestResult};

/// One test kind's adapter: given a (possibly absent, for
/// SECURITY_TEST) browser session plus the test's declared configuration,
/// produce a `TestResult`. Implementations never panic; failures surface
/// as `ResultStatus::Failed` with `error_message` set.
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run_test(
        &self,
        session: Option<Arc<BrowserSession>>,
        test_config: &TestConfiguration,
        llm_config: &LlmConfig,
        target_url: &str,
    ) -> TestResult;
}
