//! Parallel Executor: batches tests, bounds
//! concurrency per batch, tracks running tasks, handles cancellation,
//! and always finalizes the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tracing::{info, warn};
use webqa_browser::{BrowserLauncher, SessionManager};
use webqa_llm::OpenAiClient;
use webqa_report::AggregateAndReport;
use webqa_runners::RunnerRegistry;
use webqa_session::{
    LlmConfig, ResultCategory, ResultStatus, TestConfiguration, TestResult, TestSession, TestType,
};

use crate::batch::plan_batches;
use crate::errors::SchedulerError;

/// Sentinel session id for SECURITY_TEST, which runs without a
/// BrowserSession.
pub const SECURITY_TEST_NO_SESSION_ID: &str = "security_test_no_session";

/// Batches tests, bounds concurrency, tracks running/completed, handles
/// cancellation. One instance orchestrates exactly one
/// `TestSession` run; `running` tracks in-flight tasks by `test_id` so
/// `cancel_test`/`cancel_all_tests` can reach them from another task.
pub struct ParallelExecutor {
    session_manager: Arc<SessionManager>,
    launcher: Arc<dyn BrowserLauncher>,
    registry: Arc<RunnerRegistry>,
    max_concurrent_tests: usize,
    running: DashMap<String, AbortHandle>,
    cancelled: AtomicBool,
}

impl ParallelExecutor {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        registry: Arc<RunnerRegistry>,
        max_concurrent_tests: usize,
    ) -> Self {
        Self {
            session_manager: Arc::new(SessionManager::new()),
            launcher,
            registry,
            max_concurrent_tests: max_concurrent_tests.max(1),
            running: DashMap::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Runs every enabled test in `session` to completion, then
    /// always finalizes (closes sessions, aggregates, writes reports,
    /// seals the session) regardless of how execution ended.
    pub async fn execute_parallel_tests(
        &self,
        session: &mut TestSession,
    ) -> Result<AggregateAndReport, SchedulerError> {
        let configs: Vec<TestConfiguration> = session
            .configurations_in_order()
            .into_iter()
            .filter(|c| c.enabled)
            .cloned()
            .collect();
        let refs: Vec<&TestConfiguration> = configs.iter().collect();
        let batches = plan_batches(&refs, self.max_concurrent_tests);

        for batch in batches {
            if self.cancelled.load(Ordering::SeqCst) {
                for cfg in batch {
                    self.record(session, cancelled_result(cfg));
                }
                continue;
            }
            self.run_batch(session, batch).await;
        }

        self.finalize(session).await
    }

    async fn run_batch(&self, session: &mut TestSession, batch: Vec<&TestConfiguration>) {
        let semaphore = Arc::new(Semaphore::new(batch.len().min(self.max_concurrent_tests).max(1)));
        let target_url = session.target_url.clone();
        let llm_config = session.llm_config.clone();

        let mut handles = Vec::with_capacity(batch.len());
        for cfg in &batch {
            let cfg = (*cfg).clone();
            let test_id = cfg.test_id.0.clone();
            let permit_sema = semaphore.clone();
            let session_manager = self.session_manager.clone();
            let launcher = self.launcher.clone();
            let registry = self.registry.clone();
            let target_url = target_url.clone();
            let llm_config = llm_config.clone();

            let join = tokio::spawn(async move {
                let _permit = permit_sema
                    .acquire_owned()
                    .await
                    .expect("executor semaphore is never closed");
                run_one_test(&session_manager, launcher.as_ref(), &registry, &cfg, &llm_config, &target_url).await
            });
            self.running.insert(test_id.clone(), join.abort_handle());
            handles.push((test_id, cfg, join));
        }

        for (test_id, cfg, join) in handles {
            let result = match join.await {
                Ok(result) => result,
                Err(join_err) if join_err.is_cancelled() => {
                    self.cancelled.store(true, Ordering::SeqCst);
                    cancelled_result(&cfg)
                }
                Err(join_err) => failed_result(&cfg, Utc::now(), format!("test task panicked: {join_err}")),
            };
            self.running.remove(&test_id);
            self.record(session, result);
        }
    }

    fn record(&self, session: &mut TestSession, result: TestResult) {
        let test_id = result.test_id.clone();
        let cases_json_path = result
            .metrics
            .get("cases_json_path")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if let Some(ctx) = session.context_mut(&test_id) {
            if ctx.start_time.is_none() {
                ctx.start_execution(None);
            }
            if ctx.end_time.is_none() {
                ctx.complete_execution(
                    matches!(result.status, ResultStatus::Passed),
                    result.error_message.clone(),
                );
            }
        }
        if let Some(path) = cases_json_path {
            session.report_paths.cases_json = Some(path);
        }
        if let Err(e) = session.update_test_result(result) {
            warn!(error = %e, "dropping duplicate/unknown test result");
        }
    }

    /// Cancels one in-flight test. A no-op if it already finished.
    pub fn cancel_test(&self, test_id: &str) {
        if let Some((_, handle)) = self.running.remove(test_id) {
            handle.abort();
        }
    }

    /// Cancels every in-flight test and marks the run as cancelled, so
    /// any batch not yet started is short-circuited to CANCELLED results
    /// too.
    pub fn cancel_all_tests(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        for entry in self.running.iter() {
            entry.value().abort();
        }
        self.running.clear();
    }

    /// `_finalize_session`: always runs, on every termination
    /// path. Closes all browser sessions, aggregates results, writes
    /// JSON + HTML reports, seals the session if not already sealed.
    async fn finalize(&self, session: &mut TestSession) -> Result<AggregateAndReport, SchedulerError> {
        self.session_manager.close_all_sessions().await;

        let llm = OpenAiClient::new(crate::llm_config_for_aggregation(&session.llm_config)).ok();
        let report = webqa_report::aggregate_and_report(
            session,
            llm.as_ref().map(|c| c as &dyn webqa_llm::LlmClient),
            None,
        )
        .await?;

        if !session.is_complete() {
            session.complete_session().ok();
        }
        info!(session_id = %session.session_id, "finalized test session");
        Ok(report)
    }
}

async fn run_one_test(
    session_manager: &SessionManager,
    launcher: &dyn BrowserLauncher,
    registry: &RunnerRegistry,
    cfg: &TestConfiguration,
    llm_config: &LlmConfig,
    target_url: &str,
) -> TestResult {
    let start_time = Utc::now();

    if cfg.test_type == TestType::Security {
        return match registry.get(cfg.test_type) {
            Some(runner) => runner.run_test(None, cfg, llm_config, target_url).await,
            None => no_runner_result(cfg, start_time),
        };
    }

    let session = match session_manager
        .create_session(cfg.browser_config.clone(), launcher)
        .await
    {
        Ok(session) => session,
        Err(e) => return failed_result(cfg, start_time, format!("browser launch failed: {e}")),
    };

    let cookies = cfg.cookies().cloned();
    let result = match session.navigate(target_url, cookies.as_ref()).await {
        Err(e) => failed_result(cfg, start_time, format!("navigation failed: {e}")),
        Ok(()) => match registry.get(cfg.test_type) {
            Some(runner) => runner.run_test(Some(session.clone()), cfg, llm_config, target_url).await,
            None => no_runner_result(cfg, start_time),
        },
    };

    // Always close the browser session, matching the source's `finally`
    // block.
    session_manager.close_session(&session.session_id).await;
    result
}

fn failed_result(cfg: &TestConfiguration, start_time: chrono::DateTime<Utc>, message: String) -> TestResult {
    let end_time = Utc::now();
    TestResult {
        test_id: cfg.test_id.clone(),
        test_type: cfg.test_type,
        test_name: cfg.test_name.clone(),
        category: ResultCategory::from(cfg.test_type),
        status: ResultStatus::Failed,
        start_time,
        end_time,
        duration_ms: (end_time - start_time).num_milliseconds(),
        error_message: Some(message),
        metrics: Default::default(),
        sub_tests: vec![],
    }
}

fn no_runner_result(cfg: &TestConfiguration, start_time: chrono::DateTime<Utc>) -> TestResult {
    failed_result(cfg, start_time, format!("no runner registered for {:?}", cfg.test_type))
}

/// CANCELLED result for a test that never ran, or was aborted mid-run
///.
fn cancelled_result(cfg: &TestConfiguration) -> TestResult {
    let now = Utc::now();
    TestResult {
        test_id: cfg.test_id.clone(),
        test_type: cfg.test_type,
        test_name: cfg.test_name.clone(),
        category: ResultCategory::from(cfg.test_type),
        status: ResultStatus::Cancelled,
        start_time: now,
        end_time: now,
        duration_ms: 0,
        error_message: Some("test cancelled".to_string()),
        metrics: Default::default(),
        sub_tests: vec![],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use soulbrowser_core_types::TestId;
    use webqa_browser::test_support::MockLauncher;
    use webqa_browser::BrowserSession;
    use webqa_runners::TestRunner;
    use webqa_session::BrowserConfig;

    use super::*;

    /// A runner that sleeps long enough for a concurrent `cancel_all_tests`
    /// to land while the task is genuinely in flight, then reports PASSED
    /// unless the sleep was cut short by an abort.
    struct SlowRunner;

    #[async_trait]
    impl TestRunner for SlowRunner {
        async fn run_test(
            &self,
            _session: Option<Arc<BrowserSession>>,
            cfg: &TestConfiguration,
            _llm_config: &LlmConfig,
            _target_url: &str,
        ) -> TestResult {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            let now = Utc::now();
            TestResult {
                test_id: cfg.test_id.clone(),
                test_type: cfg.test_type,
                test_name: cfg.test_name.clone(),
                category: ResultCategory::from(cfg.test_type),
                status: ResultStatus::Passed,
                start_time: now,
                end_time: now,
                duration_ms: 0,
                error_message: None,
                metrics: Default::default(),
                sub_tests: vec![],
            }
        }
    }

    fn llm_config() -> LlmConfig {
        LlmConfig {
            api: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: "sk-test".to_string(),
            base_url: String::new(),
            temperature: None,
            top_p: None,
        }
    }

    fn ux_config(id: &str, deps: Vec<&str>) -> TestConfiguration {
        TestConfiguration {
            test_id: TestId(id.to_string()),
            test_type: TestType::UxTest,
            test_name: id.to_string(),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: HashMap::new(),
            timeout_secs: 60,
            retry_count: 0,
            dependencies: deps.into_iter().map(|d| TestId(d.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn disabled_only_session_produces_an_empty_report() {
        let mut cfg = ux_config("a", vec![]);
        cfg.enabled = false;
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), vec![cfg]);

        let executor = ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(RunnerRegistry::standard()), 2);
        let report = executor.execute_parallel_tests(&mut session).await.unwrap();

        assert_eq!(report.results["摘要与建议"]["total_subtests"], 0);
        assert!(session.is_complete());
        assert!(session.results.is_empty());
    }

    #[tokio::test]
    async fn runs_every_enabled_test_and_records_a_result_for_each() {
        let configs = vec![ux_config("a", vec![]), ux_config("b", vec![])];
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), configs);

        let executor = ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(RunnerRegistry::standard()), 2);
        executor.execute_parallel_tests(&mut session).await.unwrap();

        assert_eq!(session.results.len(), 2);
        assert!(session.check_result_ids_subset_of_configurations());
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn security_test_runs_without_a_browser_session() {
        let cfg = TestConfiguration {
            test_id: TestId("sec".to_string()),
            test_type: TestType::Security,
            test_name: "sec".to_string(),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: HashMap::new(),
            timeout_secs: 60,
            retry_count: 0,
            dependencies: vec![],
        };
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), vec![cfg]);
        let executor = ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(RunnerRegistry::standard()), 2);
        executor.execute_parallel_tests(&mut session).await.unwrap();

        let result = &session.results["sec"];
        assert_eq!(result.status, ResultStatus::Incompleted);
    }

    #[tokio::test]
    async fn cancel_all_tests_marks_every_test_cancelled() {
        let configs = vec![ux_config("a", vec![]), ux_config("b", vec![]), ux_config("c", vec![]), ux_config("d", vec![])];
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), configs);

        let executor = Arc::new(ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(RunnerRegistry::standard()), 2));
        executor.cancel_all_tests();
        executor.execute_parallel_tests(&mut session).await.unwrap();

        assert_eq!(session.results.len(), 4);
        assert!(session
            .results
            .values()
            .all(|r| r.status == ResultStatus::Cancelled));
    }

    #[tokio::test]
    async fn dependent_batch_runs_strictly_after_independent_batch() {
        let configs = vec![ux_config("a", vec![]), ux_config("b", vec!["a"])];
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), configs);
        let executor = ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(RunnerRegistry::standard()), 2);
        executor.execute_parallel_tests(&mut session).await.unwrap();

        let a = &session.results["a"];
        let b = &session.results["b"];
        assert!(a.end_time <= b.start_time || a.end_time == b.start_time);
    }

    #[tokio::test]
    async fn cancel_mid_batch_aborts_the_in_flight_tasks() {
        let configs = vec![ux_config("a", vec![]), ux_config("b", vec![]), ux_config("c", vec![]), ux_config("d", vec![])];
        let mut session = TestSession::new("s1", "https://example.test", llm_config(), configs);

        let mut registry = RunnerRegistry::new();
        registry.insert(TestType::UxTest, Arc::new(SlowRunner));

        let executor = Arc::new(ParallelExecutor::new(Arc::new(MockLauncher), Arc::new(registry), 4));

        let bg_executor = executor.clone();
        let mut session_for_run = session.clone();
        let handle = tokio::spawn(async move {
            bg_executor.execute_parallel_tests(&mut session_for_run).await.unwrap();
            session_for_run
        });

        // Give the batch time to spawn and start running before cancelling,
        // so the tasks are genuinely in flight (not just queued).
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        executor.cancel_all_tests();

        session = handle.await.unwrap();

        assert_eq!(session.results.len(), 4);
        assert!(session
            .results
            .values()
            .all(|r| r.status == ResultStatus::Cancelled));
    }
}
