//! Submission queue: a FIFO front-end
//! boundary in front of the Parallel Executor. One background worker
//! drains it so only one orchestration run executes at a time; status
//! lookups are lock-free via `DashMap`.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};
use webqa_browser::BrowserLauncher;
use webqa_runners::RunnerRegistry;
use webqa_session::{LlmConfig, TestConfiguration, TestSession};

use crate::metrics;

/// One submitted orchestration run, queued until the worker picks it up.
/// Mirrors the declarative input config shape plus the queue's own `user_info`.
#[derive(Clone, Debug, Deserialize)]
pub struct RunRequest {
    pub target_url: String,
    pub llm_config: LlmConfig,
    #[serde(default)]
    pub test_configurations: Vec<TestConfiguration>,
    #[serde(default = "default_max_concurrent_tests")]
    pub max_concurrent_tests: usize,
    #[serde(default)]
    pub user_info: Value,
}

fn default_max_concurrent_tests() -> usize {
    3
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Queued,
    Running,
    Completed,
    Failed,
    NotFound,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskStatus {
    pub status: TaskState,
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl TaskStatus {
    fn not_found() -> Self {
        Self {
            status: TaskState::NotFound,
            queued_at: None,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }
}

struct TaskRecord {
    status: TaskStatus,
    request: Option<RunRequest>,
}

/// The queue contract: `add_task`/`get_next_task`/`complete_task`/
/// `get_task_status`. `queue` holds ordering; `records` holds status and
/// is safe to read concurrently with the worker mutating `queue`.
pub struct SubmissionQueue {
    queue: Mutex<VecDeque<String>>,
    records: DashMap<String, TaskRecord>,
    notify: Notify,
}

impl Default for SubmissionQueue {
    fn default() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            records: DashMap::new(),
            notify: Notify::new(),
        }
    }
}

impl SubmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `task_id`, returning its 1-based position (the task
    /// currently executing, if any, is position 0 and is not counted
    /// here since it has already left the queue).
    pub async fn add_task(&self, task_id: impl Into<String>, request: RunRequest) -> usize {
        let task_id = task_id.into();
        self.records.insert(
            task_id.clone(),
            TaskRecord {
                status: TaskStatus {
                    status: TaskState::Queued,
                    queued_at: Some(Utc::now()),
                    started_at: None,
                    completed_at: None,
                    result: None,
                    error: None,
                },
                request: Some(request),
            },
        );
        let mut queue = self.queue.lock().await;
        queue.push_back(task_id);
        let position = queue.len();
        metrics::TASKS_SUBMITTED_TOTAL.inc();
        self.notify.notify_one();
        position
    }

    /// Pops the next queued task and transitions it to `running`,
    /// recording `started_at`. Returns `None` if the queue is empty.
    pub async fn get_next_task(&self) -> Option<(String, RunRequest)> {
        let task_id = {
            let mut queue = self.queue.lock().await;
            queue.pop_front()?
        };
        let request = self.records.get_mut(&task_id).and_then(|mut record| {
            record.status.status = TaskState::Running;
            record.status.started_at = Some(Utc::now());
            record.request.take()
        })?;
        Some((task_id, request))
    }

    /// Waits until a task is enqueued, then pops it. Used by the
    /// background worker loop so it doesn't busy-poll.
    pub async fn next_task(&self) -> (String, RunRequest) {
        loop {
            if let Some(task) = self.get_next_task().await {
                return task;
            }
            self.notify.notified().await;
        }
    }

    /// `complete_task`: sets `completed` if `result` is `Some`,
    /// else `failed`, and records `completed_at`.
    pub fn complete_task(&self, task_id: &str, result: Option<Value>, error: Option<String>) {
        if let Some(mut record) = self.records.get_mut(task_id) {
            record.status.completed_at = Some(Utc::now());
            if let Some(result) = result {
                record.status.status = TaskState::Completed;
                record.status.result = Some(result);
            } else {
                record.status.status = TaskState::Failed;
                record.status.error = error;
            }
        } else {
            warn!(task_id, "complete_task called for an unknown task id");
        }
    }

    pub fn get_task_status(&self, task_id: &str) -> TaskStatus {
        self.records
            .get(task_id)
            .map(|r| r.status.clone())
            .unwrap_or_else(TaskStatus::not_found)
    }
}

/// Drains `queue` forever, running each task to completion through the
/// Parallel Executor before picking up the next one.
pub async fn run_worker(queue: Arc<SubmissionQueue>, launcher: Arc<dyn BrowserLauncher>, registry: Arc<RunnerRegistry>) {
    loop {
        let (task_id, request) = queue.next_task().await;
        info!(task_id, "starting queued orchestration run");
        let executor = webqa_scheduler::ParallelExecutor::new(
            launcher.clone(),
            registry.clone(),
            request.max_concurrent_tests,
        );
        let mut session = TestSession::new(
            task_id.clone(),
            request.target_url.clone(),
            request.llm_config.clone(),
            request.test_configurations.clone(),
        );
        match executor.execute_parallel_tests(&mut session).await {
            Ok(report) => {
                queue.complete_task(&task_id, Some(report.results), None);
                info!(task_id, path = %report.json_report_path.display(), "orchestration run completed");
            }
            Err(e) => {
                queue.complete_task(&task_id, None, Some(e.to_string()));
                warn!(task_id, error = %e, "orchestration run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use webqa_runners::RunnerRegistry;

    use super::*;
    use crate::launcher::default_launcher;

    fn request() -> RunRequest {
        RunRequest {
            target_url: "https://example.test".to_string(),
            llm_config: LlmConfig {
                api: "openai".to_string(),
                model: "gpt-4o".to_string(),
                api_key: "sk-test".to_string(),
                base_url: String::new(),
                temperature: None,
                top_p: None,
            },
            test_configurations: vec![],
            max_concurrent_tests: 2,
            user_info: Value::Null,
        }
    }

    #[tokio::test]
    async fn unknown_task_status_is_not_found() {
        let queue = SubmissionQueue::new();
        assert_eq!(queue.get_task_status("missing").status, TaskState::NotFound);
    }

    #[tokio::test]
    async fn add_then_get_next_transitions_queued_to_running() {
        let queue = SubmissionQueue::new();
        let position = queue.add_task("t1", request()).await;
        assert_eq!(position, 1);
        assert_eq!(queue.get_task_status("t1").status, TaskState::Queued);

        let (task_id, _) = queue.get_next_task().await.unwrap();
        assert_eq!(task_id, "t1");
        assert_eq!(queue.get_task_status("t1").status, TaskState::Running);
    }

    #[tokio::test]
    async fn complete_task_without_result_marks_failed() {
        let queue = SubmissionQueue::new();
        queue.add_task("t1", request()).await;
        queue.get_next_task().await.unwrap();
        queue.complete_task("t1", None, Some("boom".to_string()));
        let status = queue.get_task_status("t1");
        assert_eq!(status.status, TaskState::Failed);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn worker_drains_a_disabled_only_run_end_to_end() {
        let queue = Arc::new(SubmissionQueue::new());
        queue.add_task("t1", request()).await;

        let worker = tokio::spawn(run_worker(
            queue.clone(),
            default_launcher(),
            Arc::new(RunnerRegistry::standard()),
        ));

        for _ in 0..100 {
            if queue.get_task_status("t1").status == TaskState::Completed {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        worker.abort();
        assert_eq!(queue.get_task_status("t1").status, TaskState::Completed);
    }
}
