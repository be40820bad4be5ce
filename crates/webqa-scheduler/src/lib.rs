//! Parallel Executor: batches tests, bounds
//! concurrency across bounded browser resources, tracks running tests,
//! and guarantees cleanup on every termination path.

mod batch;
mod errors;
mod executor;

pub use batch::plan_batches;
pub use errors::SchedulerError;
pub use executor::{ParallelExecutor, SECURITY_TEST_NO_SESSION_ID};

/// Builds the `webqa-llm` client config used for the aggregator's
/// LLM-assisted issue extraction, from the session's declarative
/// `LlmConfig`. A failure to construct a client here is not fatal — the
/// aggregator degrades to its keyword heuristic.
pub(crate) fn llm_config_for_aggregation(llm_config: &webqa_session::LlmConfig) -> webqa_llm::LlmClientConfig {
    webqa_llm::LlmClientConfig {
        api: llm_config.api.clone(),
        model: llm_config.model.clone(),
        api_key: llm_config.api_key.clone(),
        base_url: if llm_config.base_url.is_empty() {
            None
        } else {
            Some(llm_config.base_url.clone())
        },
        timeout_secs: 60,
    }
}
