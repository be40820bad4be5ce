//! Metrics: `prometheus` counters/gauges for
//! active browser sessions, batches in flight, LLM call latency, and
//! replan count distribution, registered once via `lazy_static` — the
//! same pattern this codebase's own `metrics.rs` uses.

use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ACTIVE_BROWSER_SESSIONS: Gauge = Gauge::new(
        "webqa_active_browser_sessions",
        "Number of browser sessions currently open"
    )
    .expect("create active_browser_sessions gauge");
    pub static ref BATCHES_IN_FLIGHT: Gauge = Gauge::new(
        "webqa_batches_in_flight",
        "Number of test batches currently executing"
    )
    .expect("create batches_in_flight gauge");
    pub static ref LLM_CALL_LATENCY_MS: Histogram = Histogram::with_opts(HistogramOpts::new(
        "webqa_llm_call_latency_ms",
        "LLM chat-completion call latency in milliseconds"
    ))
    .expect("create llm_call_latency_ms histogram");
    pub static ref REPLAN_COUNT: Histogram = Histogram::with_opts(
        HistogramOpts::new("webqa_replan_count", "Replans taken per agent case run")
            .buckets(vec![0.0, 1.0, 2.0, 3.0])
    )
    .expect("create replan_count histogram");
    pub static ref TASKS_SUBMITTED_TOTAL: IntCounter = IntCounter::new(
        "webqa_tasks_submitted_total",
        "Total orchestration runs submitted to the queue"
    )
    .expect("create tasks_submitted_total counter");
}

/// Registers every metric above exactly once. Safe to call repeatedly;
/// a duplicate registration is swallowed, matching how this codebase's
/// own `register_metrics` tolerates being called from multiple entry
/// points (CLI run, serve startup).
pub fn register() {
    for metric in [
        Box::new(ACTIVE_BROWSER_SESSIONS.clone()) as Box<dyn prometheus::core::Collector>,
        Box::new(BATCHES_IN_FLIGHT.clone()),
        Box::new(LLM_CALL_LATENCY_MS.clone()),
        Box::new(REPLAN_COUNT.clone()),
        Box::new(TASKS_SUBMITTED_TOTAL.clone()),
    ] {
        let _ = REGISTRY.register(metric);
    }
}

/// Renders the registry in Prometheus text exposition format, used by
/// both the `/metrics` axum route and CLI-only diagnostics.
pub fn encode() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_twice_does_not_panic() {
        register();
        register();
        let text = encode().unwrap();
        assert!(text.contains("webqa_tasks_submitted_total"));
    }
}
