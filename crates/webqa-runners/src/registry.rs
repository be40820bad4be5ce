//! Maps each `TestType` to its `TestRunner`: the lookup the
//! Parallel Executor uses to dispatch a batch.

use std::collections::HashMap;
use std::sync::Arc;

use webqa_session::TestType;

use crate::button_test::ButtonTestRunner;
use crate::lighthouse::LighthouseTestRunner;
use crate::runner::TestRunner;
use crate::security::SecurityTestRunner;
use crate::ui_agent_langgraph::UiAgentLangGraphRunner;
use crate::ux_test::UxTestRunner;
use crate::web_basic_check::WebBasicCheckRunner;

pub struct RunnerRegistry {
    runners: HashMap<TestType, Arc<dyn TestRunner>>,
}

impl RunnerRegistry {
    /// The standard registry: one runner per `TestType`. PERFORMANCE
    /// shares LighthouseTestRunner, matching the source's Lighthouse-backed
    /// performance test.
    pub fn standard() -> Self {
        let mut runners: HashMap<TestType, Arc<dyn TestRunner>> = HashMap::new();
        runners.insert(TestType::UiAgentLanggraph, Arc::new(UiAgentLangGraphRunner));
        runners.insert(TestType::UxTest, Arc::new(UxTestRunner));
        runners.insert(TestType::ButtonTest, Arc::new(ButtonTestRunner));
        runners.insert(TestType::WebBasicCheck, Arc::new(WebBasicCheckRunner));
        runners.insert(TestType::Performance, Arc::new(LighthouseTestRunner));
        runners.insert(TestType::Security, Arc::new(SecurityTestRunner));
        Self { runners }
    }

    /// An empty registry, for callers (e.g. tests) that assemble their own
    /// subset of runners via `insert`.
    pub fn new() -> Self {
        Self { runners: HashMap::new() }
    }

    /// Overrides (or adds) the runner for one `TestType`.
    pub fn insert(&mut self, test_type: TestType, runner: Arc<dyn TestRunner>) {
        self.runners.insert(test_type, runner);
    }

    pub fn get(&self, test_type: TestType) -> Option<Arc<dyn TestRunner>> {
        self.runners.get(&test_type).cloned()
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_test_type() {
        let registry = RunnerRegistry::standard();
        for test_type in [
            TestType::UiAgentLanggraph,
            TestType::UxTest,
            TestType::Performance,
            TestType::WebBasicCheck,
            TestType::ButtonTest,
            TestType::Security,
        ] {
            assert!(registry.get(test_type).is_some(), "missing runner for {test_type:?}");
        }
    }
}
