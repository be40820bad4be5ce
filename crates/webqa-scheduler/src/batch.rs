//! Dependency-ordered batch planning.
//!
//! Independent tests (`dependencies == []`) are split into chunks of
//! `max_concurrent_tests` first; dependent tests are chunked the same
//! way and run strictly afterward, in submission order. The spec treats
//! unresolvable/cyclic dependency graphs as out of scope so this
//! does no topological sort beyond the independent/dependent split.

use webqa_session::TestConfiguration;

/// Splits `configs` (already in submission order) into independent-first,
/// then dependent, batches of at most `max_concurrent` tests each.
pub fn plan_batches<'a>(
    configs: &[&'a TestConfiguration],
    max_concurrent: usize,
) -> Vec<Vec<&'a TestConfiguration>> {
    let chunk_size = max_concurrent.max(1);
    let (independent, dependent): (Vec<_>, Vec<_>) =
        configs.iter().copied().partition(|c| c.is_leaf());

    let mut batches = Vec::new();
    for chunk in independent.chunks(chunk_size) {
        batches.push(chunk.to_vec());
    }
    for chunk in dependent.chunks(chunk_size) {
        batches.push(chunk.to_vec());
    }
    batches
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use soulbrowser_core_types::TestId;
    use webqa_session::{BrowserConfig, TestType};

    use super::*;

    fn config(id: &str, deps: Vec<&str>) -> TestConfiguration {
        TestConfiguration {
            test_id: TestId(id.to_string()),
            test_type: TestType::UxTest,
            test_name: id.to_string(),
            enabled: true,
            browser_config: BrowserConfig::default(),
            test_specific_config: HashMap::new(),
            timeout_secs: 300,
            retry_count: 0,
            dependencies: deps.into_iter().map(|d| TestId(d.to_string())).collect(),
        }
    }

    #[test]
    fn independent_tests_chunk_before_dependent_ones() {
        let a = config("a", vec![]);
        let b = config("b", vec![]);
        let c = config("c", vec!["a"]);
        let refs: Vec<&TestConfiguration> = vec![&a, &b, &c];
        let batches = plan_batches(&refs, 2);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert!(batches[0].iter().all(|cfg| cfg.is_leaf()));
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1][0].test_id.0, "c");
    }

    #[test]
    fn batch_size_is_capped_at_max_concurrent() {
        let configs: Vec<TestConfiguration> = (0..5).map(|i| config(&i.to_string(), vec![])).collect();
        let refs: Vec<&TestConfiguration> = configs.iter().collect();
        let batches = plan_batches(&refs, 2);
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() <= 2));
    }

    #[test]
    fn zero_max_concurrent_is_treated_as_one() {
        let a = config("a", vec![]);
        let refs: Vec<&TestConfiguration> = vec![&a];
        let batches = plan_batches(&refs, 0);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
    }
}
