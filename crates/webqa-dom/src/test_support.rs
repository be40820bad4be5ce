//! A fixed-tree `DomCrawler` used by downstream crates' own test suites,
//! analogous to `webqa_browser::test_support::MockCapability`.

use async_trait::async_trait;
use serde_json::Value;

use crate::crawler::{render_text_summary, CrawlOutcome, DomCrawler};
use crate::element::ElementBuffer;
use crate::errors::CrawlerError;
use crate::tree::DomTree;

pub struct MockCrawler {
    payload: Value,
}

impl MockCrawler {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl DomCrawler for MockCrawler {
    async fn crawl(
        &self,
        _highlight: bool,
        _highlight_text: bool,
        _viewport_only: bool,
    ) -> Result<CrawlOutcome, CrawlerError> {
        let tree = DomTree::build_root(&self.payload)?;
        let elements = ElementBuffer::from_tree(&tree);
        Ok(CrawlOutcome { tree, elements })
    }

    fn get_text(&self, outcome: &CrawlOutcome) -> String {
        render_text_summary(outcome)
    }

    async fn remove_marker(&self) -> Result<(), CrawlerError> {
        Ok(())
    }
}
