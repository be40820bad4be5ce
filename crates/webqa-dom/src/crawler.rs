//! The DOM Crawler capability contract. The crawl's page-side
//! evaluate is itself an out-of-scope browser capability; this trait
//! is the narrow, mockable seam webqa-browser's adapter implements it
//! behind.

use async_trait::async_trait;

use crate::element::ElementBuffer;
use crate::errors::CrawlerError;
use crate::tree::DomTree;

/// Result of one `crawl` call: the intermediate tree plus its flattened
/// element view, handed to both the LLM (as `get_text`) and the Action
/// Handler (as the `ElementBuffer`).
pub struct CrawlOutcome {
    pub tree: DomTree,
    pub elements: ElementBuffer,
}

#[async_trait]
pub trait DomCrawler: Send + Sync {
    /// Executes a page-side evaluation that walks the DOM, computes
    /// interactivity/visibility, assigns short external ids to interactive
    /// elements, optionally injects highlight overlays, and returns both a
    /// tree and the flat element buffer. IDs are deterministic within one
    /// crawl (traversal order) and are NOT stable across crawls.
    async fn crawl(
        &self,
        highlight: bool,
        highlight_text: bool,
        viewport_only: bool,
    ) -> Result<CrawlOutcome, CrawlerError>;

    /// Text summary of the most recently crawled tree, suitable as LLM
    /// context.
    fn get_text(&self, outcome: &CrawlOutcome) -> String;

    /// Cleans up any highlight overlays injected by the last `crawl` call.
    async fn remove_marker(&self) -> Result<(), CrawlerError>;
}

/// Default `get_text` rendering, shared by any `DomCrawler` implementor:
/// one line per element with text content, in pre-order.
pub fn render_text_summary(outcome: &CrawlOutcome) -> String {
    let mut lines = Vec::new();
    for idx in outcome.tree.pre_iter() {
        let node = &outcome.tree.nodes[idx];
        if node.inner_text.is_empty() && node.tag.as_deref() != Some("input") {
            continue;
        }
        let tag = node.tag.as_deref().unwrap_or("?");
        let marker = node
            .highlight_index
            .map(|h| format!("[{h}] "))
            .unwrap_or_default();
        lines.push(format!("{marker}<{tag}> {}", node.inner_text));
    }
    lines.join("\n")
}
