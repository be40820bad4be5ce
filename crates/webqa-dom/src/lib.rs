//! DOM crawl snapshot, element buffer and tree model.

mod browser_crawler;
mod crawler;
mod element;
mod errors;
mod tree;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use browser_crawler::BrowserDomCrawler;
pub use crawler::{render_text_summary, CrawlOutcome, DomCrawler};
pub use element::{BoundingBox, DomElement, ElementBuffer, ElementFlags};
pub use errors::CrawlerError;
pub use tree::{is_syntactically_valid_css_selector, DomTree, DomTreeNode, NodeIndex};
