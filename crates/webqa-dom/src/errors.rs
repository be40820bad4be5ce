use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("page-side evaluate failed during crawl: {0}")]
    Evaluate(String),
    #[error("crawl payload had no node at the top level")]
    EmptyPayload,
    #[error("element id {0} not present in the current ElementBuffer")]
    UnknownElementId(String),
}
