#[derive(thiserror::Error, Debug)]
pub enum UiTesterError {
    #[error("no active case; call start_case first")]
    NoActiveCase,
    #[error("crawl failed: {0}")]
    Crawl(#[from] webqa_dom::CrawlerError),
    #[error("screenshot failed: {0}")]
    Action(#[from] webqa_actions::ActionError),
    #[error("LLM call failed: {0}")]
    Llm(#[from] webqa_llm::LlmError),
    #[error("planner returned no usable plan: {0}")]
    Plan(String),
}
