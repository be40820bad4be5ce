#[derive(thiserror::Error, Debug)]
pub enum LlmError {
    #[error("LLM client misconfigured: {0}")]
    Config(String),
    #[error("LLM request failed: {0}")]
    Request(String),
    #[error("LLM response was empty or unparsable")]
    EmptyResponse,
}
