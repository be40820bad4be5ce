use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create report directory {0}: {1}")]
    CreateDir(String, std::io::Error),
    #[error("failed to write report file {0}: {1}")]
    Write(String, std::io::Error),
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
