use thiserror::Error;

/// ActionError: invalid parameters or a DOM operation that
/// genuinely could not be attempted. Ordinary "element not
/// interactable" conditions are NOT represented here — they come back
/// as `success: false` on the operation's own result.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("browser capability error: {0}")]
    Capability(#[from] webqa_browser::BrowserError),
    #[error("no element with id {0} in the current ElementBuffer")]
    UnknownElementId(String),
    #[error("element {0} has neither a selector nor an xpath")]
    NoLocator(String),
    #[error("screenshot failed: {0}")]
    Screenshot(String),
}
