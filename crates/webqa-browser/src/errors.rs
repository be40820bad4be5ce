use thiserror::Error;

/// Browser Session error taxonomy.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    BrowserLaunchError(String),
    #[error("navigation to {url} failed: {reason}")]
    NavigationError { url: String, reason: String },
    #[error("page at {0} loaded but body text is blank")]
    BlankPageError(String),
    #[error("cookies value is neither a JSON string, object, nor array: {0}")]
    InvalidCookies(String),
    #[error("browser session is closed")]
    Closed,
    #[error("browser session was never initialized")]
    NotInitialized,
}
