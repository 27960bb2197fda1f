use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Action service not configured: {0}")]
    NotConfigured(String),
}
