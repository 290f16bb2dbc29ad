#[derive(Debug, thiserror::Error)]
pub enum KioskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, KioskError>;
