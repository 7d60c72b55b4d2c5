use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepreciationError {
    /// Client-facing input problem. Never retried.
    #[error("{0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DepreciationError {
    pub fn validation(message: impl Into<String>) -> Self {
        DepreciationError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DepreciationError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DepreciationError>;
