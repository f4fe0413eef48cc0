use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown search algorithm: {0}")]
    InvalidAlgorithm(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Document store unavailable: {0}")]
    Store(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("All strategies failed: {0}")]
    AllStrategiesFailed(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Timeouts are retryable; callers branch on this rather than on message text.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
