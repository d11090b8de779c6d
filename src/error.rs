//! Error handling for the resume ranker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeRankerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding timed out after {0} ms")]
    EmbeddingTimeout(u64),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeRankerError>;

/// Model loading in model2vec-rs reports through anyhow; keep the whole context chain
impl From<anyhow::Error> for ResumeRankerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeRankerError::Embedding(format!("{:#}", err))
    }
}

impl From<toml::de::Error> for ResumeRankerError {
    fn from(err: toml::de::Error) -> Self {
        ResumeRankerError::Configuration(format!("Failed to parse TOML: {}", err))
    }
}
