use thiserror::Error;

use crate::embedder::EmbedderError;
use crate::generator::ChatError;

/// Errors surfaced by the indexing/query pipeline.
///
/// Validation failures carry no side effects; external-service failures leave
/// the index in its prior state so the operation can simply be retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("document appears to be empty: {0}")]
    EmptyDocument(String),

    #[error("failed to parse {filename}: {message}")]
    Parse { filename: String, message: String },

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("no documents indexed yet — upload and index documents before asking questions")]
    EmptyIndex,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedderError),

    #[error("answer generation failed: {0}")]
    Generation(#[from] ChatError),

    #[error("vector store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("embedding dimension mismatch: store expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether this error was caused by invalid caller input (as opposed to a
    /// provider or storage failure).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_)
                | Self::EmptyDocument(_)
                | Self::EmptyQuestion
                | Self::EmptyIndex
        )
    }
}
