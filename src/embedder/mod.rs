//! Embedder trait and shared types for text embedding.
//!
//! Embedding happens through remote APIs (OpenAI-compatible or Ollama), so
//! the trait is async and all failures are surfaced — an embedder never
//! substitutes a zero vector for a failed call.

pub mod mock;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("embedding response contained no vectors")]
    EmptyResponse,

    #[error("API key not configured — set OPENAI_API_KEY or provider.api_key")]
    MissingApiKey,
}

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` to allow concurrent use behind
/// `Arc`.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text string into a vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Embed multiple text strings into vectors, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;

    /// Return the model identifier used for embedding.
    fn model_name(&self) -> &str;
}
