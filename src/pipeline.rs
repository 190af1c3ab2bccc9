//! Indexing and query orchestration.
//!
//! Wires loader → chunker → embedder → store for indexing, and
//! embedder → store → retriever → generator for queries. One pipeline serves
//! one user session; nothing here coordinates concurrent operations beyond
//! the store mutex.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex as TokioMutex;
use tracing::{info, warn};

use crate::chunker;
use crate::embedder::Embedder;
use crate::error::PipelineError;
use crate::generator::{Answer, ChatModel, Generator};
use crate::loader;
use crate::retriever;
use crate::store::Store;

/// Coarse lifecycle of the index, reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Empty,
    Indexing,
    Ready,
    Querying,
}

/// Outcome of one indexing request; per-file failures are collected here
/// instead of aborting the batch.
#[derive(Debug, Default, Serialize)]
pub struct IndexSummary {
    pub files_indexed: Vec<String>,
    pub chunks_indexed: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub documents: usize,
    pub chunks: usize,
}

/// Tunables taken from [`crate::config::Config`].
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub search_top_k: usize,
    pub fetch_k: usize,
    pub max_context_chars: usize,
}

pub struct Pipeline {
    store: Arc<TokioMutex<Store>>,
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    generator: Generator,
    options: PipelineOptions,
    state: TokioMutex<PipelineState>,
}

impl Pipeline {
    pub fn new(
        store: Arc<TokioMutex<Store>>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            embedder,
            chat,
            generator: Generator::new(options.max_context_chars),
            options,
            state: TokioMutex::new(PipelineState::Empty),
        }
    }

    /// Index a batch of uploaded files. `files` pairs the user-visible
    /// filename with the on-disk location of the uploaded bytes.
    pub async fn index_files(&self, files: &[(String, std::path::PathBuf)]) -> IndexSummary {
        self.set_state(PipelineState::Indexing).await;

        let mut summary = IndexSummary::default();
        for (filename, path) in files {
            match self.index_document(filename, path).await {
                Ok(chunks) => {
                    info!("indexed {filename}: {chunks} chunks");
                    summary.files_indexed.push(filename.clone());
                    summary.chunks_indexed += chunks;
                }
                Err(e) => {
                    warn!("failed to index {filename}: {e}");
                    summary.errors.push(format!("{filename}: {e}"));
                }
            }
        }

        self.settle_state().await;
        summary
    }

    /// Index one document: load, chunk, embed, append to the store.
    /// Returns the number of chunks written.
    pub async fn index_document(
        &self,
        filename: &str,
        path: &Path,
    ) -> Result<usize, PipelineError> {
        let doc = loader::load_document(path)?;

        let chunks = chunker::split_with_overlap(
            &doc.text,
            self.options.chunk_size,
            self.options.chunk_overlap,
        );
        if chunks.is_empty() {
            return Err(PipelineError::EmptyDocument(filename.to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let mut store = self.store.lock().await;
        store.insert_document(filename, &chunks, &vectors)?;
        Ok(chunks.len())
    }

    /// Answer a question from the indexed documents.
    pub async fn query(&self, question: &str) -> Result<Answer, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        {
            let store = self.store.lock().await;
            if store.count_chunks()? == 0 {
                return Err(PipelineError::EmptyIndex);
            }
        }

        self.set_state(PipelineState::Querying).await;
        let result = self.run_query(question).await;
        self.settle_state().await;
        result
    }

    async fn run_query(&self, question: &str) -> Result<Answer, PipelineError> {
        let query_vector = self.embedder.embed(question).await?;

        let candidates = {
            let store = self.store.lock().await;
            store.search(&query_vector, self.options.fetch_k)?
        };

        let hits = retriever::mmr_select(
            &query_vector,
            candidates,
            self.options.search_top_k,
            0.5,
        );
        if hits.is_empty() {
            return Err(PipelineError::EmptyIndex);
        }

        let answer = self
            .generator
            .generate(self.chat.as_ref(), question, &hits)
            .await?;
        Ok(answer)
    }

    /// Drop every index entry and return to the empty state.
    pub async fn clear(&self) -> Result<(), PipelineError> {
        let mut store = self.store.lock().await;
        store.clear()?;
        drop(store);

        self.set_state(PipelineState::Empty).await;
        info!("index cleared");
        Ok(())
    }

    pub async fn status(&self) -> Result<PipelineStatus, PipelineError> {
        let (documents, chunks) = {
            let store = self.store.lock().await;
            (store.count_documents()?, store.count_chunks()?)
        };
        let state = *self.state.lock().await;
        Ok(PipelineStatus {
            state,
            documents,
            chunks,
        })
    }

    async fn set_state(&self, state: PipelineState) {
        *self.state.lock().await = state;
    }

    /// After an operation, the index is Ready when it holds chunks and Empty
    /// otherwise.
    async fn settle_state(&self) {
        let has_chunks = {
            let store = self.store.lock().await;
            store.count_chunks().map(|n| n > 0).unwrap_or(false)
        };
        self.set_state(if has_chunks {
            PipelineState::Ready
        } else {
            PipelineState::Empty
        })
        .await;
    }
}
