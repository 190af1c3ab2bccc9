//! # docqa — Document Q&A over a local vector index
//!
//! Upload documents, index them into an in-memory vector store, and answer
//! questions about them with cited sources (retrieval-augmented generation).
//! A small example MCP tool server ships alongside the web app.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, environment overrides
//! - **[`loader`]** — File-format text extraction (PDF, Word, PowerPoint, text)
//! - **[`chunker`]** — Fixed-size overlapping text windows
//! - **[`embedder`]** — Remote text embedding (OpenAI-compatible or Ollama)
//! - **[`store`]** — SQLite + sqlite-vec vector store (append, search, clear)
//! - **[`retriever`]** — MMR re-ranking of nearest-neighbor candidates
//! - **[`generator`]** — Bounded-context answer generation with citations
//! - **[`pipeline`]** — Index/query/clear orchestration and status
//! - **[`web`]** — axum web UI (upload, index, query, clear)
//! - **[`mcp`]** — Example MCP tool server (stdio transport via rmcp)

pub mod chunker;
pub mod config;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod loader;
pub mod mcp;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod web;
