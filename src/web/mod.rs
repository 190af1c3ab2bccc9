//! Local web UI: upload, index, query and clear over a small JSON surface.
//!
//! Every handler delegates to [`Pipeline`]; the routes hold no state of
//! their own beyond the shared pipeline handle.

use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use crate::error::PipelineError;
use crate::generator::Answer;
use crate::pipeline::{IndexSummary, Pipeline, PipelineStatus};

const INDEX_HTML: &str = include_str!("index.html");

const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/index", post(index_documents))
        .route("/api/query", post(query))
        .route("/api/clear", post(clear_index))
        .route("/api/status", get(status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ── Error mapping ────────────────────────────────────────────────────

/// JSON error response with a status code chosen by failure kind.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let status = match &e {
            _ if e.is_validation() => StatusCode::BAD_REQUEST,
            PipelineError::Embedding(_) | PipelineError::Generation(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("invalid upload: {e}"),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("request failed: {}", self.message);
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Receive uploaded files, stage them in a temp dir, and index the batch.
async fn index_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IndexSummary>, ApiError> {
    let staging = tempfile::tempdir()?;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        // Keep only the final path component of whatever the browser sent.
        let Some(filename) = Path::new(&original_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };

        let bytes = field.bytes().await?;
        let path = staging.path().join(&filename);
        std::fs::write(&path, &bytes)?;
        files.push((filename, path));
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("upload at least one document"));
    }

    Ok(Json(state.pipeline.index_files(&files).await))
}

#[derive(Deserialize)]
struct QueryRequest {
    question: String,
}

async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<Answer>, ApiError> {
    let answer = state.pipeline.query(&req.question).await?;
    Ok(Json(answer))
}

async fn clear_index(State(state): State<AppState>) -> Result<Json<PipelineStatus>, ApiError> {
    state.pipeline.clear().await?;
    Ok(Json(state.pipeline.status().await?))
}

async fn status(State(state): State<AppState>) -> Result<Json<PipelineStatus>, ApiError> {
    Ok(Json(state.pipeline.status().await?))
}
