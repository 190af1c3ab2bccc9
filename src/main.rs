use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex as TokioMutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docqa::config::Config;
use docqa::embedder::{Embedder, ollama::OllamaEmbedder, openai::OpenAiEmbedder};
use docqa::generator::{ChatModel, openai::OpenAiChat};
use docqa::mcp::server::McpServer;
use docqa::mcp::tools::ToolContext;
use docqa::pipeline::{Pipeline, PipelineOptions};
use docqa::store::Store;
use docqa::web::{self, AppState};

#[derive(Parser)]
#[command(name = "docqa", version, about = "Document Q&A server with an example MCP tool server")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web UI (upload, index, query, clear)
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the example MCP tool server on stdio
    Mcp {
        /// Override the configured project root
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    config.validate()?;

    match cli.command {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Mcp { root } => mcp(config, root).await,
    }
}

async fn serve(config: Config, bind: Option<String>) -> Result<()> {
    let embedder = build_embedder(&config)?;
    let chat = build_chat(&config)?;

    let store = Store::open(&config.db_path, embedder.dimensions())
        .context("failed to open vector store")?;

    let pipeline = Pipeline::new(
        Arc::new(TokioMutex::new(store)),
        embedder,
        chat,
        PipelineOptions {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            search_top_k: config.search_top_k,
            fetch_k: config.effective_fetch_k(),
            max_context_chars: config.max_context_chars,
        },
    );

    let app = web::router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Serving web UI on http://{addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn mcp(config: Config, root: Option<PathBuf>) -> Result<()> {
    let project_root = root.unwrap_or_else(|| PathBuf::from(&config.mcp.project_root));
    let project_root = std::path::absolute(&project_root)
        .with_context(|| format!("invalid project root: {}", project_root.display()))?;

    let server = McpServer::new(ToolContext {
        project_root,
        max_read_bytes: config.mcp.max_read_bytes,
    });
    server.start().await
}

/// Build the embedding backend selected by the provider config.
fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let p = &config.provider;
    match p.kind.as_str() {
        "openai" => {
            let api_key = p
                .api_key
                .clone()
                .context("OPENAI_API_KEY not set — export it or set provider.api_key")?;
            Ok(Arc::new(OpenAiEmbedder::new(
                api_key,
                p.embedding_model
                    .clone()
                    .unwrap_or_else(|| "text-embedding-3-small".to_string()),
                p.endpoint.clone(),
                p.embedding_dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            p.embedding_model
                .clone()
                .unwrap_or_else(|| "nomic-embed-text".to_string()),
            p.endpoint.clone(),
            p.embedding_dimensions,
        ))),
        other => anyhow::bail!("unknown provider kind: {other}"),
    }
}

/// Build the chat backend selected by the provider config.
fn build_chat(config: &Config) -> Result<Arc<dyn ChatModel>> {
    let p = &config.provider;
    match p.kind.as_str() {
        "openai" => {
            let api_key = p
                .api_key
                .clone()
                .context("OPENAI_API_KEY not set — export it or set provider.api_key")?;
            Ok(Arc::new(OpenAiChat::new(
                Some(api_key),
                p.chat_model
                    .clone()
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
                p.endpoint.clone(),
            )))
        }
        "ollama" => {
            // Ollama speaks the OpenAI chat surface under /v1.
            let endpoint = p
                .endpoint
                .clone()
                .unwrap_or_else(|| "http://localhost:11434".to_string());
            Ok(Arc::new(OpenAiChat::new(
                None,
                p.chat_model.clone().unwrap_or_else(|| "llama3.1".to_string()),
                Some(format!("{}/v1", endpoint.trim_end_matches('/'))),
            )))
        }
        other => anyhow::bail!("unknown provider kind: {other}"),
    }
}
