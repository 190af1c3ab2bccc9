/// Configuration module for docqa.
///
/// Handles loading, validating, and providing default configuration values.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_db_path() -> String {
    ":memory:".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_search_top_k() -> usize {
    10
}

fn default_max_context_chars() -> usize {
    6000
}

fn default_bind_addr() -> String {
    "127.0.0.1:7860".to_string()
}

fn default_provider_kind() -> String {
    "openai".to_string()
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_max_read_bytes() -> usize {
    64 * 1024
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Vector store location; `:memory:` keeps the index in process memory,
    /// a file path opts in to persistence.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    /// Candidates fetched before MMR re-ranking; 0 means `2 * search_top_k`.
    #[serde(default)]
    pub fetch_k: usize,

    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub mcp: McpConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    /// `openai` or `ollama`.
    #[serde(default = "default_provider_kind")]
    pub kind: String,

    /// API base; provider-specific default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_dimensions: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_model: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct McpConfig {
    /// Directory the tool server is confined to.
    #[serde(default = "default_project_root")]
    pub project_root: String,

    /// Upper bound for the read_file tool.
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: usize,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            search_top_k: default_search_top_k(),
            fetch_k: 0,
            max_context_chars: default_max_context_chars(),
            bind_addr: default_bind_addr(),
            provider: ProviderConfig::default(),
            mcp: McpConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            endpoint: None,
            api_key: None,
            embedding_model: None,
            embedding_dimensions: None,
            chat_model: None,
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            max_read_bytes: default_max_read_bytes(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`. If the file
    /// does not exist, returns a default config and generates a template for
    /// the default path. After loading, environment overrides are applied.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        let mut cfg = if Path::new(path).exists() {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {path}"))?;

            match serde_json::from_str::<Config>(&data) {
                Ok(c) => {
                    info!("Loaded configuration from {path}");
                    c
                }
                Err(e) => {
                    warn!("Invalid JSON in {path}: {e}");
                    warn!("Using default configuration");
                    Self::default()
                }
            }
        } else {
            info!("{path} not found, using defaults");
            let cfg = Self::default();
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }
            cfg
        };

        cfg.apply_env();
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Apply environment overrides: `DOCQA_PROVIDER` selects the provider,
    /// `OPENAI_API_KEY` supplies the key when the file omits it.
    fn apply_env(&mut self) {
        if let Ok(kind) = std::env::var("DOCQA_PROVIDER") {
            if !kind.is_empty() {
                self.provider.kind = kind;
            }
        }
        if self.provider.api_key.is_none() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                if !key.is_empty() {
                    self.provider.api_key = Some(key);
                }
            }
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.chunk_size > 0, "chunk_size must be positive");
        anyhow::ensure!(
            self.chunk_overlap < self.chunk_size,
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            self.chunk_overlap,
            self.chunk_size
        );
        anyhow::ensure!(self.search_top_k > 0, "search_top_k must be positive");
        anyhow::ensure!(
            self.max_context_chars > 0,
            "max_context_chars must be positive"
        );
        anyhow::ensure!(
            matches!(self.provider.kind.as_str(), "openai" | "ollama"),
            "provider.kind must be \"openai\" or \"ollama\", got {:?}",
            self.provider.kind
        );
        if let Some(dims) = self.provider.embedding_dimensions {
            anyhow::ensure!(dims > 0, "provider.embedding_dimensions must be positive");
        }
        anyhow::ensure!(
            self.mcp.max_read_bytes > 0,
            "mcp.max_read_bytes must be positive"
        );
        Ok(())
    }

    /// Candidate pool size for MMR re-ranking.
    #[must_use]
    pub fn effective_fetch_k(&self) -> usize {
        if self.fetch_k == 0 {
            self.search_top_k * 2
        } else {
            self.fetch_k.max(self.search_top_k)
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
