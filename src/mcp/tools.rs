/// MCP tool handlers.
///
/// Four example tools:
/// 1. calculate        – basic arithmetic on two operands
/// 2. read_file        – bounded read of a file inside the project root
/// 3. list_files       – list a directory inside the project root
/// 4. get_project_info – static metadata about the project
use std::path::PathBuf;

use rmcp::handler::server::ServerHandler;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{ErrorData as McpError, handler::server::tool::ToolRouter, model::*, tool, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::mcp::sandbox::resolve_within;

// ── Parameter structs ────────────────────────────────────────────────

#[derive(Deserialize, JsonSchema)]
struct CalculateParams {
    /// Operation to perform: add | subtract | multiply | divide
    operation: String,
    /// First operand
    a: f64,
    /// Second operand
    b: f64,
}

#[derive(Deserialize, JsonSchema)]
struct ReadFileParams {
    /// Path to the file, relative to the project root
    filepath: String,
}

#[derive(Deserialize, JsonSchema)]
struct ListFilesParams {
    /// Directory path relative to the project root (default: the root itself)
    directory: Option<String>,
}

// ── Response helpers ─────────────────────────────────────────────────

fn json_result(value: serde_json::Value) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&value).unwrap_or_default(),
    )]))
}

fn text_result(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn error_result(msg: &str) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.to_string())]))
}

// ── Arithmetic ───────────────────────────────────────────────────────

/// Apply a named arithmetic operation. Unknown operations and division by
/// zero are reported as errors, never as NaN/infinity results.
fn apply_operation(operation: &str, a: f64, b: f64) -> Result<f64, String> {
    match operation {
        "add" => Ok(a + b),
        "subtract" => Ok(a - b),
        "multiply" => Ok(a * b),
        "divide" => {
            if b == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(a / b)
            }
        }
        other => Err(format!("unknown operation: {other}")),
    }
}

// ── Tool implementations ─────────────────────────────────────────────

/// Shared context for all tool handlers.
#[derive(Clone)]
pub struct ToolContext {
    pub project_root: PathBuf,
    pub max_read_bytes: usize,
}

#[derive(Clone)]
pub struct ProjectTools {
    pub ctx: ToolContext,
    pub tool_router: ToolRouter<Self>,
}

impl ServerHandler for ProjectTools {}

#[tool_router]
impl ProjectTools {
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    // ── Tool 1: calculate ───────────────────────────────────────────

    #[tool(description = "Perform basic mathematical calculations (add, subtract, multiply, divide)")]
    async fn calculate(
        &self,
        params: Parameters<CalculateParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        match apply_operation(&p.operation, p.a, p.b) {
            Ok(result) => json_result(serde_json::json!({
                "operation": p.operation,
                "a": p.a,
                "b": p.b,
                "result": result,
            })),
            Err(msg) => error_result(&msg),
        }
    }

    // ── Tool 2: read_file ───────────────────────────────────────────

    #[tool(description = "Read the contents of a text file from the project directory")]
    async fn read_file(
        &self,
        params: Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let filepath = &params.0.filepath;
        if filepath.is_empty() {
            return error_result("filepath is required");
        }

        let full_path = match resolve_within(&self.ctx.project_root, filepath) {
            Ok(p) => p,
            Err(e) => return error_result(&e.to_string()),
        };

        if !full_path.is_file() {
            return error_result(&format!("file not found: {filepath}"));
        }

        let bytes = match std::fs::read(&full_path) {
            Ok(b) => b,
            Err(e) => return error_result(&format!("error reading file: {e}")),
        };

        let truncated = bytes.len() > self.ctx.max_read_bytes;
        let shown = if truncated {
            &bytes[..self.ctx.max_read_bytes]
        } else {
            &bytes[..]
        };
        let content = String::from_utf8_lossy(shown);

        let mut out = format!("File contents of {filepath}:\n\n{content}");
        if truncated {
            out.push_str(&format!(
                "\n\n[truncated to the first {} of {} bytes]",
                self.ctx.max_read_bytes,
                bytes.len()
            ));
        }
        text_result(out)
    }

    // ── Tool 3: list_files ──────────────────────────────────────────

    #[tool(description = "List all files in a directory within the project root")]
    async fn list_files(
        &self,
        params: Parameters<ListFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let directory = params.0.directory.unwrap_or_else(|| ".".to_string());

        let dir_path = match resolve_within(&self.ctx.project_root, &directory) {
            Ok(p) => p,
            Err(e) => return error_result(&e.to_string()),
        };

        if !dir_path.exists() {
            return error_result(&format!("directory not found: {directory}"));
        }
        if !dir_path.is_dir() {
            return error_result(&format!("path is not a directory: {directory}"));
        }

        let entries = match std::fs::read_dir(&dir_path) {
            Ok(e) => e,
            Err(e) => return error_result(&format!("error listing files: {e}")),
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(t) if t.is_dir() => dirs.push(name),
                Ok(_) => files.push(name),
                Err(_) => {}
            }
        }
        files.sort();
        dirs.sort();

        let mut out = format!("Files in {directory}:\n");
        if !files.is_empty() {
            out.push_str("\nFiles:\n");
            for f in &files {
                out.push_str(&format!("  - {f}\n"));
            }
        }
        if !dirs.is_empty() {
            out.push_str("\nDirectories:\n");
            for d in &dirs {
                out.push_str(&format!("  - {d}/\n"));
            }
        }
        if files.is_empty() && dirs.is_empty() {
            out.push_str("  (empty)");
        }
        text_result(out)
    }

    // ── Tool 4: get_project_info ────────────────────────────────────

    #[tool(description = "Get information about the current project (version, root, dependencies)")]
    async fn get_project_info(&self) -> Result<CallToolResult, McpError> {
        let mut info = serde_json::json!({
            "server": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "project_root": self.ctx.project_root.display().to_string(),
        });

        // List dependencies from the project's own manifest, when present.
        let manifest_path = self.ctx.project_root.join("Cargo.toml");
        if let Ok(data) = std::fs::read_to_string(&manifest_path) {
            if let Ok(manifest) = data.parse::<toml::Table>() {
                if let Some(package) = manifest.get("package").and_then(|p| p.as_table()) {
                    if let Some(name) = package.get("name").and_then(|n| n.as_str()) {
                        info["project_name"] = serde_json::json!(name);
                    }
                }
                if let Some(deps) = manifest.get("dependencies").and_then(|d| d.as_table()) {
                    let mut names: Vec<&str> = deps.keys().map(String::as_str).collect();
                    names.sort_unstable();
                    info["dependencies"] = serde_json::json!(names);
                }
            }
        }

        json_result(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_operation_table() {
        assert_eq!(apply_operation("add", 2.0, 3.0), Ok(5.0));
        assert_eq!(apply_operation("subtract", 2.0, 3.0), Ok(-1.0));
        assert_eq!(apply_operation("multiply", 2.0, 3.0), Ok(6.0));
        assert_eq!(apply_operation("divide", 10.0, 4.0), Ok(2.5));
    }

    #[test]
    fn test_divide_by_zero_is_an_error() {
        let err = apply_operation("divide", 10.0, 0.0).unwrap_err();
        assert!(err.contains("division by zero"));
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        let err = apply_operation("modulo", 10.0, 3.0).unwrap_err();
        assert!(err.contains("unknown operation"));
    }
}
