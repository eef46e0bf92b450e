use async_trait::async_trait;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub path: String,
    pub language_id: String,
    pub full_text: String,
    /// Empty when nothing is selected.
    pub selection_text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("No active editor")]
    NoActiveEditor,

    #[error("{0}")]
    EditFailed(String),

    #[error("Could not open {path}: {message}")]
    OpenFailed { path: String, message: String },
}

#[async_trait]
pub trait EditorContext: Send + Sync {
    async fn active_document(&self) -> Option<ActiveDocument>;

    async fn replace_selection(&self, text: &str) -> Result<(), EditorError>;

    async fn insert_at_cursor(&self, text: &str) -> Result<(), EditorError>;

    /// Opens `path` and makes it the active document.
    async fn show_document(&self, path: &Path) -> Result<(), EditorError>;
}

/// Editor language identifier for a file, derived from its extension.
pub fn language_id_for_path(path: &Path) -> &'static str {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if file_name == "Dockerfile" {
        return "dockerfile";
    }
    if file_name == "Makefile" {
        return "makefile";
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" => "typescript",
        "tsx" => "typescriptreact",
        "java" => "java",
        "kt" => "kotlin",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cc" | "cpp" | "hpp" => "cpp",
        "cs" => "csharp",
        "swift" => "swift",
        "json" => "json",
        "md" => "markdown",
        "html" | "htm" => "html",
        "css" => "css",
        "scss" => "scss",
        "sh" | "bash" => "shellscript",
        "toml" => "toml",
        "yml" | "yaml" => "yaml",
        "xml" => "xml",
        "sql" => "sql",
        _ => "plaintext",
    }
}
