use std::path::{Path, PathBuf};
use std::sync::Arc;

use codepal_types::PendingAction;
use codepal_workspace::{EditorContext, EditorError, FileSystem, Workspace};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("No active editor to insert code.")]
    NoActiveEditor,

    #[error("No workspace folder is open.")]
    NoWorkspace,

    #[error("Error creating file {path}: {message}")]
    FileSystem { path: String, message: String },

    #[error("Editor error: {0}")]
    Editor(String),
}

impl From<EditorError> for ActionError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::NoActiveEditor => ActionError::NoActiveEditor,
            other => ActionError::Editor(other.to_string()),
        }
    }
}

/// Applies confirmed actions through the host editor and filesystem.
#[derive(Clone)]
pub struct ActionExecutor {
    editor: Arc<dyn EditorContext>,
    workspace: Arc<dyn Workspace>,
    fs: Arc<dyn FileSystem>,
}

impl ActionExecutor {
    pub fn new(
        editor: Arc<dyn EditorContext>,
        workspace: Arc<dyn Workspace>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            editor,
            workspace,
            fs,
        }
    }

    /// Replaces the selection when there is one, otherwise inserts at the cursor.
    pub async fn insert_code(&self, code: &str) -> Result<(), ActionError> {
        let document = self
            .editor
            .active_document()
            .await
            .ok_or(ActionError::NoActiveEditor)?;

        if document.selection_text.is_empty() {
            self.editor.insert_at_cursor(code).await?;
        } else {
            self.editor.replace_selection(code).await?;
        }

        tracing::info!(
            path = %document.path,
            bytes = code.len(),
            replaced_selection = !document.selection_text.is_empty(),
            "inserted code"
        );
        Ok(())
    }

    /// Writes `content` to `path` (relative to the workspace root unless
    /// absolute), creating parent directories, then opens the file.
    pub async fn create_file(&self, path: &str, content: &str) -> Result<PathBuf, ActionError> {
        let root = self.workspace.root_path().ok_or(ActionError::NoWorkspace)?;
        let target = resolve_path(path, &root);

        let fs_error = |err: std::io::Error| ActionError::FileSystem {
            path: target.display().to_string(),
            message: err.to_string(),
        };

        if let Some(parent) = target.parent() {
            if !self.fs.exists(parent).await {
                self.fs.create_dir_all(parent).await.map_err(fs_error)?;
            }
        }
        self.fs.write(&target, content).await.map_err(fs_error)?;

        tracing::info!(path = %target.display(), bytes = content.len(), "created file");

        self.editor
            .show_document(&target)
            .await
            .map_err(|err| ActionError::FileSystem {
                path: target.display().to_string(),
                message: err.to_string(),
            })?;
        Ok(target)
    }

    /// Runs `action` and returns the message to show the user on success.
    pub async fn execute(&self, action: &PendingAction) -> Result<String, ActionError> {
        match action {
            PendingAction::InsertCode { code } => {
                self.insert_code(code).await?;
                Ok("Code inserted successfully!".to_string())
            }
            PendingAction::CreateFile { path, content } => {
                self.create_file(path, content).await?;
                Ok(format!("File created: {}", path))
            }
        }
    }
}

fn resolve_path(raw: &str, root: &Path) -> PathBuf {
    if Path::new(raw).is_absolute() {
        PathBuf::from(raw)
    } else {
        root.join(raw)
    }
}
