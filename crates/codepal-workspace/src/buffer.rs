use async_trait::async_trait;
use parking_lot::Mutex;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::editor::{language_id_for_path, ActiveDocument, EditorContext, EditorError};

/// A headless editor holding one open document in memory.
///
/// Edits are applied to the buffer and saved back to disk immediately.
#[derive(Debug, Default)]
pub struct BufferEditor {
    state: Mutex<Option<Buffer>>,
}

#[derive(Debug, Clone)]
struct Buffer {
    path: PathBuf,
    text: String,
    selection: Option<Range<usize>>,
    cursor: usize,
}

impl BufferEditor {
    /// An editor with no document open.
    pub fn empty() -> Self {
        Self::default()
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let editor = Self::empty();
        editor.load(path.into()).await?;
        Ok(editor)
    }

    async fn load(&self, path: PathBuf) -> Result<(), EditorError> {
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EditorError::OpenFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let cursor = text.len();
        *self.state.lock() = Some(Buffer {
            path,
            text,
            selection: None,
            cursor,
        });
        Ok(())
    }

    /// Selects whole lines `start..=end` (1-based). Out-of-range lines are clamped.
    pub fn select_lines(&self, start: usize, end: usize) {
        if let Some(buffer) = self.state.lock().as_mut() {
            let from = line_offset(&buffer.text, start.max(1));
            let to = line_end_offset(&buffer.text, end.max(start).max(1));
            buffer.selection = (from < to).then_some(from..to);
            buffer.cursor = to;
        }
    }

    /// Places the cursor at the start of `line` (1-based) and clears the selection.
    pub fn move_cursor_to_line(&self, line: usize) {
        if let Some(buffer) = self.state.lock().as_mut() {
            buffer.selection = None;
            buffer.cursor = line_offset(&buffer.text, line.max(1));
        }
    }

    pub fn text(&self) -> Option<String> {
        self.state.lock().as_ref().map(|b| b.text.clone())
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state.lock().as_ref().map(|b| b.path.clone())
    }

    async fn apply(&self, text: &str, replace_selection: bool) -> Result<(), EditorError> {
        let (path, contents) = {
            let mut guard = self.state.lock();
            let buffer = guard.as_mut().ok_or(EditorError::NoActiveEditor)?;
            let range = match (&buffer.selection, replace_selection) {
                (Some(range), true) => range.clone(),
                _ => buffer.cursor..buffer.cursor,
            };
            buffer.text.replace_range(range.clone(), text);
            buffer.cursor = range.start + text.len();
            buffer.selection = None;
            (buffer.path.clone(), buffer.text.clone())
        };

        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| EditorError::EditFailed(format!("Failed to save {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "applied edit");
        Ok(())
    }
}

#[async_trait]
impl EditorContext for BufferEditor {
    async fn active_document(&self) -> Option<ActiveDocument> {
        let guard = self.state.lock();
        let buffer = guard.as_ref()?;
        Some(ActiveDocument {
            path: buffer.path.display().to_string(),
            language_id: language_id_for_path(&buffer.path).to_string(),
            full_text: buffer.text.clone(),
            selection_text: buffer
                .selection
                .as_ref()
                .map(|r| buffer.text[r.clone()].to_string())
                .unwrap_or_default(),
        })
    }

    async fn replace_selection(&self, text: &str) -> Result<(), EditorError> {
        self.apply(text, true).await
    }

    async fn insert_at_cursor(&self, text: &str) -> Result<(), EditorError> {
        self.apply(text, false).await
    }

    async fn show_document(&self, path: &Path) -> Result<(), EditorError> {
        self.load(path.to_path_buf()).await?;
        tracing::info!(path = %path.display(), "opened document");
        Ok(())
    }
}

/// Byte offset of the start of `line` (1-based); the end of text when past it.
fn line_offset(text: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    text.match_indices('\n')
        .nth(line - 2)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(text.len())
}

/// Byte offset just past the end of `line` (1-based), including its newline.
fn line_end_offset(text: &str, line: usize) -> usize {
    line_offset(text, line + 1)
}
