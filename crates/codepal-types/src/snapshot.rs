use serde::{Deserialize, Serialize};

pub const NO_FILE_OPEN: &str = "No file open";
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Point-in-time description of the editing environment.
///
/// Built fresh for every request and never mutated afterwards. Empty strings
/// mean "not available"; the prompt layer decides how to render that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub language_id: String,
    pub full_text: String,
    pub selected_text: String,
    pub project_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_manifest_name: Option<String>,
    pub dependency_manifest_text: String,
}

impl ContextSnapshot {
    /// Snapshot used when no editor is active.
    pub fn empty() -> Self {
        Self {
            file_path: None,
            language_id: UNKNOWN_LANGUAGE.to_string(),
            full_text: String::new(),
            selected_text: String::new(),
            project_summary: String::new(),
            dependency_manifest_name: None,
            dependency_manifest_text: String::new(),
        }
    }

    /// File name as shown to the model; falls back to a placeholder.
    pub fn display_file_name(&self) -> &str {
        self.file_path.as_deref().unwrap_or(NO_FILE_OPEN)
    }

    pub fn has_file(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_text.is_empty()
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependency_manifest_text.is_empty()
    }
}

impl Default for ContextSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
