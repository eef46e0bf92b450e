//! Messages exchanged with the rendering surface.
//!
//! Outbound events mirror what a webview expects (`{"type": ..., "value": ...}`),
//! inbound commands mirror what it posts back (`{"command": ..., ...}`).

use serde::{Deserialize, Serialize};

use crate::ContextSnapshot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum UiEvent {
    Loading(bool),
    Response(String),
    Error(String),
    Info(String),
    UserMessage(String),
    EditorContent(ContextSnapshot),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum UiCommand {
    SendMessage {
        text: String,
    },
    GetEditorContent,
    InsertCodeIntoEditor {
        code: String,
    },
    CreateFile {
        #[serde(rename = "filePath", alias = "path")]
        path: String,
        content: String,
    },
}
