use serde::{Deserialize, Serialize};

/// A user-confirmable operation parsed out of a model reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PendingAction {
    InsertCode { code: String },
    CreateFile { path: String, content: String },
}

impl PendingAction {
    pub fn label(&self) -> String {
        match self {
            PendingAction::InsertCode { code } => {
                let lines = code.lines().count().max(1);
                format!("insert code ({} line{})", lines, if lines == 1 { "" } else { "s" })
            }
            PendingAction::CreateFile { path, .. } => format!("create file {}", path),
        }
    }
}
