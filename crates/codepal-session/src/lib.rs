//! Conversation orchestration: context snapshots, prompt templates, the
//! windowed conversation session and the panels that drive it.

pub mod host;
pub mod panel;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod system;
pub mod template;

pub use host::HostServices;
pub use panel::{Panel, PanelError, TestKind};
pub use registry::Controller;
pub use session::{ConversationSession, RenderedReply, SessionError, HISTORY_WINDOW};
pub use snapshot::{SnapshotBuilder, CONFIG_ENTRIES, DEPENDENCY_MANIFESTS};
pub use system::SystemPrompt;
pub use template::{compose_chat_prompt, render, PromptTemplate, NOT_AVAILABLE};
