//! Host collaborators: the editor, the workspace and the filesystem.
//!
//! The traits are what the assistant core depends on. The `Local*` and
//! [`BufferEditor`] implementations back them with the real filesystem so the
//! core can run outside an editor.

pub mod buffer;
pub mod editor;
pub mod fs;
pub mod workspace;

pub use buffer::BufferEditor;
pub use editor::{language_id_for_path, ActiveDocument, EditorContext, EditorError};
pub use fs::{FileSystem, LocalFileSystem};
pub use workspace::{LocalWorkspace, Workspace};
