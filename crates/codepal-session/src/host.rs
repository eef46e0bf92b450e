use std::sync::Arc;

use codepal_workspace::{EditorContext, FileSystem, LocalFileSystem, LocalWorkspace, Workspace};

/// The editor, workspace and filesystem a panel works against.
#[derive(Clone)]
pub struct HostServices {
    pub editor: Arc<dyn EditorContext>,
    pub workspace: Arc<dyn Workspace>,
    pub fs: Arc<dyn FileSystem>,
}

impl HostServices {
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

    /// A host over the local disk with the given editor.
    pub fn local(editor: Arc<dyn EditorContext>, workspace: LocalWorkspace) -> Self {
        Self::new(editor, Arc::new(workspace), Arc::new(LocalFileSystem))
    }
}
