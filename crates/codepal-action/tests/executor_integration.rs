use std::fs;
use std::sync::Arc;

use codepal_action::{annotate, extract_actions, ActionError, ActionExecutor};
use codepal_types::PendingAction;
use codepal_workspace::{BufferEditor, EditorContext, LocalFileSystem, LocalWorkspace};

fn executor(editor: Arc<BufferEditor>, workspace: LocalWorkspace) -> ActionExecutor {
    ActionExecutor::new(editor, Arc::new(workspace), Arc::new(LocalFileSystem))
}

#[tokio::test]
async fn test_create_file_makes_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let editor = Arc::new(BufferEditor::empty());
    let exec = executor(editor.clone(), LocalWorkspace::new(dir.path()));

    let written = exec.create_file("sub/dir/new.txt", "hi").await.unwrap();

    assert_eq!(written, dir.path().join("sub/dir/new.txt"));
    assert_eq!(fs::read_to_string(&written).unwrap(), "hi");
    // The new file becomes the active document.
    assert_eq!(editor.path(), Some(written));
}

#[tokio::test]
async fn test_create_file_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "old contents").unwrap();
    let exec = executor(Arc::new(BufferEditor::empty()), LocalWorkspace::new(dir.path()));

    exec.create_file("a.txt", "new").await.unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new");
}

#[tokio::test]
async fn test_create_file_without_workspace() {
    let exec = executor(Arc::new(BufferEditor::empty()), LocalWorkspace::none());
    let err = exec.create_file("x.txt", "x").await.unwrap_err();
    assert!(matches!(err, ActionError::NoWorkspace));
}

#[tokio::test]
async fn test_create_file_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A plain file where a directory is needed.
    fs::write(dir.path().join("blocker"), "").unwrap();
    let exec = executor(Arc::new(BufferEditor::empty()), LocalWorkspace::new(dir.path()));

    let err = exec.create_file("blocker/inner.txt", "x").await.unwrap_err();
    match err {
        ActionError::FileSystem { path, message } => {
            assert!(path.ends_with("inner.txt"));
            assert!(!message.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_insert_without_editor() {
    let dir = tempfile::tempdir().unwrap();
    let exec = executor(Arc::new(BufferEditor::empty()), LocalWorkspace::new(dir.path()));
    let err = exec.insert_code("x").await.unwrap_err();
    assert!(matches!(err, ActionError::NoActiveEditor));
}

#[tokio::test]
async fn test_insert_replaces_selection() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.py");
    fs::write(&file, "a = 1\nb = 2\nc = 3\n").unwrap();
    let editor = Arc::new(BufferEditor::open(&file).await.unwrap());
    editor.select_lines(2, 2);
    let exec = executor(editor.clone(), LocalWorkspace::new(dir.path()));

    exec.insert_code("b = 42\n").await.unwrap();

    assert_eq!(fs::read_to_string(&file).unwrap(), "a = 1\nb = 42\nc = 3\n");
    let doc = editor.active_document().await.unwrap();
    assert!(doc.selection_text.is_empty());
}

#[tokio::test]
async fn test_insert_at_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("main.py");
    fs::write(&file, "a = 1\nc = 3\n").unwrap();
    let editor = Arc::new(BufferEditor::open(&file).await.unwrap());
    editor.move_cursor_to_line(2);
    let exec = executor(editor.clone(), LocalWorkspace::new(dir.path()));

    exec.insert_code("b = 2\n").await.unwrap();
    assert_eq!(editor.text().unwrap(), "a = 1\nb = 2\nc = 3\n");
}

#[tokio::test]
async fn test_execute_actions_from_reply() {
    let dir = tempfile::tempdir().unwrap();
    let editor = Arc::new(BufferEditor::empty());
    let exec = executor(editor.clone(), LocalWorkspace::new(dir.path()));

    let reply = "Here:\n<create-file path=\"src/util.rs\">pub fn answer() -> u32 { 42 }\n</create-file>\n<insert-code>// uses <util></insert-code>";
    let actions = extract_actions(&annotate(reply));
    assert_eq!(actions.len(), 2);

    let first = exec.execute(&actions[0]).await.unwrap();
    assert_eq!(first, "File created: src/util.rs");

    // The created file is now open, so the insert lands at its end.
    let second = exec.execute(&actions[1]).await.unwrap();
    assert_eq!(second, "Code inserted successfully!");
    assert_eq!(
        fs::read_to_string(dir.path().join("src/util.rs")).unwrap(),
        "pub fn answer() -> u32 { 42 }\n// uses <util>"
    );
    assert_eq!(
        actions[1],
        PendingAction::InsertCode {
            code: "// uses <util>".to_string()
        }
    );
}
