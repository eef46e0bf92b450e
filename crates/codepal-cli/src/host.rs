use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use codepal_session::HostServices;
use codepal_workspace::{BufferEditor, LocalWorkspace};

use crate::cli::Cli;

/// Parses `START:END` (or a single `LINE`) into 1-based inclusive lines.
pub(crate) fn parse_selection(spec: &str) -> Result<(usize, usize)> {
    let (start, end) = match spec.split_once(':') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => (spec.trim(), spec.trim()),
    };
    let start: usize = start
        .parse()
        .with_context(|| format!("invalid start line in selection: {spec}"))?;
    let end: usize = end
        .parse()
        .with_context(|| format!("invalid end line in selection: {spec}"))?;
    if start == 0 || end < start {
        bail!("selection must be START:END with 1 <= START <= END, got {spec}");
    }
    Ok((start, end))
}

pub(crate) fn workspace_root(cli: &Cli) -> Result<PathBuf> {
    let root = match &cli.workspace {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    if !root.is_dir() {
        bail!("workspace is not a directory: {}", root.display());
    }
    Ok(root)
}

/// The editor opened on `--file` (if any) with the requested selection or
/// cursor, plus services over the local disk.
pub(crate) async fn build_host(cli: &Cli, root: &Path) -> Result<(Arc<BufferEditor>, HostServices)> {
    let editor = match &cli.file {
        Some(file) => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                root.join(file)
            };
            let editor = BufferEditor::open(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            if let Some(spec) = &cli.select {
                let (start, end) = parse_selection(spec)?;
                editor.select_lines(start, end);
            } else if let Some(line) = cli.cursor {
                editor.move_cursor_to_line(line);
            }
            editor
        }
        None => {
            if cli.select.is_some() || cli.cursor.is_some() {
                tracing::warn!("--select and --cursor need --file, ignoring");
            }
            BufferEditor::empty()
        }
    };

    let editor = Arc::new(editor);
    let services = HostServices::local(editor.clone(), LocalWorkspace::new(root));
    Ok((editor, services))
}
