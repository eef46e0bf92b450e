use async_trait::async_trait;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[async_trait]
pub trait Workspace: Send + Sync {
    fn root_path(&self) -> Option<PathBuf>;

    async fn find_file(&self, name: &str) -> bool;

    /// Number of files under the root matching `include` and not `exclude`.
    /// `None` when counting is not possible.
    async fn count_files(&self, include: &str, exclude: &str) -> Option<usize>;
}

/// A workspace rooted at a directory on the local disk.
#[derive(Debug, Clone, Default)]
pub struct LocalWorkspace {
    root: Option<PathBuf>,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// A host with no folder open.
    pub fn none() -> Self {
        Self { root: None }
    }
}

#[async_trait]
impl Workspace for LocalWorkspace {
    fn root_path(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    async fn find_file(&self, name: &str) -> bool {
        match &self.root {
            Some(root) => tokio::fs::try_exists(root.join(name))
                .await
                .unwrap_or(false),
            None => false,
        }
    }

    async fn count_files(&self, include: &str, exclude: &str) -> Option<usize> {
        let root = self.root.clone()?;
        let include = Pattern::new(include).ok()?;
        let exclude = Pattern::new(exclude).ok()?;

        tokio::task::spawn_blocking(move || count_matching(&root, &include, &exclude))
            .await
            .map_err(|error| tracing::warn!(%error, "file count task failed"))
            .ok()?
    }
}

fn count_matching(root: &Path, include: &Pattern, exclude: &Pattern) -> Option<usize> {
    if !root.is_dir() {
        return None;
    }

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        if entry.file_name() == ".git" {
            return false;
        }
        // A directory is pruned when any file inside it would be excluded.
        let probe = entry
            .path()
            .strip_prefix(root)
            .map(|rel| rel.join("_"))
            .unwrap_or_default();
        !exclude.matches_path(&probe)
    });

    let count = walker
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let Ok(rel) = entry.path().strip_prefix(root) else {
                return false;
            };
            include.matches_path(rel) && !exclude.matches_path(rel)
        })
        .count();
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_count_files_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("package.json"), "{}").unwrap();
        fs::write(root.join("src/index.js"), "").unwrap();
        fs::write(root.join("src/nested/util.ts"), "").unwrap();
        fs::write(root.join("Makefile"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();

        let workspace = LocalWorkspace::new(root);
        let count = workspace
            .count_files("**/*.*", "**/node_modules/**")
            .await;
        // Makefile has no extension, node_modules is excluded.
        assert_eq!(count, Some(3));
    }

    #[tokio::test]
    async fn test_count_files_without_root_is_unknown() {
        let workspace = LocalWorkspace::none();
        assert_eq!(workspace.count_files("**/*.*", "**/node_modules/**").await, None);
        assert!(!workspace.find_file("package.json").await);
    }

    #[tokio::test]
    async fn test_find_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        let workspace = LocalWorkspace::new(dir.path());
        assert!(workspace.find_file("pom.xml").await);
        assert!(!workspace.find_file("Gemfile").await);
    }
}
