use std::path::Path;

use codepal_types::ContextSnapshot;

use crate::HostServices;

/// Dependency manifests probed at the workspace root, in priority order.
pub const DEPENDENCY_MANIFESTS: &[&str] = &[
    "package.json",
    "pom.xml",
    "build.gradle",
    "requirements.txt",
    "Gemfile",
    "composer.json",
    "Cargo.toml",
    "go.mod",
];

/// Well-known configuration entries reported in the project summary.
pub const CONFIG_ENTRIES: &[&str] = &[
    "tsconfig.json",
    ".eslintrc",
    "jest.config.js",
    "webpack.config.js",
    "babel.config.js",
    "vite.config.js",
    "tailwind.config.js",
    "next.config.js",
    "nuxt.config.js",
    "angular.json",
    "pytest.ini",
    ".gitlab-ci.yml",
    ".github/workflows",
    "Dockerfile",
];

const COUNT_INCLUDE: &str = "**/*.*";
const COUNT_EXCLUDE: &str = "**/node_modules/**";

/// Captures the editor and workspace state at the moment of a request.
#[derive(Clone)]
pub struct SnapshotBuilder {
    host: HostServices,
}

impl SnapshotBuilder {
    pub fn new(host: HostServices) -> Self {
        Self { host }
    }

    /// Never fails: whatever cannot be read is left at its placeholder.
    pub async fn build(&self) -> ContextSnapshot {
        let mut snapshot = match self.host.editor.active_document().await {
            Some(doc) => ContextSnapshot {
                file_path: Some(doc.path),
                language_id: doc.language_id,
                full_text: doc.full_text,
                selected_text: doc.selection_text,
                ..ContextSnapshot::empty()
            },
            None => ContextSnapshot::empty(),
        };

        if let Some(root) = self.host.workspace.root_path() {
            if let Some((name, text)) = self.find_dependency_manifest(&root).await {
                snapshot.dependency_manifest_name = Some(name);
                snapshot.dependency_manifest_text = text;
            }
            snapshot.project_summary = self.project_summary(&root).await;
        }

        tracing::debug!(
            file = snapshot.display_file_name(),
            language = %snapshot.language_id,
            selection_bytes = snapshot.selected_text.len(),
            manifest = ?snapshot.dependency_manifest_name,
            "built context snapshot"
        );
        snapshot
    }

    /// First manifest present at `root`. One that exists but cannot be read
    /// is skipped and probing moves on.
    async fn find_dependency_manifest(&self, root: &Path) -> Option<(String, String)> {
        for name in DEPENDENCY_MANIFESTS {
            let path = root.join(name);
            if !self.host.fs.exists(&path).await {
                continue;
            }
            match self.host.fs.read_to_string(&path).await {
                Ok(text) => return Some((name.to_string(), text)),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable dependency manifest");
                }
            }
        }
        None
    }

    async fn project_summary(&self, root: &Path) -> String {
        let mut detected = Vec::new();
        for entry in CONFIG_ENTRIES {
            let path = root.join(entry);
            if !self.host.fs.exists(&path).await {
                continue;
            }
            if self.host.fs.is_dir(&path).await {
                detected.push(format!("uses {}", entry));
            } else {
                detected.push(format!("contains {}", entry));
            }
        }

        let folder = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());
        let configuration = if detected.is_empty() {
            "No standard configuration detected".to_string()
        } else {
            detected.join(", ")
        };
        let file_count = self
            .host
            .workspace
            .count_files(COUNT_INCLUDE, COUNT_EXCLUDE)
            .await
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        format!(
            "Project information:\n- Root folder: {}\n- Detected configuration: {}\n- File count: {}",
            folder, configuration, file_count
        )
    }
}
