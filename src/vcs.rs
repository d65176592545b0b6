//! Read-only repository metadata shown in the code panel. The version-control collaborator
//! produces it; nothing here talks to git.

use crate::error::WorkspaceError;
use crate::tree::{FileTree, TreeNode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryStatus {
    Active,
    Modified,
    #[default]
    Clean,
}

impl RepositoryStatus {
    pub fn label(self) -> &'static str {
        match self {
            RepositoryStatus::Active => "active",
            RepositoryStatus::Modified => "modified",
            RepositoryStatus::Clean => "clean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub branch: String,
    #[serde(default)]
    pub status: RepositoryStatus,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    /// Display string supplied by the collaborator, e.g. "2 hours ago".
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub repositories: Vec<RepositoryInfo>,
    #[serde(default)]
    pub commits: Vec<CommitInfo>,
    #[serde(default)]
    pub files: Vec<TreeNode>,
}

fn repo(name: &str, branch: &str, status: RepositoryStatus, language: &str) -> RepositoryInfo {
    RepositoryInfo { name: name.to_string(), branch: branch.to_string(), status, language: language.to_string() }
}

fn commit(hash: &str, message: &str, author: &str, time: &str) -> CommitInfo {
    CommitInfo { hash: hash.to_string(), message: message.to_string(), author: author.to_string(), time: time.to_string() }
}

impl SourceSnapshot {
    pub fn sample() -> Self {
        Self {
            repositories: vec![
                repo("metaworkspace-frontend", "main", RepositoryStatus::Active, "JavaScript"),
                repo("api-gateway", "feature/auth", RepositoryStatus::Modified, "Node.js"),
                repo("user-service", "main", RepositoryStatus::Clean, "Python"),
                repo("avatar-service", "develop", RepositoryStatus::Modified, "TypeScript"),
            ],
            commits: vec![
                commit("a1b2c3d", "Add avatar customization interface", "Alice", "2 hours ago"),
                commit("e4f5g6h", "Implement 3D workspace layout", "Bob", "4 hours ago"),
                commit("i7j8k9l", "Setup Three.js integration", "Charlie", "1 day ago"),
            ],
            files: FileTree::sample_project().roots().to_vec(),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading source snapshot {}", path.display()))?;
        let snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("Parsing source snapshot {}", path.display()))?;
        Ok(snapshot)
    }

    /// Validated file tree for the tree model.
    pub fn tree(&self) -> Result<FileTree, WorkspaceError> {
        FileTree::new(self.files.clone())
    }

    pub fn repository(&self, name: &str) -> Option<&RepositoryInfo> {
        self.repositories.iter().find(|repo| repo.name == name)
    }

    pub fn modified_repositories(&self) -> impl Iterator<Item = &RepositoryInfo> {
        self.repositories.iter().filter(|repo| repo.status == RepositoryStatus::Modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_tree_validates() {
        let snapshot = SourceSnapshot::sample();
        assert_eq!(snapshot.tree().expect("valid").roots().len(), 4);
        assert_eq!(snapshot.modified_repositories().count(), 2);
        assert_eq!(snapshot.repository("api-gateway").map(|r| r.branch.as_str()), Some("feature/auth"));
    }

    #[test]
    fn snapshot_loads_from_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snapshot.json");
        let json = r#"{
            "repositories": [{ "name": "core", "branch": "main", "status": "active" }],
            "files": [{ "name": "src/", "type": "folder", "children": [{ "name": "lib.rs", "type": "file" }] }]
        }"#;
        fs::write(&path, json).expect("write");
        let snapshot = SourceSnapshot::load_from_path(&path).expect("load");
        assert!(snapshot.commits.is_empty());
        assert_eq!(snapshot.repositories[0].status, RepositoryStatus::Active);
        assert_eq!(snapshot.tree().expect("valid").roots()[0].children.len(), 1);
    }
}
