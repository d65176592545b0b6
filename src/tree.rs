//! Expand/collapse state for nested named nodes, as shown in the code panel file list.
//!
//! Expansion is a set of folder names held next to the tree, never inside it. A folder
//! is expanded iff its name is in the set, so two folders sharing a name in different
//! parents expand together.

use crate::config::TreeConfig;
use crate::error::WorkspaceError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(alias = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    #[serde(default, alias = "modified")]
    pub dirty: bool,
}

impl TreeNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: NodeKind::File, children: Vec::new(), dirty: false }
    }

    pub fn folder(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self { name: name.into(), kind: NodeKind::Folder, children, dirty: false }
    }

    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

const ROOT_PARENT: &str = "/";

/// Validated forest of nodes; sibling names are unique at every level and only folders
/// have children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileTree {
    roots: Vec<TreeNode>,
}

impl FileTree {
    pub fn new(roots: Vec<TreeNode>) -> Result<Self, WorkspaceError> {
        check_siblings(ROOT_PARENT, &roots)?;
        Ok(Self { roots })
    }

    /// The project listing the code panel shows when no collaborator supplies one.
    pub fn sample_project() -> Self {
        Self {
            roots: vec![
                TreeNode::file("App.jsx").dirty(),
                TreeNode::folder(
                    "components/",
                    vec![
                        TreeNode::file("Scene3D.jsx"),
                        TreeNode::file("AvatarCustomizer.jsx").dirty(),
                        TreeNode::file("VSCodePanel.jsx"),
                    ],
                ),
                TreeNode::folder("hooks/", vec![TreeNode::file("useWebRTC.js"), TreeNode::file("useAvatar.js").dirty()]),
                TreeNode::file("package.json"),
            ],
        }
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn check_siblings(parent: &str, nodes: &[TreeNode]) -> Result<(), WorkspaceError> {
    let mut seen = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !seen.insert(node.name.as_str()) {
            return Err(WorkspaceError::DuplicateName { parent: parent.to_string(), name: node.name.clone() });
        }
        if node.children.is_empty() {
            continue;
        }
        let path = join_path(parent, &node.name);
        if !node.is_folder() {
            return Err(WorkspaceError::FileWithChildren(path));
        }
        check_siblings(&path, &node.children)?;
    }
    Ok(())
}

fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PARENT || parent.is_empty() {
        name.to_string()
    } else if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// A modified file found by [`TreeModel::dirty_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyFile {
    pub path: String,
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct TreeModel {
    tree: FileTree,
    expanded: BTreeSet<String>,
    default_expanded: BTreeSet<String>,
}

impl TreeModel {
    pub fn new<I, S>(tree: FileTree, default_expanded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_expanded: BTreeSet<String> = default_expanded.into_iter().map(Into::into).collect();
        Self { tree, expanded: default_expanded.clone(), default_expanded }
    }

    pub fn from_config(tree: FileTree, config: &TreeConfig) -> Self {
        Self::new(tree, config.default_expanded.iter().cloned())
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Swaps in a new listing while keeping the current expansion set.
    pub fn replace_tree(&mut self, tree: FileTree) {
        self.tree = tree;
    }

    pub fn is_expanded(&self, folder: &str) -> bool {
        self.expanded.contains(folder)
    }

    /// Returns the expansion state after the toggle.
    pub fn toggle(&mut self, folder: &str) -> bool {
        if self.expanded.remove(folder) {
            false
        } else {
            self.expanded.insert(folder.to_string());
            true
        }
    }

    pub fn expand(&mut self, folder: &str) {
        self.expanded.insert(folder.to_string());
    }

    pub fn collapse(&mut self, folder: &str) {
        self.expanded.remove(folder);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn reset_expansion(&mut self) {
        self.expanded = self.default_expanded.clone();
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    /// Depth-first pre-order walk of the rows currently on screen. Children of collapsed
    /// folders are skipped along with their whole subtree.
    pub fn visible_nodes(&self) -> VisibleNodes<'_> {
        VisibleNodes { stack: vec![(self.tree.roots.iter(), 0)], expanded: &self.expanded }
    }

    /// Every modified file in pre-order, regardless of expansion.
    pub fn dirty_files(&self) -> Vec<DirtyFile> {
        let mut out = Vec::new();
        collect_dirty(ROOT_PARENT, &self.tree.roots, 0, &mut out);
        out
    }
}

fn collect_dirty(parent: &str, nodes: &[TreeNode], depth: usize, out: &mut Vec<DirtyFile>) {
    for node in nodes {
        let path = join_path(parent, &node.name);
        if node.dirty && !node.is_folder() {
            out.push(DirtyFile { path: path.clone(), depth });
        }
        if !node.children.is_empty() {
            collect_dirty(&path, &node.children, depth + 1, out);
        }
    }
}

pub struct VisibleNodes<'a> {
    stack: Vec<(std::slice::Iter<'a, TreeNode>, usize)>,
    expanded: &'a BTreeSet<String>,
}

impl<'a> Iterator for VisibleNodes<'a> {
    type Item = (&'a TreeNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (iter, depth) = self.stack.last_mut()?;
            let depth = *depth;
            match iter.next() {
                Some(node) => {
                    if node.is_folder() && !node.children.is_empty() && self.expanded.contains(&node.name) {
                        self.stack.push((node.children.iter(), depth + 1));
                    }
                    return Some((node, depth));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
