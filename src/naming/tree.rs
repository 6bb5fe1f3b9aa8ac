// CLASSIFICATION: COMMUNITY
// Filename: tree.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-19

//! In-memory directory tree of the naming server.
//!
//! Every node is a directory or a file, never both. Directories hold their
//! children by component name; files hold the stub pair of the storage
//! server that owns their bytes. The root always exists and is always a
//! directory.

use std::collections::BTreeMap;

use comb_wire::Path;
use log::warn;

use crate::proto::storage::{StorageAccess, StorageControl};
use crate::rmi::Stub;

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Directory {
        children: BTreeMap<String, Node>,
    },
    File {
        storage: Stub<StorageAccess>,
        command: Stub<StorageControl>,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    kind: NodeKind,
}

impl Node {
    fn directory() -> Self {
        Self {
            kind: NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }

    fn file(storage: Stub<StorageAccess>, command: Stub<StorageControl>) -> Self {
        Self {
            kind: NodeKind::File { storage, command },
        }
    }

    fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    fn child(&self, name: &str) -> Option<&Node> {
        match &self.kind {
            NodeKind::Directory { children } => children.get(name),
            NodeKind::File { .. } => None,
        }
    }
}

/// The namespace: a tree of directories and storage-bound files.
#[derive(Debug, Default)]
pub struct DirectoryTree {
    root: Node,
}

impl Default for Node {
    fn default() -> Self {
        Node::directory()
    }
}

impl DirectoryTree {
    /// An empty namespace: just the root directory.
    pub fn new() -> Self {
        Self {
            root: Node::directory(),
        }
    }

    fn node(&self, path: &Path) -> Option<&Node> {
        let mut node = &self.root;
        for component in path.iter() {
            node = node.child(component)?;
        }
        Some(node)
    }

    /// Whether a node exists at `path`. The root always exists.
    pub fn path_exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    /// Whether the node at `path` is a directory; `None` if absent.
    pub fn is_directory(&self, path: &Path) -> Option<bool> {
        self.node(path).map(Node::is_directory)
    }

    /// Whether the parent of `path` exists and is a directory. Trivially
    /// true for the root.
    pub fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Err(_) => true,
            Ok(parent) => self.is_directory(&parent).unwrap_or(false),
        }
    }

    /// Child names of the directory at `path`; `None` if `path` is absent or
    /// is a file.
    pub fn list(&self, path: &Path) -> Option<Vec<String>> {
        match &self.node(path)?.kind {
            NodeKind::Directory { children } => Some(children.keys().cloned().collect()),
            NodeKind::File { .. } => None,
        }
    }

    /// Insert a file node at `path`, creating intermediate directories as
    /// needed and binding it to the given stub pair.
    ///
    /// Returns `false` without touching the tree if `path` is the root or if
    /// the parent chain passes through an existing file. An existing node at
    /// `path` itself is replaced: the last registrant wins.
    pub fn insert_file(
        &mut self,
        path: &Path,
        storage: Stub<StorageAccess>,
        command: Stub<StorageControl>,
    ) -> bool {
        self.insert(path, Node::file(storage, command))
    }

    /// Insert a directory node at `path`, creating intermediate directories
    /// as needed. Same refusal rules as [`Self::insert_file`].
    pub fn insert_directory(&mut self, path: &Path) -> bool {
        self.insert(path, Node::directory())
    }

    fn insert(&mut self, path: &Path, leaf: Node) -> bool {
        let Ok(name) = path.last() else {
            return false;
        };
        let name = name.to_owned();
        let mut node = &mut self.root;
        for component in path.parent().expect("non-root path has a parent").iter() {
            let NodeKind::Directory { children } = &mut node.kind else {
                warn!("refusing to insert {path}: ancestor {component:?} is a file");
                return false;
            };
            node = children.entry(component.to_owned()).or_default();
        }
        let NodeKind::Directory { children } = &mut node.kind else {
            warn!("refusing to insert {path}: parent is a file");
            return false;
        };
        children.insert(name, leaf);
        true
    }

    /// Remove the node at `path` together with its subtree. The root cannot
    /// be removed. Returns whether anything was removed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let Ok(name) = path.last() else {
            return false;
        };
        let parent = path.parent().expect("non-root path has a parent");
        let mut node = &mut self.root;
        for component in parent.iter() {
            let NodeKind::Directory { children } = &mut node.kind else {
                return false;
            };
            match children.get_mut(component) {
                Some(child) => node = child,
                None => return false,
            }
        }
        match &mut node.kind {
            NodeKind::Directory { children } => children.remove(name).is_some(),
            NodeKind::File { .. } => false,
        }
    }

    /// Storage handle bound to the file at `path`.
    pub fn storage_for(&self, path: &Path) -> Option<Stub<StorageAccess>> {
        match &self.node(path)?.kind {
            NodeKind::File { storage, .. } => Some(*storage),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Command handle bound to the file at `path`.
    pub fn command_for(&self, path: &Path) -> Option<Stub<StorageControl>> {
        match &self.node(path)?.kind {
            NodeKind::File { command, .. } => Some(*command),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Distinct command handles bound to files inside the subtree at `path`,
    /// including `path` itself when it is a file. Empty if `path` is absent
    /// or an empty directory.
    pub fn commands_under(&self, path: &Path) -> Vec<Stub<StorageControl>> {
        let mut found = Vec::new();
        if let Some(node) = self.node(path) {
            collect_commands(node, &mut found);
        }
        found
    }
}

fn collect_commands(node: &Node, found: &mut Vec<Stub<StorageControl>>) {
    match &node.kind {
        NodeKind::File { command, .. } => {
            if !found.contains(command) {
                found.push(*command);
            }
        }
        NodeKind::Directory { children } => {
            for child in children.values() {
                collect_commands(child, found);
            }
        }
    }
}
