//! The file tree built from archive entries
//!
//! Nodes live in an arena owned by the [`FileTree`]. A node refers to its
//! parent and children by [`NodeId`], so dropping the tree drops every node
//! and there are no reference cycles to break.

use crate::{error::TreeError, extract::ArchiveEntry};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::ops::Index;

/// Identifies a node within the [`FileTree`] that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single file or directory of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeNode {
    name: String,
    is_directory: bool,
    size_bytes: Option<u64>,
    modified_at: Option<DateTime<Utc>>,
    parent: Option<NodeId>,
    children: IndexMap<String, NodeId>,
}

impl FileTreeNode {
    fn new(
        name: &str,
        parent: Option<NodeId>,
        is_directory: bool,
        size_bytes: Option<u64>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            is_directory,
            size_bytes,
            modified_at,
            parent,
            children: IndexMap::new(),
        }
    }

    /// The last path segment of this node, empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Size as reported by the listing, `None` for directories that were only
    /// implied by deeper paths
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    /// The containing directory, `None` for the root
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they were first inserted
    pub fn children(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    /// Look up a direct child by name
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Hierarchical view of the entries of one archive
#[derive(Debug, Clone)]
pub struct FileTree {
    nodes: Vec<FileTreeNode>,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree {
    const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the root directory
    pub fn new() -> Self {
        Self {
            nodes: vec![FileTreeNode::new("", None, true, None, None)],
        }
    }

    /// Build a tree from entries, skipping (and logging) entries that cannot
    /// be inserted.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ArchiveEntry>,
    {
        let mut tree = Self::new();
        for entry in entries {
            if let Err(err) = tree.insert_entry(&entry) {
                tracing::warn!("skipping archive entry: {err}");
            }
        }
        tree
    }

    /// The root directory
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Insert a path, creating missing intermediate directories.
    ///
    /// Inserting an existing path overwrites its attributes. Fails when the
    /// path has no segments or when it runs through a file.
    pub fn insert(
        &mut self,
        path: &str,
        is_directory: bool,
        size_bytes: Option<u64>,
        modified_at: Option<DateTime<Utc>>,
    ) -> Result<NodeId, TreeError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, intermediate)) = segments.split_last() else {
            return Err(TreeError::invalid_path(path));
        };

        let mut current = Self::ROOT;
        for segment in intermediate {
            current = match self[current].child(segment) {
                Some(child) if self[child].is_directory => child,
                Some(_) => return Err(TreeError::conflicting_entry(path, *segment)),
                None => self.push_child(current, segment, true, None, None),
            };
        }

        match self[current].child(last) {
            Some(existing) => {
                let node = &mut self.nodes[existing.0];
                if !is_directory && !node.is_leaf() {
                    return Err(TreeError::conflicting_entry(path, *last));
                }
                node.is_directory = is_directory;
                node.size_bytes = size_bytes;
                node.modified_at = modified_at;
                Ok(existing)
            }
            None => Ok(self.push_child(current, last, is_directory, size_bytes, modified_at)),
        }
    }

    /// Insert an extracted archive entry
    pub fn insert_entry(&mut self, entry: &ArchiveEntry) -> Result<NodeId, TreeError> {
        self.insert(
            &entry.path,
            entry.is_directory,
            entry.size_bytes,
            entry.modified_at,
        )
    }

    fn push_child(
        &mut self,
        parent: NodeId,
        name: &str,
        is_directory: bool,
        size_bytes: Option<u64>,
        modified_at: Option<DateTime<Utc>>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(FileTreeNode::new(
            name,
            Some(parent),
            is_directory,
            size_bytes,
            modified_at,
        ));
        self.nodes[parent.0].children.insert(name.to_string(), id);
        id
    }

    /// The node behind an id
    pub fn get(&self, id: NodeId) -> Option<&FileTreeNode> {
        self.nodes.get(id.0)
    }

    /// The entry point for rendering: the top level entries of the archive
    pub fn root_children(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        self[Self::ROOT].children()
    }

    /// Follow a slash separated path from the root
    pub fn find(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(Self::ROOT, |current, segment| self[current].child(segment))
    }

    /// Number of path segments from the root down to the node, 0 for the root
    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self[id].parent, |&parent| self[parent].parent).count()
    }

    /// The slash separated path of a node, without a trailing slash
    pub fn path_of(&self, id: NodeId) -> String {
        let mut segments: Vec<&str> =
            std::iter::successors(Some(id), |&node| self[node].parent)
                .filter(|&node| node != Self::ROOT)
                .map(|node| self[node].name())
                .collect();
        segments.reverse();
        segments.join("/")
    }

    /// Number of nodes, the root not included
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Depth first, pre-order traversal in insertion order. The root is not
    /// yielded.
    pub fn walk(&self) -> Walk<'_> {
        let mut stack: Vec<NodeId> = self.root_children().collect();
        stack.reverse();
        Walk { tree: self, stack }
    }
}

impl Index<NodeId> for FileTree {
    type Output = FileTreeNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.0]
    }
}

/// Iterator returned by [`FileTree::walk`]
pub struct Walk<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.tree[id].children.values().rev();
        self.stack.extend(children);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rstest::rstest;

    fn names(tree: &FileTree, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| tree[id].name().to_string()).collect()
    }

    #[test]
    fn test_insert_creates_intermediate_directories() {
        let mut tree = FileTree::new();
        let file = tree.insert("a/b/c.txt", false, Some(3), None).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.depth(file), 3);
        assert_eq!(tree.path_of(file), "a/b/c.txt");

        let a = tree.find("a").unwrap();
        assert!(tree[a].is_directory());
        assert_eq!(tree[a].size_bytes(), None);
        assert_eq!(tree[file].parent(), tree.find("a/b"));
    }

    #[rstest]
    #[case("file.txt", 1)]
    #[case("dir/", 1)]
    #[case("dir/file.txt", 2)]
    #[case("/leading/and/trailing/", 3)]
    #[case("a//double///slashes", 3)]
    fn test_depth_equals_segment_count(#[case] path: &str, #[case] segments: usize) {
        let mut tree = FileTree::new();
        let modified = Utc.with_ymd_and_hms(2018, 12, 29, 0, 0, 0).unwrap();
        let id = tree.insert(path, false, Some(42), Some(modified)).unwrap();

        assert_eq!(tree.depth(id), segments);
        assert_eq!(tree.find(path), Some(id));
        let node = &tree[id];
        assert!(!node.is_directory());
        assert_eq!(node.size_bytes(), Some(42));
        assert_eq!(node.modified_at(), Some(modified));
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("///")]
    fn test_invalid_path(#[case] path: &str) {
        let mut tree = FileTree::new();
        assert_matches!(
            tree.insert(path, false, None, None),
            Err(TreeError::InvalidPath { .. })
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn test_reinsertion_updates_in_place() {
        let mut tree = FileTree::new();
        let first = tree.insert("dir/file", false, Some(1), None).unwrap();
        let modified = Utc.with_ymd_and_hms(2020, 1, 13, 19, 38, 0).unwrap();
        let second = tree.insert("dir/file", false, Some(2), Some(modified)).unwrap();

        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
        let dir = tree.find("dir").unwrap();
        assert_eq!(tree[dir].children().len(), 1);
        assert_eq!(tree[second].size_bytes(), Some(2));
        assert_eq!(tree[second].modified_at(), Some(modified));
    }

    #[test]
    fn test_explicit_directory_entry_after_implied_one() {
        let mut tree = FileTree::new();
        tree.insert("dir/file", false, Some(1), None).unwrap();
        let dir = tree.insert("dir/", true, Some(0), None).unwrap();

        assert_eq!(tree[dir].size_bytes(), Some(0));
        assert_eq!(tree[dir].children().len(), 1);
    }

    #[test]
    fn test_path_through_file_conflicts() {
        let mut tree = FileTree::new();
        tree.insert("a/file", false, Some(1), None).unwrap();

        assert_eq!(
            tree.insert("a/file/nested", false, None, None),
            Err(TreeError::conflicting_entry("a/file/nested", "file"))
        );
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_directory_with_children_cannot_become_file() {
        let mut tree = FileTree::new();
        tree.insert("a/b", false, None, None).unwrap();

        assert_matches!(
            tree.insert("a", false, None, None),
            Err(TreeError::ConflictingEntry { .. })
        );
        let a = tree.find("a").unwrap();
        assert!(tree[a].is_directory());
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = FileTree::new();
        for path in ["zeta", "alpha/two", "mid", "alpha/one", "zeta"] {
            tree.insert(path, false, None, None).unwrap();
        }
        assert_eq!(names(&tree, tree.root_children()), ["zeta", "alpha", "mid"]);
        let alpha = tree.find("alpha").unwrap();
        assert_eq!(names(&tree, tree[alpha].children()), ["two", "one"]);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let mut tree = FileTree::new();
        tree.insert("a/x", false, None, None).unwrap();
        tree.insert("b", false, None, None).unwrap();
        tree.insert("a/y/z", false, None, None).unwrap();

        let paths: Vec<_> = tree.walk().map(|id| tree.path_of(id)).collect();
        assert_eq!(paths, ["a", "a/x", "a/y", "a/y/z", "b"]);
    }

    #[test]
    fn test_from_entries_skips_conflicts() {
        let entries = vec![
            ArchiveEntry {
                path: "file".to_string(),
                is_directory: false,
                size_bytes: Some(1),
                modified_at: None,
            },
            ArchiveEntry {
                path: "file/child".to_string(),
                is_directory: false,
                size_bytes: Some(1),
                modified_at: None,
            },
            ArchiveEntry {
                path: "other".to_string(),
                is_directory: false,
                size_bytes: Some(1),
                modified_at: None,
            },
        ];
        let tree = FileTree::from_entries(entries);
        assert_eq!(names(&tree, tree.root_children()), ["file", "other"]);
    }

    #[test]
    fn test_root() {
        let tree = FileTree::default();
        let root = &tree[tree.root()];
        assert!(root.is_directory());
        assert_eq!(root.name(), "");
        assert_eq!(root.parent(), None);
        assert!(tree.get(NodeId(1)).is_none());
    }
}
