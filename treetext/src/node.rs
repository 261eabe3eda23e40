use crate::entry::PathEntry;
use std::cmp::Ordering;

/// A node of an in-memory directory tree.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureNode {
    Directory(DirectoryNode),
    File(FileNode),
}

impl StructureNode {
    pub fn name(&self) -> &str {
        match self {
            StructureNode::Directory(dir) => &dir.name,
            StructureNode::File(file) => &file.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            StructureNode::Directory(dir) => &dir.path,
            StructureNode::File(file) => &file.path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, StructureNode::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            StructureNode::Directory(dir) => Some(dir),
            StructureNode::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            StructureNode::Directory(_) => None,
            StructureNode::File(file) => Some(file),
        }
    }
}

/// Directories first, then files, both case-insensitive alphabetical.
pub fn display_order(a: &StructureNode, b: &StructureNode) -> Ordering {
    match (a.is_directory(), b.is_directory()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    /// `None` when the content has not been read.
    pub content: Option<String>,
    pub size: Option<u64>,
}

impl FileNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: None,
            size: None,
        }
    }

    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.size = size;
        self
    }

    /// Text after the last dot, empty when there is none.
    pub fn extension(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        }
    }

    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

/// A directory exclusively owning its children. Child names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryNode {
    pub name: String,
    pub path: String,
    children: Vec<StructureNode>,
}

impl DirectoryNode {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            children: Vec::new(),
        }
    }

    /// Rebuilds a tree from a flat parse result. Entries whose ancestor is a file are dropped.
    pub fn from_entries(name: impl Into<String>, entries: &[PathEntry]) -> Self {
        let mut root = DirectoryNode::new(name, "");
        for entry in entries {
            let leaf = root.insert_path(&entry.path, entry.is_file(), None);
            if let Some(StructureNode::File(file)) = leaf {
                file.content = entry.content.clone();
            }
        }
        root
    }

    /// Adds `child` unless a sibling with the same name exists; returns the node stored under that name.
    pub fn add_child(&mut self, child: StructureNode) -> &mut StructureNode {
        let index = match self.position(child.name()) {
            Some(index) => index,
            None => {
                self.children.push(child);
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    pub fn find_child(&self, name: &str) -> Option<&StructureNode> {
        self.children.iter().find(|child| child.name() == name)
    }

    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut StructureNode> {
        self.children.iter_mut().find(|child| child.name() == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.name() == name)
    }

    /// Children in display order. The stored order is left untouched.
    pub fn children(&self) -> Vec<&StructureNode> {
        let mut sorted: Vec<&StructureNode> = self.children.iter().collect();
        sorted.sort_by(|a, b| display_order(a, b));
        sorted
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// All directories below this one, at any depth.
    pub fn directory_count(&self) -> usize {
        self.count(|node| node.is_directory())
    }

    /// All files below this one, at any depth.
    pub fn file_count(&self) -> usize {
        self.count(|node| !node.is_directory())
    }

    fn count(&self, predicate: impl Fn(&StructureNode) -> bool) -> usize {
        let mut total = 0;
        let mut pending: Vec<&DirectoryNode> = vec![self];
        while let Some(dir) = pending.pop() {
            for child in &dir.children {
                if predicate(child) {
                    total += 1;
                }
                if let StructureNode::Directory(sub) = child {
                    pending.push(sub);
                }
            }
        }
        total
    }

    /// Inserts `path` (relative to this node, `/`-separated) and returns the leaf.
    ///
    /// Intermediate directories are created as needed. Returns `None` when a segment
    /// on the way is already taken by a file, or when the path is empty.
    pub fn insert_path(
        &mut self,
        path: &str,
        is_file: bool,
        size: Option<u64>,
    ) -> Option<&mut StructureNode> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (leaf_name, parents) = segments.split_last()?;

        let mut current = self;
        for (i, segment) in parents.iter().enumerate() {
            let sub_path = join_path(&current.path, segment);
            let child = current.add_child(StructureNode::Directory(DirectoryNode::new(
                *segment,
                sub_path,
            )));
            current = match child {
                StructureNode::Directory(dir) => dir,
                StructureNode::File(_) => return None,
            };
            debug_assert_eq!(current.path, segments[..=i].join("/"));
        }

        let leaf_path = join_path(&current.path, leaf_name);
        let leaf = if is_file {
            StructureNode::File(FileNode::new(*leaf_name, leaf_path).with_size(size))
        } else {
            StructureNode::Directory(DirectoryNode::new(*leaf_name, leaf_path))
        };
        Some(current.add_child(leaf))
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DirectoryNode {
        let mut root = DirectoryNode::new("project", "");
        root.insert_path("src/App.php", true, Some(12));
        root.insert_path("src/Model", false, None);
        root.insert_path("tests", false, None);
        root.insert_path("README.md", true, None);
        root
    }

    #[test]
    fn test_insert_path_synthesizes_parents() {
        let root = sample();
        let src = root.find_child("src").and_then(|n| n.as_directory()).unwrap();

        assert_eq!(src.path, "src");
        assert_eq!(src.child_count(), 2);
        let app = src.find_child("App.php").and_then(|n| n.as_file()).unwrap();
        assert_eq!(app.path, "src/App.php");
        assert_eq!(app.size, Some(12));
    }

    #[test]
    fn test_counts_are_recursive() {
        let mut root = sample();

        assert_eq!(root.directory_count(), 3);
        assert_eq!(root.file_count(), 2);

        root.insert_path("src/Model/User.php", true, None);
        assert_eq!(root.file_count(), 3);
    }

    #[test]
    fn test_children_sorted_directories_first() {
        let mut root = DirectoryNode::new("r", "");
        root.insert_path("zeta.txt", true, None);
        root.insert_path("Beta", false, None);
        root.insert_path("alpha.txt", true, None);
        root.insert_path("alpha", false, None);

        let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "alpha.txt", "zeta.txt"]);
    }

    #[test]
    fn test_duplicate_names_are_merged() {
        let mut root = DirectoryNode::new("r", "");
        root.insert_path("src", false, None);
        root.insert_path("src/lib.rs", true, None);
        root.insert_path("src", false, None);

        assert_eq!(root.child_count(), 1);
        assert_eq!(root.file_count(), 1);
    }

    #[test]
    fn test_file_blocks_descent() {
        let mut root = DirectoryNode::new("r", "");
        root.insert_path("notes", true, None);

        assert!(root.insert_path("notes/inner.txt", true, None).is_none());
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn test_file_extension_and_stem() {
        let file = FileNode::new("archive.tar.gz", "archive.tar.gz");
        assert_eq!(file.extension(), "gz");
        assert_eq!(file.stem(), "archive.tar");

        let hidden = FileNode::new(".env", ".env");
        assert_eq!(hidden.extension(), "");
        assert_eq!(hidden.stem(), ".env");
    }
}
