/// Whether a parsed line names a directory or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single line of a tree sketch, resolved to its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Forward-slash joined path, no leading or trailing slash.
    pub path: String,
    pub kind: EntryKind,
    /// Basename with trailing separators and inline content removed.
    pub name: String,
    /// Number of ancestors, i.e. `path` segments minus one.
    pub depth: usize,
    /// Content to write for files. `None` means the extension has no default.
    pub content: Option<String>,
}

impl PathEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Parent path, or `None` for top-level entries.
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(parent, _)| parent)
    }
}
