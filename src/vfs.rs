use crate::errors::{FileOperation, IoError};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// An entry reported by [`FileStore::list_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    /// `/`-separated path relative to the store root.
    pub path: String,
    pub is_file: bool,
    /// Byte length for files, when the store knows it.
    pub size: Option<u64>,
}

/// The storage the builder writes into and the scanner reads from.
///
/// Paths are relative to the store root and always use `/` as separator.
/// The empty path names the root itself.
pub trait FileStore {
    fn exists(&self, path: &str) -> bool;

    fn is_directory(&self, path: &str) -> bool;

    /// Every entry below `root`, recursively, parents before children.
    fn list_all(&self, root: &str) -> Result<Vec<StoreEntry>, IoError>;

    /// Creates a single directory. Its parent must already exist.
    fn create_directory(&mut self, path: &str) -> Result<(), IoError>;

    /// Creates or truncates the file at `path`. Its parent must already exist.
    fn write(&mut self, path: &str, content: &str) -> Result<(), IoError>;

    fn read(&self, path: &str) -> Result<String, IoError>;
}

/// A [`FileStore`] over a directory of the real filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base: PathBuf,
}
impl LocalFileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Resolves a store path to a filesystem path under the base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.base.clone(), |acc, segment| acc.join(segment))
    }

    fn relative(&self, full: &Path) -> Option<String> {
        let relative = full.strip_prefix(&self.base).ok()?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(segments.join("/"))
    }
}
impl FileStore for LocalFileStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn is_directory(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn list_all(&self, root: &str) -> Result<Vec<StoreEntry>, IoError> {
        let start = self.resolve(root);
        let mut listed = Vec::new();

        for entry in WalkDir::new(&start).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(error) => {
                    let path = error.path().unwrap_or(&start).to_path_buf();
                    return Err(IoError::new(FileOperation::List, path, error.into()));
                }
            };

            let Some(path) = self.relative(entry.path()) else {
                continue;
            };
            let is_file = !entry.file_type().is_dir();
            let size = if is_file {
                entry.metadata().ok().map(|m| m.len())
            } else {
                None
            };

            listed.push(StoreEntry {
                path,
                is_file,
                size,
            });
        }

        Ok(listed)
    }

    fn create_directory(&mut self, path: &str) -> Result<(), IoError> {
        let full = self.resolve(path);
        match fs::create_dir(&full) {
            Ok(()) => Ok(()),
            // someone else created it in the meantime
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists && full.is_dir() => Ok(()),
            Err(error) => Err(IoError::new(FileOperation::Mkdir, full, error)),
        }
    }

    fn write(&mut self, path: &str, content: &str) -> Result<(), IoError> {
        let full = self.resolve(path);
        fs::write(&full, content).map_err(|error| IoError::new(FileOperation::Write, full, error))
    }

    fn read(&self, path: &str) -> Result<String, IoError> {
        let full = self.resolve(path);
        fs::read_to_string(&full).map_err(|error| IoError::new(FileOperation::Read, full, error))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VirtualEntry {
    Directory,
    File(String),
}

/// An in-memory [`FileStore`], handy for previews and tests.
///
/// Like a real filesystem it refuses to create entries under a missing parent.
/// A read-only store rejects every mutation with `PermissionDenied`.
#[derive(Debug, Clone, Default)]
pub struct VirtualFileStore {
    entries: BTreeMap<String, VirtualEntry>,
    read_only: bool,
}
impl VirtualFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Seeds a file, creating any missing parent directories.
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.seed_parents(path);
        self.entries
            .insert(path.to_string(), VirtualEntry::File(content.to_string()));
        self
    }

    /// Seeds a directory, creating any missing parent directories.
    pub fn with_directory(mut self, path: &str) -> Self {
        self.seed_parents(path);
        self.entries
            .insert(path.to_string(), VirtualEntry::Directory);
        self
    }

    fn seed_parents(&mut self, path: &str) {
        let mut parent = String::new();
        let segments: Vec<&str> = path.split('/').collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !parent.is_empty() {
                parent.push('/');
            }
            parent.push_str(segment);
            self.entries
                .entry(parent.clone())
                .or_insert(VirtualEntry::Directory);
        }
    }

    /// Paths of every directory, sorted.
    pub fn directories(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| **entry == VirtualEntry::Directory)
            .map(|(path, _)| path.as_str())
            .collect()
    }

    /// Paths of every file, sorted.
    pub fn files(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| matches!(entry, VirtualEntry::File(_)))
            .map(|(path, _)| path.as_str())
            .collect()
    }

    fn check_writable(&self, operation: FileOperation, path: &str) -> Result<(), IoError> {
        if self.read_only {
            return Err(IoError::new(
                operation,
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "store is read-only"),
            ));
        }
        match path.rsplit_once('/') {
            Some((parent, _)) if !self.is_directory(parent) => Err(IoError::new(
                operation,
                path,
                io::Error::new(io::ErrorKind::NotFound, "parent directory does not exist"),
            )),
            _ => Ok(()),
        }
    }
}
impl FileStore for VirtualFileStore {
    fn exists(&self, path: &str) -> bool {
        path.is_empty() || self.entries.contains_key(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        path.is_empty() || self.entries.get(path) == Some(&VirtualEntry::Directory)
    }

    fn list_all(&self, root: &str) -> Result<Vec<StoreEntry>, IoError> {
        if !self.is_directory(root) {
            return Err(IoError::new(
                FileOperation::List,
                root,
                io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            ));
        }
        let prefix = if root.is_empty() {
            String::new()
        } else {
            format!("{}/", root)
        };

        Ok(self
            .entries
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|(path, entry)| StoreEntry {
                path: path.clone(),
                is_file: matches!(entry, VirtualEntry::File(_)),
                size: match entry {
                    VirtualEntry::File(content) => Some(content.len() as u64),
                    VirtualEntry::Directory => None,
                },
            })
            .collect())
    }

    fn create_directory(&mut self, path: &str) -> Result<(), IoError> {
        self.check_writable(FileOperation::Mkdir, path)?;
        match self.entries.get(path) {
            Some(VirtualEntry::Directory) => Ok(()),
            Some(VirtualEntry::File(_)) => Err(IoError::new(
                FileOperation::Mkdir,
                path,
                io::Error::new(io::ErrorKind::AlreadyExists, "a file exists at this path"),
            )),
            None => {
                self.entries
                    .insert(path.to_string(), VirtualEntry::Directory);
                Ok(())
            }
        }
    }

    fn write(&mut self, path: &str, content: &str) -> Result<(), IoError> {
        self.check_writable(FileOperation::Write, path)?;
        if self.is_directory(path) {
            return Err(IoError::new(
                FileOperation::Write,
                path,
                io::Error::new(io::ErrorKind::AlreadyExists, "a directory exists at this path"),
            ));
        }
        self.entries
            .insert(path.to_string(), VirtualEntry::File(content.to_string()));
        Ok(())
    }

    fn read(&self, path: &str) -> Result<String, IoError> {
        match self.entries.get(path) {
            Some(VirtualEntry::File(content)) => Ok(content.clone()),
            _ => Err(IoError::new(
                FileOperation::Read,
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            )),
        }
    }
}
