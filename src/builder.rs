use crate::{errors::IoError, vfs::FileStore};
use miette::Diagnostic;
use thiserror::Error;
use treetext::{EntryKind, PathEntry};

#[derive(Debug, Error, Diagnostic)]
pub enum CreationError {
    #[error("Failed to create directory '{path}'")]
    #[diagnostic(
        code(treeform::builder::directory),
        help("Check that the target is writable and that no file is in the way")
    )]
    Directory {
        path: String,
        #[source]
        source: IoError,
    },

    #[error("Failed to create file '{path}'")]
    #[diagnostic(
        code(treeform::builder::file),
        help("Check that the target is writable and that no directory is in the way")
    )]
    File {
        path: String,
        #[source]
        source: IoError,
    },
}
impl CreationError {
    pub fn path(&self) -> &str {
        match self {
            CreationError::Directory { path, .. } | CreationError::File { path, .. } => path,
        }
    }
}

/// What a build created, or would have created in a dry run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub created_directories: Vec<String>,
    pub created_files: Vec<String>,
    pub dry_run: bool,
}
impl BuildReport {
    pub fn total(&self) -> usize {
        self.created_directories.len() + self.created_files.len()
    }
}

/// Materializes parsed entries into `store`.
///
/// Entries are handled in the order given, which for parser output puts every
/// directory before its descendants. Existing directories are accepted as is,
/// existing files are overwritten. The first failure aborts the build and
/// leaves whatever was already created in place.
pub fn build<S: FileStore + ?Sized>(
    entries: &[PathEntry],
    store: &mut S,
    dry_run: bool,
) -> Result<BuildReport, CreationError> {
    let mut report = BuildReport {
        dry_run,
        ..BuildReport::default()
    };

    for entry in entries {
        match entry.kind {
            EntryKind::Directory => {
                if !dry_run {
                    ensure_directory(store, &entry.path).map_err(|source| {
                        CreationError::Directory {
                            path: entry.path.clone(),
                            source,
                        }
                    })?;
                    log::debug!("created directory {}", entry.path);
                }
                report.created_directories.push(entry.path.clone());
            }
            EntryKind::File => {
                if !dry_run {
                    write_file(store, entry).map_err(|source| CreationError::File {
                        path: entry.path.clone(),
                        source,
                    })?;
                    log::debug!("wrote file {}", entry.path);
                }
                report.created_files.push(entry.path.clone());
            }
        }
    }

    Ok(report)
}

fn write_file<S: FileStore + ?Sized>(store: &mut S, entry: &PathEntry) -> Result<(), IoError> {
    if let Some(parent) = entry.parent() {
        ensure_directory(store, parent)?;
    }
    store.write(&entry.path, entry.content.as_deref().unwrap_or_default())
}

/// Creates `path` and every missing ancestor, walking from the root down.
pub fn ensure_directory<S: FileStore + ?Sized>(store: &mut S, path: &str) -> Result<(), IoError> {
    let mut current = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);

        if !store.is_directory(&current) {
            store.create_directory(&current)?;
        }
    }
    Ok(())
}
