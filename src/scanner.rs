use crate::{errors::IoError, vfs::FileStore};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use thiserror::Error;
use treetext::DirectoryNode;

pub const DEFAULT_EXCLUDES: &[&str] = &[
    "vendor",
    "node_modules",
    ".git",
    ".DS_Store",
    "*.tmp",
    "*.log",
];

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    #[error("Unable to list '{root}'")]
    #[diagnostic(
        code(treeform::scanner::list),
        help("Make sure the directory exists and is readable")
    )]
    List {
        root: String,
        #[source]
        source: IoError,
    },
}

/// Patterns deciding which entries a scan leaves out.
///
/// A pattern excludes a path when it equals the path, equals its basename,
/// is a directory prefix of the path, or matches path or basename as a glob.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    globs: GlobSet,
}
impl ExcludeSet {
    /// Invalid glob patterns still take part in the literal checks and are reported.
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        let mut invalid = Vec::new();

        for pattern in &patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(_) => invalid.push(pattern.clone()),
            }
        }
        if !invalid.is_empty() {
            log::warn!("invalid exclude pattern(s), glob matching skipped: {:?}", invalid);
        }

        let globs = builder.build().unwrap_or_else(|error| {
            log::warn!("failed to build exclude set: {}", error);
            GlobSet::empty()
        });

        Self { patterns, globs }
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_EXCLUDES.iter().copied())
    }

    pub fn empty() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        let basename = path.rsplit('/').next().unwrap_or(path);

        self.patterns.iter().any(|pattern| {
            path == pattern
                || basename == pattern
                || path
                    .strip_prefix(pattern.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        }) || self.globs.is_match(path)
            || self.globs.is_match(basename)
    }

    /// True when `path` or one of its ancestor directories is excluded.
    pub fn covers(&self, path: &str) -> bool {
        path.match_indices('/')
            .any(|(end, _)| self.is_excluded(&path[..end]))
            || self.is_excluded(path)
    }
}
impl Default for ExcludeSet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Entries with more separators than this, relative to the scan root, are skipped.
    pub max_depth: usize,
    pub excludes: ExcludeSet,
    /// Name for the root node. Falls back to the basename of the scan root, then `root`.
    pub root_name: Option<String>,
}
impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            excludes: ExcludeSet::defaults(),
            root_name: None,
        }
    }
}

/// Reads everything under `root` in `store` into a directory tree.
///
/// Node paths are relative to `root`. Directories implied by a deeper entry
/// are synthesized even when the listing does not report them.
pub fn scan<S: FileStore + ?Sized>(
    store: &S,
    root: &str,
    options: &ScanOptions,
) -> Result<DirectoryNode, ScanError> {
    let root = root.trim_matches('/');
    let listing = store.list_all(root).map_err(|source| ScanError::List {
        root: root.to_string(),
        source,
    })?;

    let name = options
        .root_name
        .clone()
        .or_else(|| root.rsplit('/').next().filter(|n| !n.is_empty()).map(str::to_string))
        .unwrap_or_else(|| "root".to_string());
    let mut tree = DirectoryNode::new(name, "");

    let prefix = format!("{}/", root);
    for item in listing {
        let relative = if root.is_empty() {
            item.path.as_str()
        } else {
            match item.path.strip_prefix(&prefix) {
                Some(relative) => relative,
                None => continue,
            }
        };

        if options.excludes.covers(relative) {
            log::debug!("excluded {}", relative);
            continue;
        }

        let depth = relative.matches('/').count();
        if depth > options.max_depth {
            log::debug!("skipped {} beyond depth {}", relative, options.max_depth);
            continue;
        }

        if tree.insert_path(relative, item.is_file, item.size).is_none() {
            log::warn!("skipped {}: a file is in the way", relative);
        }
    }

    Ok(tree)
}
