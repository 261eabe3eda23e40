use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// The store operation that failed, used to word [`IoError`].
#[derive(Debug, Error, Diagnostic, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    #[error("reading a file")]
    Read,
    #[error("writing a file")]
    Write,
    #[error("creating a directory")]
    Mkdir,
    #[error("listing a directory")]
    List,
}

#[derive(Debug, Error, Diagnostic)]
#[error("I/O error: {operation} on path '{}'", .path.display())]
#[diagnostic(
    code(treeform::io),
    help("Check file permissions, disk space, or that the path is correct.")
)]
pub struct IoError {
    pub operation: FileOperation,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
impl IoError {
    pub fn new(operation: FileOperation, path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self {
            operation,
            path: path.into(),
            source: error,
        }
    }

    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }
}
