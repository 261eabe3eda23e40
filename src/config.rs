use crate::{
    errors::{FileOperation, IoError},
    scanner::{DEFAULT_EXCLUDES, DEFAULT_MAX_DEPTH},
};
use miette::Diagnostic;
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "treeform.toml";
pub const DEFAULT_OUTPUT: &str = "STRUCTURE.md";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("I/O error within config domain")]
    #[diagnostic(code(treeform::config::io))]
    Io(#[from] IoError),

    #[error("Unable to parse config at '{}'", .path.display())]
    #[diagnostic(code(treeform::config::parse), help("Review the toml syntax and key names"))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from `treeform.toml`. Every key is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generate: GenerateConfig,
    pub create: CreateConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub exclude: Vec<String>,
    pub max_depth: usize,
    pub output: String,
}
impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
            output: DEFAULT_OUTPUT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CreateConfig {
    /// Default template source: a directory or a git reference.
    pub templates: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path, error))?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `treeform.toml` from `dir`, or the defaults when there is none.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let candidate = dir.as_ref().join(CONFIG_FILE);
        if candidate.is_file() {
            log::debug!("loading config from {}", candidate.display());
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::discover(tmp.path()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.generate.max_depth, 10);
        assert_eq!(config.generate.output, "STRUCTURE.md");
        assert!(config.generate.exclude.contains(&"vendor".to_string()));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[generate]\nmax_depth = 3\n\n[create]\ntemplates = \"gh:someone/layouts\"\n",
        )
        .unwrap();

        let config = Config::discover(tmp.path()).unwrap();

        assert_eq!(config.generate.max_depth, 3);
        assert_eq!(config.generate.output, "STRUCTURE.md");
        assert_eq!(config.create.templates.as_deref(), Some("gh:someone/layouts"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[generate]\ndepth = 3\n").unwrap();

        let err = Config::discover(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
