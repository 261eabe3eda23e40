use crate::{
    errors::{FileOperation, IoError},
    template::TemplateError,
    utils::normalize_path,
};
use git2::Repository;
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const REGISTRY_FILE: &str = "templates.toml";
pub const TEMPLATES_DIR: &str = "templates";
const TEMPLATE_EXTENSION: &str = "md";

#[derive(Error, Debug, Diagnostic)]
pub enum SourceError {
    #[error("I/O error within source domain")]
    #[diagnostic(code(treeform::source::io))]
    Io(#[from] IoError),

    #[error("Unable to parse toml file at '{}': {source}", .path.display())]
    #[diagnostic(code(treeform::source::parse_toml), help("Review toml file"))]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unable to clone repo at: '{url}': {source}")]
    #[diagnostic(
        code(treeform::source::git_clone),
        help("Make sure that username and project name are correct")
    )]
    GitClone {
        url: String,
        path: PathBuf,
        source: git2::Error,
    },

    #[error("invalid git prefix provided: {url}")]
    #[diagnostic(
        code(treeform::source::invalid_git_prefix),
        help("Valid git prefix are: ['gh', 'gl']")
    )]
    InvalidGitPrefix { url: String },
}

/// A registry entry in `templates.toml`.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateInfo {
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A place templates are read from: a local directory or a cloned git repository.
///
/// Templates are looked up in the optional `templates.toml` registry first and
/// then as `templates/<name>.md`.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub registry: IndexMap<String, TemplateInfo>,
    pub source_dir: PathBuf,
}
impl TemplateSource {
    fn is_git(source: &str) -> bool {
        lazy_static::lazy_static! {
            static ref GIT_URL_REGEX: regex::Regex = regex::Regex::new(
                r"(?x)        # Enable extended mode
                ^(?:
                    # 1) gh:account/repo
                    gh:[^/]+/[^/]+
                    |
                    # 2) gl:account/repo
                    gl:[^/]+/[^/]+
                    |
                    # 3) git@host:account/repo.git
                    git@[A-Za-z0-9._-]+:[^/]+/[^/]+\.git
                    |
                    # 4) git+http(s)://...
                    git\+https?://.*
                )$"
            ).expect("a valid regex pattern");
        }

        GIT_URL_REGEX.is_match(source)
    }

    fn expand_git_url(url: &str) -> Result<String, SourceError> {
        if let Some(stripped) = url.strip_prefix("gh:") {
            Ok(format!("https://github.com/{}.git", stripped))
        } else if let Some(stripped) = url.strip_prefix("gl:") {
            Ok(format!("https://gitlab.com/{}.git", stripped))
        } else if let Some(stripped) = url.strip_prefix("git+") {
            Ok(stripped.to_string())
        } else if url.starts_with("git@") {
            Ok(url.to_string())
        } else {
            Err(SourceError::InvalidGitPrefix {
                url: url.to_string(),
            })
        }
    }

    pub fn build_from(source: &str) -> Result<Self, SourceError> {
        let source_directory = if TemplateSource::is_git(source) {
            let directory = tempfile::tempdir()
                .map_err(|error| IoError::new(FileOperation::Mkdir, PathBuf::new(), error))?
                .into_path();

            let expanded_url = TemplateSource::expand_git_url(source)?;

            log::debug!("cloning {} into {}", expanded_url, directory.display());

            Repository::clone(&expanded_url, directory.as_path()).map_err(|err| {
                SourceError::GitClone {
                    url: expanded_url.clone(),
                    path: directory.clone(),
                    source: err,
                }
            })?;

            directory
        } else {
            PathBuf::from(source)
        };

        Self::from_directory(source_directory)
    }

    /// Reads the registry of a local directory. A missing registry is an empty one.
    pub fn from_directory(source_dir: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let source_dir = source_dir.into();
        let registry_file = source_dir.join(REGISTRY_FILE);

        let registry = if registry_file.is_file() {
            let content = fs::read_to_string(&registry_file)
                .map_err(|error| IoError::new(FileOperation::Read, registry_file.clone(), error))?;

            toml::from_str(&content).map_err(|err| SourceError::ParseToml {
                path: registry_file.clone(),
                source: err,
            })?
        } else {
            IndexMap::new()
        };

        Ok(TemplateSource {
            registry,
            source_dir,
        })
    }

    /// Location of the named template, if it exists.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        if let Some(info) = self.registry.get(name) {
            let path = self.source_dir.join(normalize_path(&info.path));
            if path.is_file() {
                return Some(path);
            }
            log::warn!(
                "template '{}' is registered at '{}' but the file is missing",
                name,
                path.display()
            );
        }

        let conventional = self
            .source_dir
            .join(TEMPLATES_DIR)
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION));
        conventional.is_file().then_some(conventional)
    }

    /// Raw text of the named template.
    pub fn find(&self, name: &str) -> Result<String, TemplateError> {
        let path = self
            .locate(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })?;

        fs::read_to_string(&path).map_err(|error| TemplateError::Read {
            name: name.to_string(),
            source: IoError::new(FileOperation::Read, path, error),
        })
    }

    /// Registered names first, then `templates/*.md` stems not already listed.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.keys().cloned().collect();

        let mut discovered = discover_templates(&self.source_dir.join(TEMPLATES_DIR));
        discovered.sort();
        for name in discovered {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        names
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.registry.get(name)?.description.as_deref()
    }
}

fn discover_templates(dir: &Path) -> Vec<String> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };

    read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext == TEMPLATE_EXTENSION)
                    .unwrap_or(false)
        })
        .filter_map(|path| Some(path.file_stem()?.to_string_lossy().into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = tmp.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        tmp
    }

    #[test]
    fn test_is_git() {
        assert!(TemplateSource::is_git("gh:someone/templates"));
        assert!(TemplateSource::is_git("git@github.com:someone/templates.git"));
        assert!(TemplateSource::is_git("git+https://example.com/templates.git"));
        assert!(!TemplateSource::is_git("./templates"));
    }

    #[test]
    fn test_expand_git_url() {
        assert_eq!(
            TemplateSource::expand_git_url("gl:someone/templates").unwrap(),
            "https://gitlab.com/someone/templates.git"
        );
        assert_eq!(
            TemplateSource::expand_git_url("git+https://example.com/t.git").unwrap(),
            "https://example.com/t.git"
        );
        assert!(TemplateSource::expand_git_url("svn:nope").is_err());
    }

    #[test]
    fn test_find_conventional_template() {
        let tmp = source_with(&[("templates/php-lib.md", "```\n{{NAME}}/\n```")]);
        let source = TemplateSource::build_from(tmp.path().to_str().unwrap()).unwrap();

        assert_eq!(source.find("php-lib").unwrap(), "```\n{{NAME}}/\n```");
        assert!(matches!(
            source.find("missing"),
            Err(TemplateError::NotFound { .. })
        ));
    }

    #[test]
    fn test_registry_takes_precedence() {
        let tmp = source_with(&[
            (
                "templates.toml",
                "[web]\npath = \"layouts/web.md\"\ndescription = \"Static site\"\n",
            ),
            ("layouts/web.md", "registered"),
            ("templates/web.md", "conventional"),
            ("templates/cli.md", "cli"),
        ]);
        let source = TemplateSource::from_directory(tmp.path()).unwrap();

        assert_eq!(source.find("web").unwrap(), "registered");
        assert_eq!(source.description("web"), Some("Static site"));
        assert_eq!(source.list(), vec!["web", "cli"]);
    }

    #[test]
    fn test_broken_registry_is_reported() {
        let tmp = source_with(&[("templates.toml", "[web\n")]);
        let err = TemplateSource::from_directory(tmp.path()).unwrap_err();

        assert!(matches!(err, SourceError::ParseToml { .. }));
    }
}
