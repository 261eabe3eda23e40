use crate::{
    builder::{self, BuildReport, CreationError},
    config::ConfigError,
    errors::{FileOperation, IoError},
    preview,
    prompt::{self, PromptError},
    scanner::{self, ExcludeSet, ScanError, ScanOptions},
    source::{SourceError, TemplateSource},
    template::{self, TemplateError},
    utils::generated_on,
    validator,
    vfs::{FileStore, LocalFileStore},
};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use treetext::{render_document, PathEntry, StructureNode};

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TreeformError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Creation(#[from] CreationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),

    #[error("Structure validation failed:\n{}", bullet_list(.errors))]
    #[diagnostic(
        code(treeform::validation),
        help("Fix the listed entries in the structure file")
    )]
    ValidationFailed { errors: Vec<String> },

    #[error("Target directory '{}' does not exist", .path.display())]
    #[diagnostic(
        code(treeform::target_missing),
        help("Use --force to create it")
    )]
    TargetMissing { path: PathBuf },

    #[error("Directory '{}' does not exist", .path.display())]
    #[diagnostic(code(treeform::scan_root_missing))]
    ScanRootMissing { path: PathBuf },
}

fn bullet_list(errors: &[String]) -> String {
    errors
        .iter()
        .map(|error| format!("  • {}", error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where the structure text of a `create` comes from.
#[derive(Debug, Clone)]
pub enum StructureInput {
    /// A markdown file containing a fenced tree.
    File(PathBuf),
    /// A named template, expanded with `variables`.
    Template {
        source: String,
        name: String,
        variables: IndexMap<String, String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub target: PathBuf,
    pub dry_run: bool,
    /// Create the target directory when it is missing.
    pub force: bool,
    /// Stop after validation.
    pub validate_only: bool,
    /// Prompt for missing template variables and confirm before writing.
    pub interactive: bool,
    /// Print the coloured tree before building.
    pub preview: bool,
}

/// Outcome of [`create_structure`].
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Validated { entries: Vec<PathEntry> },
    /// The user answered no at the confirmation prompt.
    Declined { entries: Vec<PathEntry> },
    Built {
        entries: Vec<PathEntry>,
        report: BuildReport,
    },
}

/// Reads the structure text for `input`, expanding templates.
pub fn load_structure(input: &StructureInput, interactive: bool) -> Result<String, TreeformError> {
    match input {
        StructureInput::File(path) => std::fs::read_to_string(path)
            .map_err(|error| IoError::new(FileOperation::Read, path.clone(), error).into()),
        StructureInput::Template {
            source,
            name,
            variables,
        } => {
            let source = TemplateSource::build_from(source)?;
            let raw = source.find(name)?;

            let mut variables = variables.clone();
            if interactive {
                prompt::ask_variables(&template::template_variables(&raw), &mut variables)?;
            }

            let processed = template::process_template(&raw, &variables);
            for unresolved in template::template_variables(&processed) {
                log::warn!("template '{}' leaves {{{{{}}}}} unresolved", name, unresolved);
            }

            Ok(processed)
        }
    }
}

/// Parses and validates `text`, returning the entries or every problem found.
pub fn check_structure(text: &str) -> Result<Vec<PathEntry>, TreeformError> {
    let errors = validator::validate_text(text);
    if !errors.is_empty() {
        return Err(TreeformError::ValidationFailed { errors });
    }
    // validation already parsed successfully
    treetext::parse(text).map_err(|error| TreeformError::ValidationFailed {
        errors: vec![format!("Parse error: {}", error)],
    })
}

/// Validates a structure and materializes it under `options.target`.
pub fn create_structure(
    input: &StructureInput,
    options: &CreateOptions,
) -> Result<CreateOutcome, TreeformError> {
    let text = load_structure(input, options.interactive)?;
    let entries = check_structure(&text)?;

    if options.validate_only {
        return Ok(CreateOutcome::Validated { entries });
    }

    if options.preview {
        preview::preview_entries(&entries, &options.target.to_string_lossy());
    }

    if options.interactive
        && !options.dry_run
        && !prompt::confirm("Create this structure?", true)?
    {
        return Ok(CreateOutcome::Declined { entries });
    }

    let report = create_from_entries(&entries, options)?;

    Ok(CreateOutcome::Built { entries, report })
}

/// Builds already validated entries under `options.target`.
pub fn create_from_entries(
    entries: &[PathEntry],
    options: &CreateOptions,
) -> Result<BuildReport, TreeformError> {
    prepare_target(&options.target, options.force, options.dry_run)?;

    let mut store = LocalFileStore::new(&options.target);
    build_into(entries, &mut store, options.dry_run)
}

/// Runs the builder against any store.
pub fn build_into<S: FileStore + ?Sized>(
    entries: &[PathEntry],
    store: &mut S,
    dry_run: bool,
) -> Result<BuildReport, TreeformError> {
    let report = builder::build(entries, store, dry_run)?;
    log::info!(
        "{} {} directories and {} files",
        if dry_run { "would create" } else { "created" },
        report.created_directories.len(),
        report.created_files.len()
    );
    Ok(report)
}

fn prepare_target(target: &Path, force: bool, dry_run: bool) -> Result<(), TreeformError> {
    if target.is_dir() {
        return Ok(());
    }
    if !force {
        return Err(TreeformError::TargetMissing {
            path: target.to_path_buf(),
        });
    }
    if !dry_run {
        std::fs::create_dir_all(target)
            .map_err(|error| IoError::new(FileOperation::Mkdir, target, error))?;
        log::debug!("created target directory {}", target.display());
    }
    Ok(())
}

/// Settings for [`generate_structure`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub max_depth: usize,
    pub excludes: Vec<String>,
}
impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            max_depth: scanner::DEFAULT_MAX_DEPTH,
            excludes: scanner::DEFAULT_EXCLUDES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// A scanned tree and its markdown rendering.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub root: StructureNode,
    pub markdown: String,
    pub directories: usize,
    pub files: usize,
}

/// Scans `path` and renders it as a structure document.
pub fn generate_structure(path: &Path, options: &GenerateOptions) -> Result<Snapshot, TreeformError> {
    if !path.is_dir() {
        return Err(TreeformError::ScanRootMissing {
            path: path.to_path_buf(),
        });
    }

    let root_name = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()));

    let store = LocalFileStore::new(path);
    let scan_options = ScanOptions {
        max_depth: options.max_depth,
        excludes: ExcludeSet::new(options.excludes.iter().cloned()),
        root_name,
    };

    let tree = scanner::scan(&store, "", &scan_options)?;
    let directories = tree.directory_count();
    let files = tree.file_count();
    let root = StructureNode::Directory(tree);
    let markdown = render_document(&root, &generated_on());

    Ok(Snapshot {
        root,
        markdown,
        directories,
        files,
    })
}

/// Writes a generated document to `output` inside the scanned directory.
pub fn save_snapshot(path: &Path, output: &str, snapshot: &Snapshot) -> Result<PathBuf, TreeformError> {
    let mut store = LocalFileStore::new(path);
    store.write(output, &snapshot.markdown)?;
    Ok(store.resolve(output))
}

/// Template names offered by `source`, with their descriptions.
pub fn list_templates(source: &str) -> Result<Vec<(String, Option<String>)>, TreeformError> {
    let source = TemplateSource::build_from(source)?;

    Ok(source
        .list()
        .into_iter()
        .map(|name| {
            let description = source.description(&name).map(str::to_string);
            (name, description)
        })
        .collect())
}

/// Lets the user pick one of the templates in `source`.
pub fn choose_template(source: &str) -> Result<String, TreeformError> {
    let names: Vec<String> = list_templates(source)?
        .into_iter()
        .map(|(name, _)| name)
        .collect();

    if names.is_empty() {
        return Err(TemplateError::NotFound {
            name: "<any>".to_string(),
        }
        .into());
    }

    Ok(prompt::select_template(names)?)
}
