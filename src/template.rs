use crate::{errors::IoError, source::SourceError};
use indexmap::IndexMap;
use miette::Diagnostic;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template '{name}' not found")]
    #[diagnostic(
        code(treeform::template::not_found),
        help("Run `treeform templates` to see which templates are available")
    )]
    NotFound { name: String },

    #[error("Failed to read template '{name}'")]
    #[diagnostic(code(treeform::template::read))]
    Read {
        name: String,
        #[source]
        source: IoError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),
}

lazy_static::lazy_static! {
    static ref CONDITIONAL_REGEX: Regex =
        Regex::new(r"(?s)\{\{if\s+(\w+)\}\}(.*?)\{\{/if\}\}").expect("a valid regex pattern");
    static ref VARIABLE_REGEX: Regex =
        Regex::new(r"\{\{(?:if\s+)?(\w+)\}\}").expect("a valid regex pattern");
}

/// Expands `{{NAME}}` placeholders and `{{if NAME}}...{{/if}}` blocks.
///
/// Placeholders are replaced first. A conditional block keeps its inner text
/// when the variable is set to something truthy and disappears otherwise;
/// unknown variables count as unset. Unknown placeholders are left as written.
pub fn process_template(template: &str, variables: &IndexMap<String, String>) -> String {
    let mut processed = template.to_string();

    for (key, value) in variables {
        processed = processed.replace(&format!("{{{{{}}}}}", key), value);
    }

    CONDITIONAL_REGEX
        .replace_all(&processed, |captures: &Captures| {
            let enabled = variables
                .get(&captures[1])
                .is_some_and(|value| is_truthy(value));
            if enabled {
                captures[2].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Empty strings and `"0"` switch a conditional block off.
fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

/// Names referenced by a template, in order of first appearance.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in VARIABLE_REGEX.captures_iter(template) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Splits a `key=value` argument. Arguments without `=` yield `None`.
pub fn parse_variable(argument: &str) -> Option<(String, String)> {
    let (key, value) = argument.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Collects `key=value` arguments into an ordered map; later keys win.
pub fn parse_variables<'a>(arguments: impl IntoIterator<Item = &'a str>) -> IndexMap<String, String> {
    let mut variables = IndexMap::new();
    for argument in arguments {
        match parse_variable(argument) {
            Some((key, value)) => {
                variables.insert(key, value);
            }
            None => log::warn!("ignoring variable '{}', expected key=value", argument),
        }
    }
    variables
}
