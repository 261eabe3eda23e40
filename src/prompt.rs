use indexmap::IndexMap;
use inquire::{Confirm, InquireError, Select, Text};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("Prompt was cancelled")]
    #[diagnostic(code(treeform::prompt::cancelled))]
    Cancelled,

    #[error("Unable to prompt for input")]
    #[diagnostic(
        code(treeform::prompt::inquire),
        help("Interactive prompts need a terminal; pass the values as flags instead")
    )]
    Inquire(#[source] InquireError),
}
impl From<InquireError> for PromptError {
    fn from(error: InquireError) -> Self {
        match error {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                PromptError::Cancelled
            }
            other => PromptError::Inquire(other),
        }
    }
}

/// Asks a yes/no question.
pub fn confirm(message: &str, default: bool) -> Result<bool, PromptError> {
    Ok(Confirm::new(message).with_default(default).prompt()?)
}

/// Lets the user pick a template by name.
pub fn select_template(names: Vec<String>) -> Result<String, PromptError> {
    Ok(Select::new("Select template:", names).prompt()?)
}

/// Prompts for every name in `wanted` that `variables` has no value for.
pub fn ask_variables(
    wanted: &[String],
    variables: &mut IndexMap<String, String>,
) -> Result<(), PromptError> {
    for name in wanted {
        if variables.contains_key(name) {
            continue;
        }
        let answer = Text::new(name)
            .with_help_message("leave empty to disable blocks guarded by this variable")
            .prompt()?;

        variables.insert(name.clone(), answer);
    }

    Ok(())
}
