//! Interactive prompts backed by `inquire`.

use inquire::validator::Validation;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

use oscli_core::creds::{CredentialError, SecretPrompt};

/// Masked terminal prompt used for vault passwords.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn secret(&self, label: &str) -> Result<String, CredentialError> {
        secret(label).map_err(|e| CredentialError::Prompt {
            message: e.to_string(),
        })
    }
}

pub fn secret(label: &str) -> Result<String, InquireError> {
    Password::new(label)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
}

pub fn required_text(label: &str) -> Result<String, InquireError> {
    let value = Text::new(label)
        .with_placeholder("Required")
        .with_validator(|value: &str| match value.trim().is_empty() {
            false => Ok(Validation::Valid),
            true => Ok(Validation::Invalid("A value is required".into())),
        })
        .prompt()?;
    Ok(value.trim().to_string())
}

/// Empty answers come back as `None`.
pub fn optional_text(label: &str) -> Result<Option<String>, InquireError> {
    let value = Text::new(label).with_placeholder("Optional").prompt()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

pub fn select(
    label: &str,
    options: Vec<String>,
    starting_cursor: Option<usize>,
) -> Result<String, InquireError> {
    let mut prompt = Select::new(label, options);
    if let Some(index) = starting_cursor {
        prompt = prompt.with_starting_cursor(index);
    }
    prompt.prompt()
}

pub fn confirm(label: &str, default: bool) -> Result<bool, InquireError> {
    Confirm::new(label).with_default(default).prompt()
}
