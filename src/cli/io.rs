use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::core::CommandError;
use crate::cli::output;

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt for a value, validating it before the prompt returns.
pub fn prompt_validated<F>(
    theme: &ColorfulTheme,
    prompt: &str,
    validate: F,
) -> Result<String, CommandError>
where
    F: Fn(&String) -> Result<(), String>,
{
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|value: &String| validate(value))
        .interact_text()
        .map_err(CommandError::from)
}

/// Prompt for optional free-form text; an empty answer means none.
pub fn prompt_optional(theme: &ColorfulTheme, prompt: &str) -> Result<Option<String>, CommandError> {
    let value = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(CommandError::from)?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
