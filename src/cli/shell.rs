//! Line-oriented front end: a rustyline editor when a person is typing,
//! plain stdin lines when `ENERGY_LEDGER_CLI_SCRIPT` is set.

use std::{
    fmt,
    io::{self, BufRead},
};

use energy_config::Config;
use energy_domain::Month;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Context as ReadlineContext, Editor, Helper,
};
use shell_words::split;
use tracing::debug;

use crate::cli::core::{CliMode, CommandError, LoopControl, ShellContext, SCRIPT_ENV};
use crate::cli::io as cli_io;
use crate::cli::registry::CommandRegistry;
use crate::errors::CliError;

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(ShellHelper::from_registry(&context.registry)));

    if context.session.is_none() {
        cli_io::print_hint("No contract yet. Run `setup` to get started.");
    }

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line).ok();
                if let Err(err) = handle_line(context, line) {
                    context.report_error(err)?;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                cli_io::print_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if let Err(err) = handle_line(context, &line) {
            debug!(line = index + 1, "script command failed");
            context.report_error(err)?;
        }
        if !context.running {
            break;
        }
    }
    Ok(())
}

/// Parses and runs one line. Blank lines and `#` comments do nothing.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            cli_io::print_warning(err);
            return Ok(LoopControl::Continue);
        }
    };

    let Some(raw) = tokens.first() else {
        return Ok(LoopControl::Continue);
    };
    if raw.starts_with('#') {
        return Ok(LoopControl::Continue);
    }

    let command = raw.to_lowercase();
    let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();

    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Tab completion for command names and the fixed words their arguments
/// accept, plus a usage hint after a bare command.
struct ShellHelper {
    commands: Vec<(&'static str, &'static str)>,
}

impl ShellHelper {
    fn from_registry(registry: &CommandRegistry) -> Self {
        let mut commands: Vec<_> = registry
            .entries()
            .map(|entry| (entry.name, entry.usage))
            .collect();
        commands.sort_unstable();
        Self { commands }
    }

    fn argument_words(&self, command: &str) -> Vec<String> {
        match command {
            "add" => Month::ALL
                .iter()
                .map(|month| month.name().to_ascii_lowercase())
                .collect(),
            "config" => Config::KEYS.iter().map(|key| key.to_string()).collect(),
            "help" => self.commands.iter().map(|(name, _)| name.to_string()).collect(),
            "entries" => vec!["--json".into()],
            "reset" | "restore" => vec!["--yes".into()],
            _ => Vec::new(),
        }
    }

    /// Start offset of the word under the cursor and its completions.
    fn candidates(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let needle = prefix[start..].to_ascii_lowercase();
        let words = match prefix[..start].split_whitespace().next() {
            None => self.commands.iter().map(|(name, _)| name.to_string()).collect(),
            Some(command) => self.argument_words(&command.to_ascii_lowercase()),
        };
        let matches = words
            .into_iter()
            .filter(|word| word.starts_with(&needle))
            .collect();
        (start, matches)
    }

    /// `"add "` hints `<kwh> [month]`.
    fn usage_hint(&self, line: &str) -> Option<String> {
        let command = line.strip_suffix(' ')?.trim_start();
        if command.is_empty() || command.contains(char::is_whitespace) {
            return None;
        }
        let (name, usage) = self
            .commands
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(command))?;
        let rest = usage.strip_prefix(*name)?.trim_start();
        (!rest.is_empty()).then(|| rest.to_string())
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.candidates(&line[..pos]);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        self.usage_hint(line)
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> ShellHelper {
        ShellHelper {
            commands: vec![
                ("add", "add <kwh> [month]"),
                ("backup", "backup [note]"),
                ("config", "config [key [value]]"),
                ("undo", "undo"),
            ],
        }
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line("setup supplier='Green Power' start=may").unwrap();
        assert_eq!(tokens, vec!["setup", "supplier=Green Power", "start=may"]);
        assert!(parse_command_line("setup supplier='open").is_err());
    }

    #[test]
    fn completes_commands_then_their_arguments() {
        let helper = helper();
        assert_eq!(helper.candidates("ba"), (0, vec!["backup".to_string()]));
        assert_eq!(helper.candidates("add 120 ju"), (8, vec!["june".into(), "july".into()]));
        assert_eq!(helper.candidates("CONFIG cur"), (7, vec!["currency".into()]));
        assert!(helper.candidates("undo x").1.is_empty());
    }

    #[test]
    fn hints_usage_after_a_bare_command() {
        let helper = helper();
        assert_eq!(helper.usage_hint("add "), Some("<kwh> [month]".into()));
        assert_eq!(helper.usage_hint("add"), None);
        assert_eq!(helper.usage_hint("add 12 "), None);
        assert_eq!(helper.usage_hint("undo "), None);
    }
}
