//! Core CLI dispatch, error types and shell context helpers.

use std::{env, io, path::PathBuf, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use energy_config::{Config, ConfigError, ConfigManager};
use energy_core::{storage::BillingStorage, BillingSession, Clock, CoreError, WorkflowState};
use energy_storage_json::{JsonBillingStorage, StoragePaths};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::{debug, info};

use crate::errors::{BillingError, CliError};

use super::commands;
use super::formatters::CliFormatters;
use super::io as cli_io;
use super::output::{self, OutputPreferences};
use super::registry::CommandRegistry;
use super::system_clock::SystemClock;
pub use crate::cli::shell_context::{CliMode, ShellContext};

pub const SCRIPT_ENV: &str = "ENERGY_LEDGER_CLI_SCRIPT";
pub const HOME_ENV: &str = "ENERGY_LEDGER_HOME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let home = env::var_os(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Config::default_home);
        Self::with_home(mode, home, Arc::new(SystemClock))
    }

    /// Builds a context rooted at `home`, reopening any persisted contract.
    pub fn with_home(mode: CliMode, home: PathBuf, clock: Arc<dyn Clock>) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(&home)?;
        let config = config_manager.load()?;
        apply_output_preferences(&config);

        let storage = Arc::new(JsonBillingStorage::with_retention(
            StoragePaths {
                data_root: config.resolve_data_root(&home),
                backup_root: config.resolve_backup_root(&home),
            },
            config.backup_retention,
        )?);
        let session = open_session(&storage, &config)?;
        debug!(home = %home.display(), contract = session.is_some(), "shell context ready");

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            home,
            storage,
            session,
            clock,
            formatters: CliFormatters::new(config.currency.clone()),
            config_manager,
            config,
            running: true,
        })
    }

    pub(crate) fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("energy [{}]> ", session.state()),
            None => "energy [no contract]> ".to_string(),
        }
    }

    /// Drops the in-memory session and reopens whatever contract storage now
    /// holds.
    pub(crate) fn reload_session(&mut self) -> Result<(), CoreError> {
        self.session = None;
        self.session = open_session(&self.storage, &self.config)?;
        Ok(())
    }

    pub(crate) fn storage_handle(&self) -> Arc<dyn BillingStorage> {
        self.storage.clone()
    }

    pub(crate) fn session(&self) -> Result<&BillingSession, CommandError> {
        self.session.as_ref().ok_or(CommandError::NoContract)
    }

    pub(crate) fn session_mut(&mut self) -> Result<&mut BillingSession, CommandError> {
        self.session.as_mut().ok_or(CommandError::NoContract)
    }

    pub(crate) fn is_interactive(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    /// Replaces the active configuration after a `config` change.
    pub(crate) fn apply_config(&mut self, config: Config) {
        apply_output_preferences(&config);
        self.formatters = CliFormatters::new(config.currency.clone());
        self.config = config;
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::NoContract => {
                cli_io::print_error("No contract set up yet.");
                cli_io::print_hint("Run `setup` to enter your contract and previous bill.");
                Ok(())
            }
            CommandError::Core(BillingError::Validation(message)) => {
                cli_io::print_error(message);
                if let Some(session) = &self.session {
                    if session.state() == WorkflowState::AllMonthsEntered {
                        cli_io::print_hint("Use `undo` to correct the last reading.");
                    }
                }
                Ok(())
            }
            other => {
                cli_io::print_error(other.to_string());
                Ok(())
            }
        }
    }
}

fn apply_output_preferences(config: &Config) {
    output::set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled,
    });
}

/// Reopens the persisted contract, importing the initial period when a
/// previous run stopped before doing so.
fn open_session(
    storage: &Arc<JsonBillingStorage>,
    config: &Config,
) -> Result<Option<BillingSession>, CoreError> {
    if storage.load_contract()?.is_none() {
        return Ok(None);
    }
    let handle: Arc<dyn BillingStorage> = storage.clone();
    let mut session = BillingSession::open(handle, config.tariff_constants())?;
    session.ensure_initialized()?;
    info!(state = %session.state(), "contract reopened");
    Ok(Some(session))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No contract set up yet. Use `setup` first.")]
    NoContract,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] BillingError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(BillingError::from(err))
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Core(BillingError::from(err))
    }
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Input(message) | CliError::Command(message) => {
                CommandError::InvalidArguments(message)
            }
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(home: PathBuf, lines: &[&str]) -> Result<ShellContext, CliError> {
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
        }
    }

    let mut app = ShellContext::with_home(CliMode::Script, home, Arc::new(FixedClock))?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_domain::{Month, Provenance};
    use tempfile::tempdir;

    const SETUP: &str = "setup price=5 supplier_fee=100 high_tariff=1000 low_tariff=500 \
                         high_ratio=0.5 breaker_fee=50 annual_kwh=1200 payment=1500 \
                         start=may end=january";

    #[test]
    fn commands_without_contract_report_instead_of_failing() {
        let dir = tempdir().unwrap();
        let app = process_script(dir.path().to_path_buf(), &["status", "add 100 may"]).unwrap();
        assert!(app.session.is_none());
    }

    #[test]
    fn setup_then_add_records_a_user_batch() {
        let dir = tempdir().unwrap();
        let app = process_script(dir.path().to_path_buf(), &[SETUP, "add 300 july"]).unwrap();
        let session = app.session.as_ref().expect("session");
        let groups = session.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].provenance, Provenance::user(1));
        assert_eq!(groups[1].first_month, Month::May);
        assert_eq!(groups[1].last_month, Month::July);
    }

    #[test]
    fn add_without_month_uses_the_clock() {
        let dir = tempdir().unwrap();
        let app = process_script(dir.path().to_path_buf(), &[SETUP, "add 200"]).unwrap();
        let session = app.session.as_ref().expect("session");
        let last = session.groups().pop().expect("group");
        assert_eq!(last.last_month, Month::June);
    }

    #[test]
    fn session_is_reopened_from_the_same_home() {
        let dir = tempdir().unwrap();
        process_script(dir.path().to_path_buf(), &[SETUP, "add 120 may"]).unwrap();
        let app = process_script(dir.path().to_path_buf(), &["undo", "undo"]).unwrap();
        let session = app.session.as_ref().expect("session");
        assert_eq!(session.groups().len(), 1);
        assert_eq!(session.state(), WorkflowState::Tracking);
    }

    #[test]
    fn reset_requires_confirmation_flag_in_script_mode() {
        let dir = tempdir().unwrap();
        let app = process_script(dir.path().to_path_buf(), &[SETUP, "reset"]).unwrap();
        assert!(app.session.is_some());

        let app = process_script(dir.path().to_path_buf(), &["reset --yes"]).unwrap();
        assert!(app.session.is_none());
        assert!(!app.storage.list_backups().unwrap().is_empty());
    }

    #[test]
    fn failed_reset_keeps_the_session() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path().to_path_buf(), &[SETUP]).unwrap();
        let backups = dir.path().join("backups");
        std::fs::remove_dir_all(&backups).unwrap();
        std::fs::write(&backups, "not a directory").unwrap();

        assert!(app.process_line("reset --yes").is_err());
        assert!(app.session.is_some());
        assert!(app.storage.load_contract().unwrap().is_some());
        assert!(app.process_line("status").is_ok());
    }

    #[test]
    fn restore_brings_back_a_saved_ledger() {
        let dir = tempdir().unwrap();
        let mut app =
            process_script(dir.path().to_path_buf(), &[SETUP, "backup snap", "add 300 july"])
                .unwrap();
        let saved = app
            .storage
            .list_backups()
            .unwrap()
            .into_iter()
            .find(|backup| backup.id.ends_with("_snap.json"))
            .expect("named backup");

        assert!(app.process_line(&format!("restore {}", saved.id)).is_err());
        assert_eq!(app.session.as_ref().expect("session").groups().len(), 2);

        app.process_line(&format!("restore {} --yes", saved.id)).unwrap();
        let session = app.session.as_ref().expect("session");
        assert_eq!(session.groups().len(), 1);
        assert_eq!(session.pending_months().first(), Some(&Month::May));
    }

    #[test]
    fn config_changes_are_persisted() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path().to_path_buf(),
            &["config currency eur", "config ui_color_enabled off"],
        )
        .unwrap();
        assert_eq!(app.config.currency, "EUR");
        assert_eq!(app.formatters.currency(), "EUR");
        let reloaded = app.config_manager.load().unwrap();
        assert!(!reloaded.ui_color_enabled);
    }

    #[test]
    fn exit_stops_processing() {
        let dir = tempdir().unwrap();
        let app = process_script(dir.path().to_path_buf(), &["exit", SETUP]).unwrap();
        assert!(app.session.is_none());
    }

    #[test]
    fn unknown_commands_are_not_errors() {
        let dir = tempdir().unwrap();
        assert!(process_script(dir.path().to_path_buf(), &["stauts", "pending"]).is_ok());
    }
}
