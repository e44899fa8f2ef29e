//! Shared runtime state for CLI interactions and command execution.

use std::{path::PathBuf, sync::Arc};

use dialoguer::theme::ColorfulTheme;
use energy_config::{Config, ConfigManager};
use energy_core::{BillingSession, Clock};
use energy_storage_json::JsonBillingStorage;

use super::{formatters::CliFormatters, registry::CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    /// Directory holding `config.json` and, by default, the datasets.
    pub home: PathBuf,
    pub storage: Arc<JsonBillingStorage>,
    /// `None` until a contract has been set up.
    pub session: Option<BillingSession>,
    pub clock: Arc<dyn Clock>,
    pub formatters: CliFormatters,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
}
