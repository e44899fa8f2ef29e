use std::path::{Path, PathBuf};

use energy_domain::TariffConstants;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const APP_DIR: &str = "EnergyLedger";

/// Stores user-configurable shell preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Custom root for the contract and ledger datasets. Defaults to
    /// `<home>/data`.
    pub data_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_root: Option<PathBuf>,

    /// Replaces the built-in regulated fee figures when a new tariff year
    /// publishes different ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constants: Option<TariffConstants>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            backup_retention: Self::default_backup_retention(),
            data_root: None,
            backup_root: None,
            constants: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 5] = [
        "currency",
        "ui_color_enabled",
        "backup_retention",
        "data_root",
        "backup_root",
    ];

    pub fn default_currency() -> String {
        "CZK".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn tariff_constants(&self) -> TariffConstants {
        self.constants.unwrap_or_default()
    }

    /// Application home: `~/Documents/EnergyLedger`, falling back to the
    /// home directory and then the working directory.
    pub fn default_home() -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn resolve_data_root(&self, home: &Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => home.join("data"),
        }
    }

    pub fn resolve_backup_root(&self, home: &Path) -> PathBuf {
        match &self.backup_root {
            Some(path) => path.clone(),
            None => home.join("backups"),
        }
    }

    /// Current value of a setting as shown by the `config` command.
    pub fn get(&self, key: &str, home: &Path) -> Result<String, ConfigError> {
        let value = match key {
            "currency" => self.currency.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "backup_retention" => self.backup_retention.to_string(),
            "data_root" => self.resolve_data_root(home).display().to_string(),
            "backup_root" => self.resolve_backup_root(home).display().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "currency" => {
                if value.is_empty() {
                    return Err(invalid("currency code cannot be empty"));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected true or false")),
                };
            }
            "backup_retention" => {
                let parsed: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if parsed == 0 {
                    return Err(invalid("keep at least one backup"));
                }
                self.backup_retention = parsed;
            }
            "data_root" => self.data_root = optional_path(value),
            "backup_root" => self.backup_root = optional_path(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value.eq_ignore_ascii_case("default") {
        None
    } else {
        Some(PathBuf::from(value))
    }
}
