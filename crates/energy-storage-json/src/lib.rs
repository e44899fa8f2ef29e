use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use energy_core::{
    storage::{BackupInfo, BillingStorage, DatasetKey},
    CoreError,
};
use energy_domain::{ContractSetup, LedgerEntry, CURRENT_SCHEMA_VERSION};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const DATASET_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "billing";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;
const RESTORE_BACKUP_NOTE: &str = "before restore";

#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub data_root: PathBuf,
    pub backup_root: PathBuf,
}

/// Filesystem-backed JSON datasets plus timestamped backups.
#[derive(Debug, Clone)]
pub struct JsonBillingStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// Everything needed to restore the billing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub schema_version: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub contract: Option<ContractSetup>,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
}

impl JsonBillingStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.data_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            data_dir: paths.data_root,
            backups_dir: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn dataset_path(&self, key: DatasetKey) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", key.as_str(), DATASET_EXTENSION))
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Records of a sequence dataset; absent or blank files load as empty.
    pub fn load_records<T: DeserializeOwned>(&self, key: DatasetKey) -> Result<Vec<T>, CoreError> {
        match self.read_value(key)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(|err| serde_error(key, err)))
                .collect(),
            Some(_) => Err(not_a_sequence(key)),
        }
    }

    /// Overwrites a sequence dataset atomically.
    pub fn save_records<T: Serialize>(&self, records: &[T], key: DatasetKey) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|err| serde_error(key, err))?;
        self.write_dataset(key, &json)
    }

    /// Adds one record, creating the dataset when absent. Fails when the
    /// existing dataset is not a sequence.
    pub fn append_record<T: Serialize>(&self, record: &T, key: DatasetKey) -> Result<(), CoreError> {
        let mut items = match self.read_value(key)? {
            None => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(not_a_sequence(key)),
        };
        items.push(serde_json::to_value(record).map_err(|err| serde_error(key, err))?);
        self.save_records(&items, key)
    }

    /// A single-record dataset such as the contract.
    pub fn load_record<T: DeserializeOwned>(&self, key: DatasetKey) -> Result<Option<T>, CoreError> {
        self.read_value(key)?
            .map(|value| serde_json::from_value(value).map_err(|err| serde_error(key, err)))
            .transpose()
    }

    pub fn save_record<T: Serialize>(&self, record: &T, key: DatasetKey) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(record).map_err(|err| serde_error(key, err))?;
        self.write_dataset(key, &json)
    }

    pub fn delete_dataset(&self, key: DatasetKey) -> Result<(), CoreError> {
        let path = self.dataset_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn load_backup(&self, info: &BackupInfo) -> Result<BackupSnapshot, CoreError> {
        if !info.path.exists() {
            return Err(CoreError::Storage(format!("backup `{}` not found", info.id)));
        }
        let data = fs::read_to_string(&info.path)?;
        let snapshot: BackupSnapshot =
            serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "backup `{}` is from a newer schema version",
                info.id
            )));
        }
        Ok(snapshot)
    }

    /// Replaces both datasets with the contents of a backup.
    fn apply_snapshot(&self, snapshot: &BackupSnapshot) -> Result<(), CoreError> {
        match &snapshot.contract {
            Some(contract) => self.save_contract(contract)?,
            None => self.delete_dataset(DatasetKey::Contract)?,
        }
        self.save_entries(&snapshot.entries)
    }

    fn read_value(&self, key: DatasetKey) -> Result<Option<Value>, CoreError> {
        let path = self.dataset_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|err| serde_error(key, err))
    }

    fn write_dataset(&self, key: DatasetKey, json: &str) -> Result<(), CoreError> {
        write_atomic(&self.dataset_path(key), json)?;
        debug!(dataset = %key, "dataset written");
        Ok(())
    }

    fn write_backup_file(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        fs::create_dir_all(&self.backups_dir)?;
        let snapshot = BackupSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: Utc::now(),
            note: note.map(|value| value.trim().to_string()).filter(|value| !value.is_empty()),
            contract: self.load_contract()?,
            entries: self.load_entries()?,
        };
        let timestamp = snapshot.created_at.format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", BACKUP_PREFIX, timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{}.{}", stem, DATASET_EXTENSION);
        let path = self.backups_dir.join(&file_name);
        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        write_atomic(&path, &json)?;
        self.prune_backups()?;
        Ok(BackupInfo {
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "could not prune old backup");
            }
        }
        Ok(())
    }
}

impl BillingStorage for JsonBillingStorage {
    fn load_contract(&self) -> Result<Option<ContractSetup>, CoreError> {
        self.load_record(DatasetKey::Contract)
    }

    fn save_contract(&self, setup: &ContractSetup) -> Result<(), CoreError> {
        self.save_record(setup, DatasetKey::Contract)
    }

    fn load_entries(&self) -> Result<Vec<LedgerEntry>, CoreError> {
        self.load_records(DatasetKey::Ledger)
    }

    fn save_entries(&self, entries: &[LedgerEntry]) -> Result<(), CoreError> {
        self.save_records(entries, DatasetKey::Ledger)
    }

    fn append_entry(&self, entry: &LedgerEntry) -> Result<(), CoreError> {
        self.append_record(entry, DatasetKey::Ledger)
    }

    fn clear(&self) -> Result<(), CoreError> {
        for key in DatasetKey::ALL {
            self.delete_dataset(key)?;
        }
        Ok(())
    }

    fn backup(&self, note: Option<&str>) -> Result<Option<BackupInfo>, CoreError> {
        self.write_backup_file(note).map(Some)
    }

    /// Looks the backup up by file name, snapshots the current data, then
    /// applies the backup.
    fn restore(&self, backup_id: &str) -> Result<Option<BackupInfo>, CoreError> {
        let info = self
            .list_backups()?
            .into_iter()
            .find(|backup| backup.id == backup_id)
            .ok_or_else(|| CoreError::Validation(format!("no backup named `{backup_id}`")))?;
        let snapshot = self.load_backup(&info)?;
        let before = self.write_backup_file(Some(RESTORE_BACKUP_NOTE))?;
        self.apply_snapshot(&snapshot)?;
        debug!(backup = %info.id, "backup restored");
        Ok(Some(before))
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATASET_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(created) = parse_backup_timestamp(file_name) else {
                continue;
            };
            entries.push((
                created,
                BackupInfo {
                    id: file_name.to_string(),
                    created_at: created.format(BACKUP_TIMESTAMP_FORMAT).to_string(),
                    path: path.clone(),
                },
            ));
        }
        entries.sort_by_key(|(created, info)| (Reverse(*created), Reverse(info.id.clone())));
        Ok(entries.into_iter().map(|(_, info)| info).collect())
    }
}

fn serde_error(key: DatasetKey, err: serde_json::Error) -> CoreError {
    CoreError::Serde(format!("dataset `{key}`: {err}"))
}

fn not_a_sequence(key: DatasetKey) -> CoreError {
    CoreError::Storage(format!("dataset `{key}` does not contain a list"))
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads `billing_YYYYmmdd_HHMMSS[_note].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", DATASET_EXTENSION))?;
    let mut parts = stem.split('_');
    if parts.next()? != BACKUP_PREFIX {
        return None;
    }
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    if !is_digits(date_part, 8) || !is_digits(time_part, 6) {
        return None;
    }
    let raw = format!("{}{}", date_part, time_part);
    NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes next to `path` and renames over it, so readers never see a
/// partial file.
fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_names_round_trip_through_parser() {
        let parsed = parse_backup_timestamp("billing_20250301_101530_before-reset.json");
        assert!(parsed.is_some());
        assert!(parse_backup_timestamp("billing_20250301_1015.json").is_none());
        assert!(parse_backup_timestamp("ledger_20250301_101530.json").is_none());
    }

    #[test]
    fn notes_are_slugified() {
        assert_eq!(
            sanitize_backup_note(Some("Before reset. March")),
            Some("before-reset-march".into())
        );
        assert_eq!(sanitize_backup_note(Some("   ")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }
}
