use std::{fmt, path::PathBuf, sync::RwLock};

use energy_domain::{ContractSetup, LedgerEntry};

use crate::CoreError;

/// Named datasets the billing core reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKey {
    Contract,
    Ledger,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 2] = [DatasetKey::Contract, DatasetKey::Ledger];

    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKey::Contract => "contract",
            DatasetKey::Ledger => "ledger",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes a persisted backup artifact.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Persistence collaborator for contract and ledger datasets.
///
/// An absent dataset loads as empty; an unreadable one is an error. Writes
/// replace the whole dataset and either fully succeed or fail.
pub trait BillingStorage: Send + Sync {
    fn load_contract(&self) -> Result<Option<ContractSetup>, CoreError>;
    fn save_contract(&self, setup: &ContractSetup) -> Result<(), CoreError>;
    fn load_entries(&self) -> Result<Vec<LedgerEntry>, CoreError>;
    fn save_entries(&self, entries: &[LedgerEntry]) -> Result<(), CoreError>;

    fn append_entry(&self, entry: &LedgerEntry) -> Result<(), CoreError> {
        let mut entries = self.load_entries()?;
        entries.push(entry.clone());
        self.save_entries(&entries)
    }

    /// Removes both datasets.
    fn clear(&self) -> Result<(), CoreError>;

    /// Snapshots the current datasets. Backends without backups return `None`.
    fn backup(&self, _note: Option<&str>) -> Result<Option<BackupInfo>, CoreError> {
        Ok(None)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        Ok(Vec::new())
    }

    /// Replaces both datasets with the named backup. Returns the snapshot of
    /// the data it replaced, when the backend keeps one.
    fn restore(&self, backup_id: &str) -> Result<Option<BackupInfo>, CoreError> {
        Err(CoreError::Validation(format!(
            "no backup named `{backup_id}`; this storage does not keep backups"
        )))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    contract: Option<ContractSetup>,
    entries: Vec<LedgerEntry>,
}

/// Process-local storage used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    state: RwLock<MemoryState>,
    read_only: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(setup: ContractSetup) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                contract: Some(setup),
                entries: Vec::new(),
            }),
            read_only: false,
        }
    }

    /// Storage whose writes always fail, for exercising error paths.
    pub fn read_only(setup: Option<ContractSetup>, entries: Vec<LedgerEntry>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                contract: setup,
                entries,
            }),
            read_only: true,
        }
    }

    fn check_writable(&self) -> Result<(), CoreError> {
        if self.read_only {
            return Err(CoreError::Storage("storage is read-only".into()));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryState>, CoreError> {
        self.state
            .read()
            .map_err(|_| CoreError::Internal("memory storage lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryState>, CoreError> {
        self.check_writable()?;
        self.state
            .write()
            .map_err(|_| CoreError::Internal("memory storage lock poisoned".into()))
    }
}

impl BillingStorage for InMemoryStorage {
    fn load_contract(&self) -> Result<Option<ContractSetup>, CoreError> {
        Ok(self.read()?.contract.clone())
    }

    fn save_contract(&self, setup: &ContractSetup) -> Result<(), CoreError> {
        self.write()?.contract = Some(setup.clone());
        Ok(())
    }

    fn load_entries(&self) -> Result<Vec<LedgerEntry>, CoreError> {
        Ok(self.read()?.entries.clone())
    }

    fn save_entries(&self, entries: &[LedgerEntry]) -> Result<(), CoreError> {
        self.write()?.entries = entries.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        let mut state = self.write()?;
        state.contract = None;
        state.entries.clear();
        Ok(())
    }
}
