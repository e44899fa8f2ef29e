//! Persisted, group-wise append/undo over the billing ledger.

use std::sync::Arc;

use energy_domain::{Ledger, LedgerEntry};
use tracing::{debug, info};

use crate::{storage::BillingStorage, CoreError};

/// Owns the in-memory [`Ledger`] and keeps it in sync with storage.
///
/// Every mutation is written through before the in-memory copy changes, so a
/// failed write leaves the ledger exactly as it was.
pub struct LedgerManager {
    storage: Arc<dyn BillingStorage>,
    ledger: Ledger,
}

impl LedgerManager {
    /// Loads whatever the storage currently holds; absent data is an empty ledger.
    pub fn load(storage: Arc<dyn BillingStorage>) -> Result<Self, CoreError> {
        let entries = storage.load_entries()?;
        debug!(entries = entries.len(), "ledger loaded");
        Ok(Self {
            storage,
            ledger: Ledger::from_entries(entries),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn all_entries(&self) -> &[LedgerEntry] {
        self.ledger.entries()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Appends one provenance group.
    ///
    /// All entries must share a provenance, and a protected group may only
    /// open an empty ledger.
    pub fn append_group(&mut self, entries: Vec<LedgerEntry>) -> Result<(), CoreError> {
        let Some(first) = entries.first() else {
            return Err(CoreError::Internal("cannot append an empty group".into()));
        };
        let provenance = first.provenance;
        if entries.iter().any(|entry| entry.provenance != provenance) {
            return Err(CoreError::Internal(
                "entries of one group must share a provenance".into(),
            ));
        }
        if provenance.protected && !self.ledger.is_empty() {
            return Err(CoreError::Internal(
                "the initial group must be the first in the ledger".into(),
            ));
        }
        if self.ledger.last_provenance() == Some(provenance) {
            return Err(CoreError::Internal(format!(
                "batch {} is already recorded",
                provenance.batch
            )));
        }

        let count = entries.len();
        let mut next = self.ledger.clone();
        next.extend_group(entries);
        self.storage.save_entries(next.entries())?;
        self.ledger = next;
        info!(batch = provenance.batch, months = count, "ledger group appended");
        Ok(())
    }

    /// Removes the most recently appended group and returns its entries.
    pub fn remove_last_group(&mut self) -> Result<Vec<LedgerEntry>, CoreError> {
        let Some(provenance) = self.ledger.last_provenance() else {
            return Err(CoreError::Validation("there are no readings to remove".into()));
        };
        if provenance.protected {
            return Err(CoreError::Validation(
                "the initial entries cannot be removed".into(),
            ));
        }

        let mut next = self.ledger.clone();
        let removed = next.split_off_last_group();
        self.storage.save_entries(next.entries())?;
        self.ledger = next;
        info!(batch = provenance.batch, months = removed.len(), "ledger group removed");
        Ok(removed)
    }

    pub fn sum_deltas(&self) -> Result<f64, CoreError> {
        sum_deltas(&self.ledger)
    }
}

/// Sum of all deltas; reconciling an empty ledger is an invariant violation.
pub fn sum_deltas(ledger: &Ledger) -> Result<f64, CoreError> {
    if ledger.is_empty() {
        return Err(CoreError::Internal(
            "cannot reconcile an empty ledger".into(),
        ));
    }
    Ok(ledger.total_delta())
}
