use energy_domain::{round2, Ledger, MONTHS_PER_YEAR};

use crate::{ledger_manager::sum_deltas, CoreError};

/// Derived over/under-payment figures, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconciliationSummary {
    pub running: f64,
    pub yearly_estimate: f64,
    pub months_recorded: usize,
}

pub struct Reconciliation;

impl Reconciliation {
    /// Total over (+) or under (-) payment across every recorded month.
    pub fn recalculation(ledger: &Ledger) -> Result<f64, CoreError> {
        sum_deltas(ledger)
    }

    /// Average monthly delta extrapolated to twelve months.
    ///
    /// This is an estimate: it assumes unrecorded months behave like the
    /// recorded average, however few months that average rests on.
    pub fn yearly_recalculation(ledger: &Ledger) -> Result<f64, CoreError> {
        let total = Self::recalculation(ledger)?;
        let average = total / ledger.len() as f64;
        Ok(round2(average * MONTHS_PER_YEAR as f64))
    }

    pub fn summarize(ledger: &Ledger) -> Result<ReconciliationSummary, CoreError> {
        Ok(ReconciliationSummary {
            running: round2(Self::recalculation(ledger)?),
            yearly_estimate: Self::yearly_recalculation(ledger)?,
            months_recorded: ledger.len(),
        })
    }
}
