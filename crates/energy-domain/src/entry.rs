use std::fmt;

use serde::{Deserialize, Serialize};

use crate::month::Month;

/// Identifies which user action produced a ledger entry.
///
/// The bootstrap import is `protected` and can never be removed; every later
/// batch of readings carries a strictly increasing `batch` number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub protected: bool,
    pub batch: u32,
}

impl Provenance {
    pub const INITIAL_BATCH: u32 = 0;

    pub fn initial() -> Self {
        Self {
            protected: true,
            batch: Self::INITIAL_BATCH,
        }
    }

    pub fn user(batch: u32) -> Self {
        Self {
            protected: false,
            batch,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.protected {
            f.write_str("initial")
        } else {
            write!(f, "#{}", self.batch)
        }
    }
}

/// One month's share of a billed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub month: Month,
    pub month_index: usize,
    /// Consumption of the whole period this entry belongs to.
    pub consumption_kwh: u32,
    /// Flat payment minus computed cost for this month; positive means overpaid.
    pub delta: f64,
    pub cost: f64,
    pub provenance: Provenance,
}

impl LedgerEntry {
    pub fn new(
        month: Month,
        consumption_kwh: u32,
        delta: f64,
        cost: f64,
        provenance: Provenance,
    ) -> Self {
        Self {
            month,
            month_index: month.index(),
            consumption_kwh,
            delta,
            cost,
            provenance,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.provenance.protected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_records_month_index() {
        let entry = LedgerEntry::new(Month::July, 120, 15.5, 484.5, Provenance::user(3));
        assert_eq!(entry.month_index, 6);
        assert!(!entry.is_protected());
        assert_eq!(entry.provenance.to_string(), "#3");
    }

    #[test]
    fn entry_json_uses_explicit_fields() {
        let entry = LedgerEntry::new(Month::March, 900, -12.0, 512.0, Provenance::initial());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["month"], "march");
        assert_eq!(json["month_index"], 2);
        assert_eq!(json["provenance"]["protected"], true);
        assert_eq!(json["provenance"]["batch"], 0);
    }
}
