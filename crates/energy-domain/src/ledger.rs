//! Ordered billing entries grouped by provenance.

use serde::{Deserialize, Serialize};

use crate::{
    common::round2,
    entry::{LedgerEntry, Provenance},
    month::Month,
};

/// Insertion-ordered sequence of billing entries.
///
/// The protected bootstrap group, when present, always comes first. Groups
/// are contiguous: every entry of a group was appended in the same call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

/// Aggregated view of one provenance group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub provenance: Provenance,
    pub first_month: Month,
    pub last_month: Month,
    pub month_count: usize,
    pub consumption_kwh: u32,
    pub total_delta: f64,
    pub total_cost: f64,
}

impl GroupSummary {
    /// `"May: 120 kWh"` or `"May - July: 300 kWh"`.
    pub fn label(&self) -> String {
        if self.first_month == self.last_month {
            format!("{}: {} kWh", self.first_month, self.consumption_kwh)
        } else {
            format!(
                "{} - {}: {} kWh",
                self.first_month, self.last_month, self.consumption_kwh
            )
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend_group(&mut self, group: impl IntoIterator<Item = LedgerEntry>) {
        self.entries.extend(group);
    }

    /// Provenance of the most recently appended entry.
    pub fn last_provenance(&self) -> Option<Provenance> {
        self.entries.last().map(|entry| entry.provenance)
    }

    /// Detaches the trailing group and returns it in insertion order.
    pub fn split_off_last_group(&mut self) -> Vec<LedgerEntry> {
        let Some(provenance) = self.last_provenance() else {
            return Vec::new();
        };
        let keep = self
            .entries
            .iter()
            .rposition(|entry| entry.provenance != provenance)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        self.entries.split_off(keep)
    }

    /// Batch number for the next user group.
    pub fn next_batch(&self) -> u32 {
        self.entries
            .iter()
            .map(|entry| entry.provenance.batch)
            .max()
            .map(|batch| batch + 1)
            .unwrap_or(Provenance::INITIAL_BATCH + 1)
    }

    pub fn earliest_month(&self) -> Option<Month> {
        self.entries.first().map(|entry| entry.month)
    }

    pub fn latest_month(&self) -> Option<Month> {
        self.entries.last().map(|entry| entry.month)
    }

    /// Unchecked sum of all deltas; zero when empty.
    pub fn total_delta(&self) -> f64 {
        self.entries.iter().map(|entry| entry.delta).sum()
    }

    pub fn groups(&self) -> Vec<GroupSummary> {
        let mut groups: Vec<GroupSummary> = Vec::new();
        for entry in &self.entries {
            match groups.last_mut() {
                Some(group) if group.provenance == entry.provenance => {
                    group.last_month = entry.month;
                    group.month_count += 1;
                    group.total_delta += entry.delta;
                    group.total_cost += entry.cost;
                }
                _ => groups.push(GroupSummary {
                    provenance: entry.provenance,
                    first_month: entry.month,
                    last_month: entry.month,
                    month_count: 1,
                    consumption_kwh: entry.consumption_kwh,
                    total_delta: entry.delta,
                    total_cost: entry.cost,
                }),
            }
        }
        for group in &mut groups {
            group.total_delta = round2(group.total_delta);
            group.total_cost = round2(group.total_cost);
        }
        groups
    }

    pub fn initial_group(&self) -> Option<GroupSummary> {
        self.groups()
            .into_iter()
            .find(|group| group.provenance.protected)
    }
}
