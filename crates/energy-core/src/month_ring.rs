//! Modulo-12 month arithmetic.
//!
//! Readings are recorded by month without a year, so every range wraps from
//! December back to January. When both ends name the same month the answer
//! depends on intent: a freshly bootstrapped past period spans the whole
//! year, while a future range that has caught up with its end is empty.

use energy_domain::{Month, MONTHS_PER_YEAR};

/// How [`range`] treats `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameMonth {
    /// The full twelve-month cycle beginning at `start`.
    FullCycle,
    /// No months at all.
    Empty,
}

pub fn range(start: Month, end: Month, same: SameMonth) -> Vec<Month> {
    match same {
        SameMonth::FullCycle => range_full_cycle(start, end),
        SameMonth::Empty => range_exclusive(start, end),
    }
}

/// Months from `start` up to but excluding `end`; empty when they coincide.
pub fn range_exclusive(start: Month, end: Month) -> Vec<Month> {
    if start == end {
        return Vec::new();
    }
    walk(start, months_between(start, end))
}

/// Months from `start` up to but excluding `end`; all twelve when they coincide.
pub fn range_full_cycle(start: Month, end: Month) -> Vec<Month> {
    walk(start, months_between(start, end))
}

/// Forward distance from `start` to `end`, counting a full year when equal.
pub fn months_between(start: Month, end: Month) -> usize {
    if start == end {
        return MONTHS_PER_YEAR;
    }
    (end.index() + MONTHS_PER_YEAR - start.index()) % MONTHS_PER_YEAR
}

fn walk(start: Month, count: usize) -> Vec<Month> {
    (0..count)
        .map(|offset| Month::wrapping_from_index(start.index() + offset))
        .collect()
}
