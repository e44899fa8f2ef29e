//! energy-domain
//!
//! Pure domain models (Month, TariffConfig, LedgerEntry, Ledger, ContractSetup).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod contract;
pub mod entry;
pub mod ledger;
pub mod month;
pub mod tariff;

pub use common::*;
pub use contract::*;
pub use entry::*;
pub use ledger::*;
pub use month::*;
pub use tariff::*;
