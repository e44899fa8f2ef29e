//! energy-core
//!
//! Tariff calculation, ledger bookkeeping and reconciliation for household
//! electricity billing. Depends on energy-domain. No CLI, no terminal I/O;
//! persistence goes through the [`storage::BillingStorage`] trait.

pub mod error;
pub mod input;
pub mod ledger_manager;
pub mod month_ring;
pub mod reconciliation;
pub mod session;
pub mod storage;
pub mod tariff_engine;
pub mod time;


pub use error::CoreError;
pub use ledger_manager::*;
pub use reconciliation::*;
pub use session::*;
pub use tariff_engine::*;
pub use time::Clock;
