#![doc(test(attr(deny(warnings))))]

//! Energy Ledger tracks household electricity consumption against a fixed
//! monthly advance payment and projects the yearly settlement.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Energy Ledger tracing initialized.");
    });
}
