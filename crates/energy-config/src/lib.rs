//! energy-config
//!
//! User preferences for the energy ledger shell: display currency and
//! data locations, colour output and tariff constant overrides.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
