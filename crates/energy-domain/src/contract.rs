use serde::{Deserialize, Serialize};

use crate::{
    common::CURRENT_SCHEMA_VERSION,
    month::Month,
    tariff::{TariffConfig, TariffConstants},
};

/// Contract details captured once during setup.
///
/// `billing_start` is the first month of the running, not yet billed period.
/// `billing_end` is the first month after that period closes, which is also
/// where the previously billed period began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSetup {
    pub energy_price_per_kwh: f64,
    pub fixed_supplier_fee: f64,
    pub distribution_high_tariff: f64,
    pub distribution_low_tariff: f64,
    pub high_tariff_ratio: f64,
    pub breaker_fee: f64,
    /// Whole kWh billed over the previous period.
    pub last_annual_kwh: u32,
    /// Flat advance paid every month.
    pub monthly_payment: f64,
    pub billing_start: Month,
    pub billing_end: Month,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributor: Option<String>,
    #[serde(default = "ContractSetup::schema_version_default")]
    pub schema_version: u8,
}

impl ContractSetup {
    pub fn tariff_config(&self, constants: TariffConstants) -> TariffConfig {
        TariffConfig::new(
            self.energy_price_per_kwh,
            self.fixed_supplier_fee,
            self.distribution_high_tariff,
            self.distribution_low_tariff,
            self.high_tariff_ratio,
            self.breaker_fee,
        )
        .with_constants(constants)
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
