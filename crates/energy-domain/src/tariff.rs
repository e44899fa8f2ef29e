use serde::{Deserialize, Serialize};

/// Regulated fee figures published for the tariff year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffConstants {
    pub tax_per_mwh: f64,
    pub system_services_per_mwh: f64,
    /// Charged per month, independent of consumption.
    pub infrastructure_fee: f64,
    /// Renewable-energy surcharge.
    pub poze_per_mwh: f64,
}

impl Default for TariffConstants {
    fn default() -> Self {
        Self {
            tax_per_mwh: 28.30,
            system_services_per_mwh: 170.92,
            infrastructure_fee: 2.89,
            poze_per_mwh: 495.0,
        }
    }
}

/// Supplier and distributor rates for a single household contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub energy_price_per_kwh: f64,
    pub fixed_supplier_fee: f64,
    pub high_tariff_mwh: f64,
    pub low_tariff_mwh: f64,
    /// Share of consumption billed at the high distribution rate, in `[0, 1]`.
    pub high_tariff_ratio: f64,
    pub breaker_fee: f64,
    #[serde(default)]
    pub constants: TariffConstants,
}

impl TariffConfig {
    pub fn new(
        energy_price_per_kwh: f64,
        fixed_supplier_fee: f64,
        high_tariff_mwh: f64,
        low_tariff_mwh: f64,
        high_tariff_ratio: f64,
        breaker_fee: f64,
    ) -> Self {
        Self {
            energy_price_per_kwh,
            fixed_supplier_fee,
            high_tariff_mwh,
            low_tariff_mwh,
            high_tariff_ratio,
            breaker_fee,
            constants: TariffConstants::default(),
        }
    }

    pub fn with_constants(mut self, constants: TariffConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Monthly charges that do not depend on consumption.
    pub fn monthly_fixed_charge(&self) -> f64 {
        self.fixed_supplier_fee + self.breaker_fee + self.constants.infrastructure_fee
    }
}
