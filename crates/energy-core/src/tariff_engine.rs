//! Billed amount for a period from consumption and contract rates.
//!
//! Rounding points are part of the result: the regulatory component is rounded
//! to cents before summation and the VAT-inclusive total is rounded again.

use energy_domain::{round2, TariffConfig};

use crate::CoreError;

pub const VAT_RATE: f64 = 0.21;
const VAT_MULTIPLIER: f64 = 1.21;
const KWH_PER_MWH: f64 = 1000.0;

/// Component parts of a computed bill, before and after VAT.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TariffBreakdown {
    pub energy: f64,
    pub distribution: f64,
    pub regulatory: f64,
    pub fixed: f64,
    pub vat: f64,
    pub total: f64,
}

impl TariffBreakdown {
    pub fn subtotal(&self) -> f64 {
        self.energy + self.distribution + self.regulatory + self.fixed
    }
}

/// Consumption-independent charges over `month_count` months.
pub fn fixed_fees(config: &TariffConfig, month_count: u32) -> f64 {
    config.monthly_fixed_charge() * f64::from(month_count)
}

pub fn calculate_tariff(month_count: u32, consumption_kwh: u32, config: &TariffConfig) -> f64 {
    tariff_breakdown(month_count, consumption_kwh, config).total
}

/// A period without consumption bills nothing, fixed fees included.
pub fn tariff_breakdown(
    month_count: u32,
    consumption_kwh: u32,
    config: &TariffConfig,
) -> TariffBreakdown {
    if consumption_kwh == 0 {
        return TariffBreakdown::default();
    }
    let kwh = f64::from(consumption_kwh);
    let mwh = kwh / KWH_PER_MWH;

    let energy = kwh * config.energy_price_per_kwh;

    let high = mwh * config.high_tariff_ratio * config.high_tariff_mwh;
    let low = mwh * (1.0 - config.high_tariff_ratio) * config.low_tariff_mwh;
    let distribution = high + low;

    let constants = &config.constants;
    let regulatory = round2(
        mwh * constants.tax_per_mwh
            + mwh * constants.system_services_per_mwh
            + mwh * constants.poze_per_mwh,
    );

    let fixed = fixed_fees(config, month_count);

    let subtotal = energy + distribution + regulatory + fixed;
    TariffBreakdown {
        energy,
        distribution,
        regulatory,
        fixed,
        vat: round2(subtotal * VAT_RATE),
        total: round2(subtotal * VAT_MULTIPLIER),
    }
}

/// Checks the ratio bound and that every rate is a non-negative number.
pub fn validate_config(config: &TariffConfig) -> Result<(), CoreError> {
    let constants = &config.constants;
    let fields = [
        ("energy price per kWh", config.energy_price_per_kwh),
        ("fixed supplier fee", config.fixed_supplier_fee),
        ("high tariff price", config.high_tariff_mwh),
        ("low tariff price", config.low_tariff_mwh),
        ("breaker fee", config.breaker_fee),
        ("tax per MWh", constants.tax_per_mwh),
        ("system services per MWh", constants.system_services_per_mwh),
        ("infrastructure fee", constants.infrastructure_fee),
        ("POZE per MWh", constants.poze_per_mwh),
    ];
    for (label, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(CoreError::Validation(format!(
                "{label} must be a non-negative number"
            )));
        }
    }
    let ratio = config.high_tariff_ratio;
    if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
        return Err(CoreError::Validation(
            "high tariff ratio must be between 0 and 1".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use energy_domain::TariffConstants;

    fn config() -> TariffConfig {
        TariffConfig::new(5.0, 100.0, 1000.0, 500.0, 0.5, 50.0)
    }

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn two_month_bill_matches_reference_amount() {
        let total = calculate_tariff(2, 200, &config());
        assert!(close(total, 1929.49), "got {total}");
    }

    #[test]
    fn zero_consumption_bills_nothing() {
        assert_eq!(calculate_tariff(1, 0, &config()), 0.0);
        assert_eq!(calculate_tariff(12, 0, &config()), 0.0);
        assert_eq!(tariff_breakdown(6, 0, &config()), TariffBreakdown::default());
    }

    #[test]
    fn fixed_fees_reference_values() {
        assert!(close(fixed_fees(&config(), 2), 305.78));
        assert_eq!(fixed_fees(&config(), 0), 0.0);
    }

    #[test]
    fn fixed_fees_scale_linearly() {
        let cfg = config();
        let single = fixed_fees(&cfg, 1);
        for months in 0..=24 {
            assert!(close(fixed_fees(&cfg, months), single * f64::from(months)));
        }
    }

    #[test]
    fn breakdown_components_add_up() {
        let breakdown = tariff_breakdown(2, 200, &config());
        assert!(close(breakdown.energy, 1000.0));
        assert!(close(breakdown.distribution, 150.0));
        assert!(close(breakdown.regulatory, 138.84));
        assert!(close(breakdown.fixed, 305.78));
        assert!(close(breakdown.subtotal(), 1594.62));
        assert!(close(breakdown.total, 1929.49));
    }

    #[test]
    fn constants_override_changes_regulatory_part() {
        let cfg = config().with_constants(TariffConstants {
            poze_per_mwh: 0.0,
            ..TariffConstants::default()
        });
        let breakdown = tariff_breakdown(1, 1000, &cfg);
        assert!(close(breakdown.regulatory, 199.22));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        assert!(validate_config(&config()).is_ok());

        let mut cfg = config();
        cfg.high_tariff_ratio = 1.2;
        assert!(validate_config(&cfg).unwrap_err().is_validation());

        let mut cfg = config();
        cfg.breaker_fee = -1.0;
        assert!(validate_config(&cfg).unwrap_err().is_validation());

        let mut cfg = config();
        cfg.energy_price_per_kwh = f64::NAN;
        assert!(validate_config(&cfg).is_err());
    }
}
