use colored::Colorize;

/// Amount formatting bound to the configured display currency.
#[derive(Debug, Clone)]
pub struct CliFormatters {
    currency: String,
}

impl CliFormatters {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// `1234.50 CZK`
    pub fn amount(&self, value: f64) -> String {
        format!("{:.2} {}", value, self.currency)
    }

    /// `+12.30 CZK` / `-4.10 CZK`, without colour.
    pub fn signed_plain(&self, value: f64) -> String {
        let sign = if value >= 0.0 { '+' } else { '-' };
        format!("{}{:.2} {}", sign, value.abs(), self.currency)
    }

    /// Overpayment in green, underpayment in red.
    pub fn signed(&self, value: f64) -> String {
        let text = self.signed_plain(value);
        if value >= 0.0 {
            text.green().to_string()
        } else {
            text.red().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amounts_carry_explicit_sign() {
        let fmt = CliFormatters::new("CZK");
        assert_eq!(fmt.signed_plain(12.3), "+12.30 CZK");
        assert_eq!(fmt.signed_plain(-4.1), "-4.10 CZK");
        assert_eq!(fmt.signed_plain(0.0), "+0.00 CZK");
        assert_eq!(fmt.amount(1929.49), "1929.49 CZK");
    }
}
