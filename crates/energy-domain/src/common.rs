//! Shared constants and numeric helpers for billing primitives.

/// Number of symbols in the month cycle.
pub const MONTHS_PER_YEAR: usize = 12;

/// Persisted record schema version for ledger and contract datasets.
pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Rounds a monetary value to two decimal places.
///
/// Rounds the exact binary value, with exact half-cent ties going to the even
/// cent: `719.125` becomes `719.12` while `192.795`, stored just below the
/// tie, becomes `192.79`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(1929.4902), 1929.49);
        assert_eq!(round2(138.844), 138.84);
        assert_eq!(round2(-0.005), -0.01);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn round2_sends_exact_ties_to_even_cent() {
        assert_eq!(round2(719.125), 719.12);
        assert_eq!(round2(780.875), 780.88);
        assert_eq!(round2(863.375), 863.38);
        assert_eq!(round2(-0.125), -0.12);
    }

    #[test]
    fn round2_follows_the_stored_value_near_ties() {
        assert_eq!(round2(192.795), 192.79);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }
}
