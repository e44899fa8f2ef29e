//! Parsing of user-typed numbers.

use crate::CoreError;

/// Reads a decimal number, accepting either `.` or `,` as separator.
pub fn parse_decimal(value: &str) -> Result<f64, CoreError> {
    let normalized = value.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| CoreError::Validation(format!("`{}` is not a number", value.trim())))
}

/// Like [`parse_decimal`] but rejects negative values.
pub fn parse_amount(value: &str) -> Result<f64, CoreError> {
    let amount = parse_decimal(value)?;
    if amount < 0.0 {
        return Err(CoreError::Validation(format!(
            "`{}` must not be negative",
            value.trim()
        )));
    }
    Ok(amount)
}

/// Reads a meter consumption: digits only, whole kWh.
pub fn parse_whole_kwh(value: &str) -> Result<u32, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("enter a consumption in kWh".into()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "`{trimmed}` is not a whole number of kWh"
        )));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| CoreError::Validation(format!("`{trimmed}` kWh is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_accepts_point_and_comma() {
        assert_eq!(parse_decimal("123").unwrap(), 123.0);
        assert_eq!(parse_decimal("123.45").unwrap(), 123.45);
        assert_eq!(parse_decimal("123,45").unwrap(), 123.45);
        assert_eq!(parse_decimal("-123,45").unwrap(), -123.45);
    }

    #[test]
    fn decimal_rejects_garbage() {
        for raw in ["abc", "12a34", "", "inf", "NaN"] {
            let err = parse_decimal(raw).unwrap_err();
            assert!(err.is_validation(), "{raw} should be a validation error");
        }
    }

    #[test]
    fn amount_rejects_negative() {
        assert!(parse_amount("-1").unwrap_err().is_validation());
        assert_eq!(parse_amount("0,5").unwrap(), 0.5);
    }

    #[test]
    fn whole_kwh_requires_digits() {
        assert_eq!(parse_whole_kwh(" 250 ").unwrap(), 250);
        assert_eq!(parse_whole_kwh("0").unwrap(), 0);
        assert!(parse_whole_kwh("").is_err());
        assert!(parse_whole_kwh("-5").is_err());
        assert!(parse_whole_kwh("12.5").is_err());
        assert!(parse_whole_kwh("99999999999").is_err());
    }
}
