//! Input bounds for loan parameters entered by an operator

use crate::{parse_locale_number, FormatError, RangeError};

/// Highest accepted nominal annual rate (TAN), percent
pub const MAX_NOMINAL_RATE: f64 = 40.0;
/// Highest accepted effective annual rate (TAEG), percent
pub const MAX_EFFECTIVE_RATE: f64 = 50.0;
pub const MIN_TERM_MONTHS: i64 = 1;
pub const MAX_TERM_MONTHS: i64 = 180;

/// Principal must be strictly positive
pub fn validate_principal(value: f64) -> Result<f64, RangeError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(RangeError {
            field: "principal",
            value,
            expected: "> 0",
        })
    }
}

pub fn validate_nominal_rate(value: f64) -> Result<f64, RangeError> {
    in_range("nominal rate", value, 0.0, MAX_NOMINAL_RATE, "0-40")
}

pub fn validate_effective_rate(value: f64) -> Result<f64, RangeError> {
    in_range("effective rate", value, 0.0, MAX_EFFECTIVE_RATE, "0-50")
}

pub fn validate_term_months(months: i64) -> Result<u32, RangeError> {
    if (MIN_TERM_MONTHS..=MAX_TERM_MONTHS).contains(&months) {
        // bounded by MAX_TERM_MONTHS
        Ok(months as u32)
    } else {
        Err(RangeError {
            field: "term",
            value: months as f64,
            expected: "1-180 months",
        })
    }
}

/// Parse a term in months; fractional input is truncated toward zero
pub fn parse_term_months(text: &str) -> Result<i64, FormatError> {
    let value = parse_locale_number(text)?;
    Ok(value.trunc() as i64)
}

fn in_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
) -> Result<f64, RangeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(RangeError {
            field,
            value,
            expected,
        })
    }
}
