//! Credit Calc - loan arithmetic and Italian-locale number formatting
//!
//! This crate provides:
//! - Constant-payment amortization (monthly payment, total interest, total payable)
//! - Parsing of numbers written as `12.000,50`
//! - Currency, percent, term and timestamp formatting for printed offers
//! - The input bounds enforced when collecting loan parameters
//!
//! # Example
//!
//! ```ignore
//! use credit_calc::{format_currency, parse_locale_number, LoanTerms};
//!
//! let principal = parse_locale_number("12.000,00")?;
//! let schedule = LoanTerms::new(principal, 6.45, 48).schedule();
//! assert_eq!(format_currency(schedule.periodic_payment), "€ 284,30");
//! ```

mod bounds;
mod formatter;
mod schedule;

pub use bounds::{
    parse_term_months, validate_effective_rate, validate_nominal_rate, validate_principal,
    validate_term_months, MAX_EFFECTIVE_RATE, MAX_NOMINAL_RATE, MAX_TERM_MONTHS, MIN_TERM_MONTHS,
};
pub use formatter::{
    format_currency, format_grouped, format_months, format_percent, format_timestamp,
    parse_locale_number, CURRENCY_PREFIX,
};
pub use schedule::{monthly_payment, LoanTerms, PaymentSchedule};

use thiserror::Error;

/// Errors from parsing user-entered numbers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("Empty number")]
    Empty,

    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
}

/// A parsed value outside the accepted input bounds
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field} out of range: {value} (expected {expected})")]
pub struct RangeError {
    pub field: &'static str,
    pub value: f64,
    pub expected: &'static str,
}
