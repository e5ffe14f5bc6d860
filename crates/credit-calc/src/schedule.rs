//! Constant-payment amortization

use serde::{Deserialize, Serialize};

/// Monthly payment of a loan repaid in equal instalments
///
/// `annual_rate_percent` is the nominal annual rate (`6.45` for 6.45 %),
/// compounded monthly. A non-positive term yields `0.0`; a zero rate spreads
/// the principal evenly. No rounding is applied.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_months: i64) -> f64 {
    if term_months <= 0 {
        return 0.0;
    }

    let rate = annual_rate_percent / 100.0 / 12.0;
    if rate == 0.0 {
        return principal / term_months as f64;
    }

    let periods = i32::try_from(term_months).unwrap_or(i32::MAX);
    principal * rate / (1.0 - (1.0 + rate).powi(-periods))
}

/// Principal, nominal annual rate and term of one loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    pub fn schedule(&self) -> PaymentSchedule {
        PaymentSchedule::from_terms(self)
    }
}

/// Amounts derived from [`LoanTerms`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSchedule {
    pub periodic_payment: f64,
    pub total_interest: f64,
    pub total_payable: f64,
}

impl PaymentSchedule {
    pub fn from_terms(terms: &LoanTerms) -> Self {
        let term = i64::from(terms.term_months);
        let periodic_payment = monthly_payment(terms.principal, terms.annual_rate_percent, term);
        let total_interest = periodic_payment * term as f64 - terms.principal;

        Self {
            periodic_payment,
            total_interest,
            total_payable: terms.principal + total_interest,
        }
    }
}
