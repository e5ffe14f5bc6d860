//! Document records
//!
//! A record is everything the operator supplies for one document. Records are
//! read from JSON with a `kind` tag:
//!
//! ```json
//! { "kind": "credit_offer", "client_name": "Mario Bianchi",
//!   "terms": { "principal": 12000.0, "annual_rate_percent": 6.45, "term_months": 48 },
//!   "effective_rate_percent": 6.9, "created_at": "2025-03-07T09:05:00" }
//! ```

use chrono::NaiveDateTime;
use credit_calc::LoanTerms;
use serde::{Deserialize, Serialize};

/// Printed in place of an empty free-text field
pub const PLACEHOLDER: &str = "____________________";

/// SEPA creditor identifier printed on every mandate
pub const CREDITOR_SCHEME_ID: &str = "IT00ZZZ000000000000";

/// Reference printed on every mandate
pub const MANDATE_REFERENCE: &str = "MNDT-0000-0001";

/// `value` unless it is blank, else [`PLACEHOLDER`]
pub fn placeholder_or(value: &str) -> &str {
    if value.trim().is_empty() {
        PLACEHOLDER
    } else {
        value
    }
}

/// One document to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentRecord {
    CreditOffer(CreditOffer),
    DirectDebitMandate(DirectDebitMandate),
    GuaranteeLetter(GuaranteeLetter),
}

impl DocumentRecord {
    /// The `kind` tag of this record
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentRecord::CreditOffer(_) => "credit_offer",
            DocumentRecord::DirectDebitMandate(_) => "direct_debit_mandate",
            DocumentRecord::GuaranteeLetter(_) => "guarantee_letter",
        }
    }

    /// File name offered to whoever delivers the rendered bytes
    pub fn suggested_file_name(&self) -> &'static str {
        match self {
            DocumentRecord::CreditOffer(_) => "offerta_credito.pdf",
            DocumentRecord::DirectDebitMandate(_) => "mandato_sepa.pdf",
            DocumentRecord::GuaranteeLetter(_) => "lettera_garanzia.pdf",
        }
    }
}

/// Preliminary credit offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditOffer {
    #[serde(default)]
    pub client_name: String,
    pub terms: LoanTerms,
    /// Indicative effective annual rate (TAEG), percent
    pub effective_rate_percent: f64,
    pub created_at: NaiveDateTime,
}

/// SEPA direct-debit mandate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectDebitMandate {
    pub payer_name: String,
    pub address: String,
    /// City and region
    pub city: String,
    pub country: String,
    pub fiscal_code: String,
    pub iban: String,
    pub bic: String,
}

/// Letter requesting the guarantee deposit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuaranteeLetter {
    pub payer_name: String,
    pub fiscal_code: String,
    pub iban: String,
}
