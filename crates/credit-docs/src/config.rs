//! Render configuration
//!
//! Every field has a default, so `{}` is a complete configuration. Asset paths
//! are relative to `assets.base_dir`; a path that does not resolve is simply
//! left out of the document.

use crate::{DocError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub assets: AssetConfig,
    pub issuer: IssuerConfig,
    pub guarantee: GuaranteeConfig,
    /// Printed after the offer creation timestamp
    pub timezone_label: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            issuer: IssuerConfig::default(),
            guarantee: GuaranteeConfig::default(),
            timezone_label: "ora di Roma".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        for slot in &self.assets.logos {
            let sizes = [slot.width_mm, slot.height_mm, slot.column_mm];
            if sizes.iter().any(|size| size.is_nan() || *size <= 0.0) {
                return Err(DocError::Config(format!(
                    "logo {} needs positive width, height and column",
                    slot.path.display()
                )));
            }
        }
        let amount = self.guarantee.amount;
        if amount.is_nan() || amount < 0.0 {
            return Err(DocError::Config(format!(
                "guarantee amount must be non-negative, got {amount}"
            )));
        }
        Ok(())
    }
}

/// Where images and fonts live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub base_dir: PathBuf,
    /// TrueType font for body text; the built-in Courier family when unset
    /// or unreadable
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
    /// Header logos, left to right
    pub logos: Vec<LogoSlot>,
    pub lender_signature: PathBuf,
    pub intermediary_signature: PathBuf,
    pub stamp: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            font_regular: None,
            font_bold: None,
            logos: vec![
                LogoSlot::new("logo_lender.png", 65.0, 100.0),
                LogoSlot::new("logo_partner_1.png", 18.0, 25.0),
                LogoSlot::new("logo_partner_2.png", 18.0, 25.0),
            ],
            lender_signature: PathBuf::from("signature_lender.png"),
            intermediary_signature: PathBuf::from("signature_intermediary.png"),
            stamp: PathBuf::from("stamp.png"),
        }
    }
}

/// One cell of the offer header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoSlot {
    pub path: PathBuf,
    pub width_mm: f64,
    #[serde(default = "default_logo_height")]
    pub height_mm: f64,
    /// Width of the table column holding the logo
    pub column_mm: f64,
}

fn default_logo_height() -> f64 {
    16.0
}

impl LogoSlot {
    pub fn new(path: impl Into<PathBuf>, width_mm: f64, column_mm: f64) -> Self {
        Self {
            path: path.into(),
            width_mm,
            height_mm: default_logo_height(),
            column_mm,
        }
    }
}

/// Names and addresses printed on the documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    pub lender_name: String,
    pub lender_address: String,
    pub intermediary_name: String,
    /// Register entry of the credit intermediary
    pub intermediary_registration: String,
    pub contact_line: String,
    pub lender_representative: String,
    pub intermediary_representative: String,
    /// Creditor block of the mandate
    pub creditor_address_lines: Vec<String>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            lender_name: "Istituto di Credito".to_string(),
            lender_address: "Indirizzo della sede legale".to_string(),
            intermediary_name: "Intermediario del Credito".to_string(),
            intermediary_registration: "Iscrizione OAM n. ______".to_string(),
            contact_line: "Contatti: indirizzo e-mail e telefono dell'intermediario".to_string(),
            lender_representative: "Rappresentante dell'istituto".to_string(),
            intermediary_representative: "Rappresentante dell'intermediario".to_string(),
            creditor_address_lines: vec![
                "Indirizzo della sede legale".to_string(),
                "CAP, citta, provincia".to_string(),
                "Italia".to_string(),
            ],
        }
    }
}

/// Terms of the guarantee deposit letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuaranteeConfig {
    pub amount: f64,
    pub payment_deadline_days: u32,
}

impl Default for GuaranteeConfig {
    fn default() -> Self {
        Self {
            amount: 0.0,
            payment_deadline_days: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(RenderConfig::from_json("{}").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = RenderConfig::from_json(
            r#"{
                "issuer": { "lender_name": "Banca Esempio S.p.A." },
                "assets": {
                    "base_dir": "/srv/assets",
                    "logos": [{ "path": "logo.png", "width_mm": 40.0, "column_mm": 60.0 }]
                },
                "guarantee": { "amount": 250.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.issuer.lender_name, "Banca Esempio S.p.A.");
        assert_eq!(config.issuer.contact_line, IssuerConfig::default().contact_line);
        assert_eq!(config.assets.base_dir, PathBuf::from("/srv/assets"));
        assert_eq!(config.assets.logos.len(), 1);
        assert_eq!(config.assets.logos[0].height_mm, 16.0);
        assert_eq!(config.guarantee.amount, 250.0);
        assert_eq!(config.guarantee.payment_deadline_days, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = RenderConfig::from_json(
            r#"{"assets": {"logos": [{"path": "a.png", "width_mm": 0.0, "column_mm": 20.0}]}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocError::Config(_)), "{err}");

        let err = RenderConfig::from_json(r#"{"guarantee": {"amount": -1.0}}"#).unwrap_err();
        assert!(matches!(err, DocError::Config(_)), "{err}");

        let err = RenderConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, DocError::Json(_)), "{err}");
    }

    #[test]
    fn test_from_file_missing() {
        let err = RenderConfig::from_file("/nonexistent/render.json").unwrap_err();
        assert!(matches!(err, DocError::Io(_)));
    }
}
