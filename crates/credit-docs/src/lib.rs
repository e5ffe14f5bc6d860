//! Credit Docs - composition of credit documents into PDF bytes
//!
//! This crate provides:
//! - The document records (credit offer, direct-debit mandate, guarantee letter)
//! - Render configuration loaded from JSON
//! - Asset probing with graceful degradation for missing images
//! - A cursor typesetter for manually positioned text
//! - The red double border and page number drawn on every page
//! - One assembly function per record kind
//!
//! # Example
//!
//! ```ignore
//! use credit_docs::{DocumentRecord, DocumentRenderer, FsAssets, RenderConfig};
//!
//! let config = RenderConfig::from_file("render.json")?;
//! let record: DocumentRecord = serde_json::from_str(record_json)?;
//! let assets = FsAssets::new(&config.assets.base_dir);
//! let pdf_bytes = DocumentRenderer::new(&config, &assets).render(&record)?;
//! ```

mod assets;
mod config;
mod decoration;
pub mod guarantee;
pub mod mandate;
pub mod offer;
mod renderer;
mod schema;
pub mod typesetter;

pub use assets::{scale_signature, AssetSource, FsAssets, RenderedAsset};
pub use config::{AssetConfig, GuaranteeConfig, IssuerConfig, LogoSlot, RenderConfig};
pub use decoration::BorderDecoration;
pub use renderer::DocumentRenderer;
pub use schema::{
    placeholder_or, CreditOffer, DirectDebitMandate, DocumentRecord, GuaranteeLetter,
    CREDITOR_SCHEME_ID, MANDATE_REFERENCE, PLACEHOLDER,
};
pub use typesetter::{Canvas, Cursor, PageCanvas, Typesetter};

use thiserror::Error;

/// Errors that can occur while composing a document
///
/// `AssetMissing` and `FontMissing` never abort a render: the pipeline logs
/// them and degrades to a blank cell or the built-in monospace font.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("Asset missing: {0}")]
    AssetMissing(String),

    #[error("Font missing: {0}")]
    FontMissing(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),
}

/// Result type for document composition
pub type Result<T> = std::result::Result<T, DocError>;
