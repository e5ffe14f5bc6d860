//! PDF Core - Low-level PDF surface for generated documents
//!
//! This crate provides functionality for:
//! - Creating blank A4 documents
//! - Embedding TrueType fonts, or falling back to the built-in Courier family
//! - Inserting text at specific coordinates and measuring its width
//! - Inserting images (JPEG, PNG) and stroking rectangles/lines
//! - Laying out flowing blocks across pages with a per-page decoration hook
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamily, PdfDocument};
//!
//! let mut doc = PdfDocument::new();
//! doc.register_font_family("body", FontFamily::builtin_monospace())?;
//! doc.set_font("body", 12.0)?;
//! let page = doc.add_blank_page()?;
//! doc.insert_text("Hello, World!", page, 100.0, 100.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
pub mod flow;
mod font;
mod image;
mod text;

pub use document::{Color, LineStyle, PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use flow::{
    Cell, FlowBlock, FlowRenderer, Frame, ImageBlock, Padding, PageDecorator, ParagraphStyle, Span,
    Table, TableRow, TableStyle, VAlign,
};
pub use font::{BuiltinFont, FontData, FontFace, FontFamily, FontFamilyBuilder, FontWeight};
pub use image::{decode_dimensions, get_dimensions, ImageDimensions};
pub use text::{generate_text_operators, wrap_to_width, TextRenderContext};

use thiserror::Error;

/// Millimetres to PDF points
pub const MM: f64 = 72.0 / 25.4;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF structure error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch inter-word gaps to the full line width (flowing paragraphs only;
    /// a single positioned string treats it as `Left`)
    Justify,
}

/// Text width provider
///
/// Answers "how wide is this string" for a font weight and size in the
/// active font family. Implemented by [`PdfDocument`]; tests substitute
/// fixed-advance fakes.
pub trait TextMeasure {
    /// Width of `text` in points
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f64;
}
