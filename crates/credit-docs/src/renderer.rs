//! Record to PDF bytes

use crate::assets::AssetSource;
use crate::config::RenderConfig;
use crate::decoration::BorderDecoration;
use crate::schema::{DirectDebitMandate, DocumentRecord};
use crate::typesetter::{PageCanvas, Typesetter};
use crate::{guarantee, mandate, offer, DocError, Result};
use pdf_core::{
    FlowBlock, FlowRenderer, FontFamily, FontFamilyBuilder, Frame, PageDecorator, PdfDocument, MM,
};

/// Name the body font family is registered under
const BODY_FAMILY: &str = "body";
const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Renders [`DocumentRecord`]s with one configuration and asset source
pub struct DocumentRenderer<'a> {
    config: &'a RenderConfig,
    assets: &'a dyn AssetSource,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(config: &'a RenderConfig, assets: &'a dyn AssetSource) -> Self {
        Self { config, assets }
    }

    /// Render one record to a complete PDF
    ///
    /// Missing images and fonts degrade the output instead of failing; only
    /// errors from the PDF surface itself are returned.
    pub fn render(&self, record: &DocumentRecord) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new();
        self.load_fonts(&mut doc)?;

        let pages = match record {
            DocumentRecord::CreditOffer(record) => {
                let blocks = offer::build_offer(record, self.config, self.assets);
                self.render_flow(&mut doc, &blocks, offer::MARGIN_MM)?
            }
            DocumentRecord::DirectDebitMandate(record) => self.render_mandate(&mut doc, record)?,
            DocumentRecord::GuaranteeLetter(record) => {
                let blocks = guarantee::build_guarantee(record, self.config);
                self.render_flow(&mut doc, &blocks, guarantee::MARGIN_MM)?
            }
        };

        let bytes = doc.to_bytes()?;
        tracing::info!(
            kind = record.kind(),
            pages,
            bytes = bytes.len(),
            "rendered document"
        );
        Ok(bytes)
    }

    /// Register the body family, falling back to built-in Courier
    fn load_fonts(&self, doc: &mut PdfDocument) -> Result<()> {
        let family = match self.load_font_family() {
            Ok(Some(family)) => family,
            Ok(None) => FontFamily::builtin_monospace(),
            Err(err) => {
                tracing::warn!(error = %err, "using built-in Courier for the whole document");
                FontFamily::builtin_monospace()
            }
        };

        doc.register_font_family(BODY_FAMILY, family)?;
        doc.set_font(BODY_FAMILY, DEFAULT_FONT_SIZE)?;
        Ok(())
    }

    /// The configured TrueType family, `None` when no font is configured
    fn load_font_family(&self) -> Result<Option<FontFamily>> {
        let assets = &self.config.assets;
        let Some(regular) = &assets.font_regular else {
            return Ok(None);
        };

        let mut builder = FontFamilyBuilder::new().regular(self.assets.read_font(regular)?);
        if let Some(bold) = &assets.font_bold {
            builder = builder.bold(self.assets.read_font(bold)?);
        }

        builder
            .build(BODY_FAMILY)
            .map(Some)
            .map_err(|e| DocError::FontMissing(format!("{}: {}", regular.display(), e)))
    }

    fn render_flow(&self, doc: &mut PdfDocument, blocks: &[FlowBlock], margin_mm: f64) -> Result<usize> {
        let renderer = FlowRenderer::new(Frame::a4(margin_mm), BODY_FAMILY)
            .with_decorator(BorderDecoration::new(BODY_FAMILY));
        Ok(renderer.render(doc, blocks)?)
    }

    fn render_mandate(&self, doc: &mut PdfDocument, record: &DirectDebitMandate) -> Result<usize> {
        let page = doc.add_blank_page()?;
        let (width, height) = doc.page_size(page)?;
        let content_width = width - 2.0 * mandate::MARGIN_MM * MM;

        {
            let canvas = PageCanvas::new(doc, page, BODY_FAMILY)?;
            let mut typesetter = Typesetter::new(canvas, mandate::first_line_cursor(height));
            mandate::typeset_mandate(&mut typesetter, record, self.config, content_width)?;
        }

        BorderDecoration::new(BODY_FAMILY).decorate(doc, page)?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::FsAssets;
    use crate::schema::GuaranteeLetter;

    #[test]
    fn test_unreadable_font_falls_back_to_courier() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.ttf"), b"not a font").unwrap();

        let mut config = RenderConfig::default();
        config.assets.font_regular = Some("broken.ttf".into());
        config.assets.font_bold = Some("missing-bold.ttf".into());
        let assets = FsAssets::new(dir.path());

        let renderer = DocumentRenderer::new(&config, &assets);
        assert!(matches!(renderer.load_font_family(), Err(DocError::FontMissing(_))));

        let record = DocumentRecord::GuaranteeLetter(GuaranteeLetter::default());
        let bytes = renderer.render(&record).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_no_font_configured_uses_courier_silently() {
        let config = RenderConfig::default();
        let assets = FsAssets::new("/nonexistent");
        let renderer = DocumentRenderer::new(&config, &assets);
        assert!(matches!(renderer.load_font_family(), Ok(None)));
    }
}
