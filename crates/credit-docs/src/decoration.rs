//! Border and page number drawn on every page

use pdf_core::{Align, Color, FontWeight, LineStyle, PageDecorator, PdfDocument, MM};

const BORDER_MARGIN_MM: f64 = 10.0;
/// Gap between the outer and inner border, points
const INNER_OFFSET: f64 = 6.0;
const BORDER_WIDTH: f64 = 2.0;
const PAGE_NUMBER_SIZE: f32 = 9.0;
const PAGE_NUMBER_BASELINE_MM: f64 = 5.0;

/// Red double border with the page number centred below it
pub struct BorderDecoration {
    family: String,
}

impl BorderDecoration {
    /// `family` is the monospace family the page number is set in
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
        }
    }
}

impl PageDecorator for BorderDecoration {
    fn decorate(&self, doc: &mut PdfDocument, page: usize) -> pdf_core::Result<()> {
        let (width, height) = doc.page_size(page)?;
        let style = LineStyle::new(BORDER_WIDTH, Color::red());

        let outer = BORDER_MARGIN_MM * MM;
        let inner = outer + INNER_OFFSET;
        for margin in [outer, inner] {
            doc.draw_rect(
                page,
                margin,
                margin,
                width - 2.0 * margin,
                height - 2.0 * margin,
                &style,
            )?;
        }

        doc.set_font(&self.family, PAGE_NUMBER_SIZE)?;
        doc.set_font_weight(FontWeight::Regular)?;
        doc.set_text_color(Color::black());
        doc.insert_text(
            &page.to_string(),
            page,
            width / 2.0,
            height - PAGE_NUMBER_BASELINE_MM * MM,
            Align::Center,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf_core::FontFamily;

    #[test]
    fn test_decorates_each_page() {
        let mut doc = PdfDocument::new();
        doc.register_font_family("mono", FontFamily::builtin_monospace())
            .unwrap();
        doc.add_blank_page().unwrap();
        doc.add_blank_page().unwrap();

        let decoration = BorderDecoration::new("mono");
        decoration.decorate(&mut doc, 1).unwrap();
        decoration.decorate(&mut doc, 2).unwrap();
        assert!(decoration.decorate(&mut doc, 3).is_err());

        let bytes = doc.to_bytes().unwrap();
        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        for (number, page_id) in loaded.get_pages() {
            let content =
                String::from_utf8_lossy(&loaded.get_page_content(page_id).unwrap()).into_owned();
            assert_eq!(content.matches(" re\n").count(), 2, "{content}");
            assert!(content.contains("1 0 0 RG"));
            assert!(content.contains("2 w"));
            assert!(content.contains(&format!("({number}) Tj")));
        }
    }
}
