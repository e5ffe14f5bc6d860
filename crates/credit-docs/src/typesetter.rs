//! Cursor typesetting
//!
//! Places text segment by segment at an explicit position, the way a form is
//! filled in by hand. Coordinates are PDF points with the origin at the
//! bottom-left of the page: the cursor starts near the top and `y` only ever
//! decreases. There is no page-overflow detection; callers size their content
//! to fit one page.

use crate::Result;
use pdf_core::{wrap_to_width, Align, FontWeight, PdfDocument, TextMeasure};

/// A surface text can be drawn on
pub trait Canvas: TextMeasure {
    /// Draw `text` with its baseline starting at `(x, y)`, bottom-left origin
    fn draw_text(&mut self, text: &str, weight: FontWeight, size: f32, x: f64, y: f64)
        -> Result<()>;
}

/// One page of a [`PdfDocument`] drawn with a single font family
pub struct PageCanvas<'a> {
    doc: &'a mut PdfDocument,
    page: usize,
    family: String,
    page_height: f64,
}

impl<'a> PageCanvas<'a> {
    /// `family` must already be registered with `doc`
    pub fn new(doc: &'a mut PdfDocument, page: usize, family: &str) -> Result<Self> {
        let (_, page_height) = doc.page_size(page)?;
        let size = doc.font_size();
        doc.set_font(family, size)?;
        Ok(Self {
            doc,
            page,
            family: family.to_string(),
            page_height,
        })
    }
}

impl TextMeasure for PageCanvas<'_> {
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f64 {
        self.doc.text_width(text, weight, size)
    }
}

impl Canvas for PageCanvas<'_> {
    fn draw_text(
        &mut self,
        text: &str,
        weight: FontWeight,
        size: f32,
        x: f64,
        y: f64,
    ) -> Result<()> {
        self.doc.set_font(&self.family, size)?;
        self.doc.set_font_weight(weight)?;
        self.doc
            .insert_text(text, self.page, x, self.page_height - y, Align::Left)?;
        Ok(())
    }
}

/// Position and type state of a [`Typesetter`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
    pub line_height: f64,
    pub left_margin: f64,
    pub font_size: f32,
}

impl Cursor {
    /// Cursor at `(left_margin, top)`
    pub fn new(left_margin: f64, top: f64, line_height: f64, font_size: f32) -> Self {
        Self {
            x: left_margin,
            y: top,
            line_height,
            left_margin,
            font_size,
        }
    }
}

fn weight(bold: bool) -> FontWeight {
    if bold {
        FontWeight::Bold
    } else {
        FontWeight::Regular
    }
}

/// Single-pass text placement on one canvas
///
/// ```ignore
/// let mut ts = Typesetter::new(canvas, Cursor::new(50.0, 800.0, 15.0, 10.5));
/// ts.place_label_value("IBAN: ", &mandate.iban, true, false)?;
/// ts.newline(1);
/// ```
pub struct Typesetter<C: Canvas> {
    canvas: C,
    cursor: Cursor,
}

impl<C: Canvas> Typesetter<C> {
    pub fn new(canvas: C, cursor: Cursor) -> Self {
        Self { canvas, cursor }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn into_canvas(self) -> C {
        self.canvas
    }

    /// Size used by the label/value and line helpers
    pub fn set_font_size(&mut self, size: f32) {
        self.cursor.font_size = size;
    }

    pub fn measure_width(&self, text: &str, bold: bool, size: f32) -> f64 {
        self.canvas.text_width(text, weight(bold), size)
    }

    /// Longest whole-character prefix of `text` no wider than `max_width`
    ///
    /// Measured at the cursor font size. Returns `text` unchanged when it
    /// already fits.
    pub fn clip_to_width<'t>(&self, text: &'t str, max_width: f64, bold: bool) -> &'t str {
        let size = self.cursor.font_size;
        if self.measure_width(text, bold, size) <= max_width {
            return text;
        }

        let mut end = 0;
        for (i, c) in text.char_indices() {
            let next = i + c.len_utf8();
            if self.measure_width(&text[..next], bold, size) > max_width {
                break;
            }
            end = next;
        }

        tracing::debug!(text, kept = &text[..end], max_width, "clipped text to column");
        &text[..end]
    }

    /// Draw at the cursor and advance `x` past the text
    pub fn place_segment(&mut self, text: &str, bold: bool, size: f32) -> Result<()> {
        self.canvas
            .draw_text(text, weight(bold), size, self.cursor.x, self.cursor.y)?;
        self.cursor.x += self.measure_width(text, bold, size);
        Ok(())
    }

    /// Return to the left margin `lines` lines lower
    pub fn newline(&mut self, lines: u32) {
        self.cursor.x = self.cursor.left_margin;
        self.cursor.y -= self.cursor.line_height * lines as f64;
    }

    pub fn place_line(&mut self, text: &str, bold: bool, size: f32) -> Result<()> {
        self.place_segment(text, bold, size)?;
        self.newline(1);
        Ok(())
    }

    /// `label` then `value` on one line, at the cursor font size
    pub fn place_label_value(
        &mut self,
        label: &str,
        value: &str,
        label_bold: bool,
        value_bold: bool,
    ) -> Result<()> {
        let size = self.cursor.font_size;
        self.place_segment(label, label_bold, size)?;
        self.place_segment(value, value_bold, size)?;
        self.newline(1);
        Ok(())
    }

    /// Word-wrap `text` to `max_width` and place each line
    pub fn place_paragraph(&mut self, text: &str, max_width: f64, bold: bool) -> Result<()> {
        let size = self.cursor.font_size;
        let lines = wrap_to_width(text, max_width, |candidate| {
            self.measure_width(candidate, bold, size)
        });
        for line in &lines {
            self.place_line(line, bold, size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pdf_core::FontFamily;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Placed {
        pub text: String,
        pub weight: FontWeight,
        pub size: f32,
        pub x: f64,
        pub y: f64,
    }

    /// Records every draw; each character is half the font size wide
    #[derive(Default)]
    pub(crate) struct RecordingCanvas {
        pub placed: Vec<Placed>,
    }

    impl TextMeasure for RecordingCanvas {
        fn text_width(&self, text: &str, _weight: FontWeight, size: f32) -> f64 {
            text.chars().count() as f64 * size as f64 / 2.0
        }
    }

    impl Canvas for RecordingCanvas {
        fn draw_text(
            &mut self,
            text: &str,
            weight: FontWeight,
            size: f32,
            x: f64,
            y: f64,
        ) -> Result<()> {
            self.placed.push(Placed {
                text: text.to_string(),
                weight,
                size,
                x,
                y,
            });
            Ok(())
        }
    }

    fn typesetter() -> Typesetter<RecordingCanvas> {
        Typesetter::new(RecordingCanvas::default(), Cursor::new(10.0, 100.0, 12.0, 10.0))
    }

    #[test]
    fn test_place_segment_advances_x() {
        let mut ts = typesetter();
        ts.place_segment("abcd", false, 10.0).unwrap();
        assert_eq!(ts.cursor().x, 30.0);
        ts.place_segment("ef", true, 4.0).unwrap();
        assert_eq!(ts.cursor().x, 34.0);

        let placed = ts.into_canvas().placed;
        assert_eq!(placed[1].x, 30.0);
        assert_eq!(placed[1].weight, FontWeight::Bold);
        assert_eq!(placed[1].y, 100.0);
    }

    #[test]
    fn test_newline_resets_x_and_lowers_y() {
        let mut ts = typesetter();
        ts.place_segment("abc", false, 10.0).unwrap();
        ts.newline(1);
        assert_eq!((ts.cursor().x, ts.cursor().y), (10.0, 88.0));
        ts.newline(2);
        assert_eq!(ts.cursor().y, 64.0);
    }

    #[test]
    fn test_place_label_value() {
        let mut ts = typesetter();
        ts.place_label_value("IBAN: ", "IT60", true, false).unwrap();
        assert_eq!(ts.cursor().y, 88.0);

        let placed = ts.into_canvas().placed;
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].weight, FontWeight::Bold);
        assert_eq!(placed[1].x, 10.0 + 6.0 * 5.0);
        assert_eq!(placed[1].text, "IT60");
        assert_eq!(placed[1].y, 100.0);
    }

    #[test]
    fn test_clip_to_width() {
        let ts = typesetter();
        // 5pt per character at size 10
        assert_eq!(ts.clip_to_width("Via Roma 1", 50.0, false), "Via Roma 1");
        assert_eq!(ts.clip_to_width("Via Roma 1", 22.0, false), "Via ");
        assert_eq!(ts.clip_to_width("Via Roma 1", 2.0, false), "");
        assert_eq!(ts.clip_to_width("Città", 20.0, false), "Citt");
    }

    #[test]
    fn test_clip_to_width_is_idempotent_and_bounded() {
        let ts = typesetter();
        let texts = ["", "a", "Piazza Garibaldi 12, 12051 Alba (CN)", "àèìòù àèìòù"];
        for text in texts {
            for max_width in [0.0, 3.0, 5.0, 17.5, 60.0, 500.0] {
                let clipped = ts.clip_to_width(text, max_width, false);
                assert!(text.starts_with(clipped));
                assert!(clipped.len() <= text.len());
                assert!(ts.measure_width(clipped, false, 10.0) <= max_width || clipped.is_empty());
                assert_eq!(ts.clip_to_width(clipped, max_width, false), clipped);
            }
        }
    }

    #[test]
    fn test_place_paragraph_wraps() {
        let mut ts = typesetter();
        ts.place_paragraph("uno due tre quattro", 40.0, false).unwrap();
        assert_eq!(ts.cursor().y, 100.0 - 3.0 * 12.0);

        let texts: Vec<String> = ts.into_canvas().placed.into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["uno due", "tre", "quattro"]);
    }

    #[test]
    fn test_page_canvas_converts_to_top_origin() {
        let mut doc = PdfDocument::new();
        doc.register_font_family("mono", FontFamily::builtin_monospace())
            .unwrap();
        let page = doc.add_page(600.0, 800.0).unwrap();

        let canvas = PageCanvas::new(&mut doc, page, "mono").unwrap();
        let mut ts = Typesetter::new(canvas, Cursor::new(50.0, 700.0, 14.0, 10.0));
        ts.place_line("Mandato", true, 10.0).unwrap();
        assert_eq!(ts.cursor().y, 686.0);
        drop(ts);

        let bytes = doc.to_bytes().unwrap();
        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = loaded.get_pages()[&1];
        let content = String::from_utf8_lossy(&loaded.get_page_content(page_id).unwrap()).into_owned();
        assert!(content.contains("50 700 Td"), "{content}");
        assert!(content.contains("(Mandato) Tj"), "{content}");
    }
}
