//! Font handling for PDF documents

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::HashSet;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Standard-14 fonts usable without embedding
///
/// Only the Courier pair is supported: it is monospaced, so its metrics
/// need no width tables (every glyph advances 600/1000 em).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Courier,
    CourierBold,
}

impl BuiltinFont {
    /// Glyph advance in 1/1000 em
    pub const ADVANCE: u16 = 600;

    /// PostScript base font name
    pub fn base_font(self) -> &'static str {
        match self {
            BuiltinFont::Courier => "Courier",
            BuiltinFont::CourierBold => "Courier-Bold",
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(self, text: &str, font_size: f32) -> f32 {
        let chars = text.chars().count() as f32;
        chars * Self::ADVANCE as f32 * font_size / 1000.0
    }

    /// Simple Type1 font dictionary
    pub fn to_pdf_dictionary(self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Object::Name(self.base_font().as_bytes().to_vec())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Map a character to its WinAnsiEncoding byte
///
/// Characters outside the code page map to `None`.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' => Some(c as u8),
        '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
        '€' => Some(0x80),
        '‚' => Some(0x82),
        '„' => Some(0x84),
        '…' => Some(0x85),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '™' => Some(0x99),
        _ => None,
    }
}

/// Encode text as a PDF literal string in WinAnsiEncoding
///
/// Unmappable characters become `?` so the glyph count (and therefore the
/// monospace width) stays the same as the measured string.
pub fn encode_win_ansi(text: &str) -> String {
    let mut result = String::from("(");
    for c in text.chars() {
        let byte = win_ansi_byte(c).unwrap_or(b'?');
        match byte {
            b'(' | b')' | b'\\' => {
                result.push('\\');
                result.push(byte as char);
            }
            0x20..=0x7E => result.push(byte as char),
            _ => result.push_str(&format!("\\{byte:03o}")),
        }
    }
    result.push(')');
    result
}

/// Font data structure for embedded fonts
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters used (for the widths array and ToUnicode map)
    pub used_chars: HashSet<char>,
    /// Parsed font face
    face: Option<ttf_parser::Face<'static>>,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

/// One concrete font variant: embedded TrueType or built-in
#[derive(Debug, Clone)]
pub enum FontFace {
    Embedded(FontData),
    Builtin(BuiltinFont),
}

impl FontFace {
    /// Internal font name (key for page resources)
    pub fn name(&self) -> &str {
        match self {
            FontFace::Embedded(data) => &data.name,
            FontFace::Builtin(font) => font.base_font(),
        }
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        match self {
            FontFace::Embedded(data) => data.text_width_points(text, font_size),
            FontFace::Builtin(font) => font.text_width_points(text, font_size),
        }
    }

    /// Record characters drawn with this face
    pub fn add_chars(&mut self, text: &str) {
        if let FontFace::Embedded(data) = self {
            data.add_chars(text);
        }
    }

    /// Encode text as a string operand for the `Tj` operator
    pub fn encode_text(&self, text: &str) -> String {
        match self {
            FontFace::Embedded(data) => data.encode_text_hex(text),
            FontFace::Builtin(_) => encode_win_ansi(text),
        }
    }

    /// Whether this is a built-in (non-embedded) font
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin(_))
    }
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    /// Regular variant (required)
    pub regular: FontFace,
    /// Bold variant
    pub bold: Option<FontFace>,
}

impl FontFamily {
    /// The built-in Courier / Courier-Bold family
    pub fn builtin_monospace() -> Self {
        Self {
            regular: FontFace::Builtin(BuiltinFont::Courier),
            bold: Some(FontFace::Builtin(BuiltinFont::CourierBold)),
        }
    }

    /// Get the face for the specified weight
    /// Falls back to regular if bold is not available
    pub fn get_variant(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// Mutable variant of [`FontFamily::get_variant`]
    pub fn get_variant_mut(&mut self, weight: FontWeight) -> &mut FontFace {
        match (weight, self.bold.is_some()) {
            (FontWeight::Bold, true) => self.bold.as_mut().unwrap_or(&mut self.regular),
            _ => &mut self.regular,
        }
    }

    /// All faces of this family
    pub fn faces(&self) -> impl Iterator<Item = &FontFace> {
        std::iter::once(&self.regular).chain(self.bold.iter())
    }
}

/// Builder for TrueType font families
#[derive(Default)]
pub struct FontFamilyBuilder {
    regular: Option<Vec<u8>>,
    bold: Option<Vec<u8>>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: Vec<u8>) -> Self {
        self.regular = Some(ttf_data);
        self
    }

    pub fn bold(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold = Some(ttf_data);
        self
    }

    /// Build the FontFamily from the provided TTF data
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let regular = match self.regular {
            Some(ttf_data) => FontData::from_ttf(&format!("{family_name}-regular"), &ttf_data)?,
            None => {
                return Err(PdfError::FontParseError(
                    "FontFamily must have at least a regular variant".to_string(),
                ))
            }
        };

        let bold = self
            .bold
            .map(|data| FontData::from_ttf(&format!("{family_name}-bold"), &data))
            .transpose()?;

        Ok(FontFamily {
            regular: FontFace::Embedded(regular),
            bold: bold.map(FontFace::Embedded),
        })
    }
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let data = ttf_data.to_vec();

        // The face borrows 'static data; fonts live for the whole render
        let static_data: &'static [u8] = Box::leak(data.clone().into_boxed_slice());

        let face = ttf_parser::Face::parse(static_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data: data,
            used_chars: HashSet::new(),
            face: Some(face),
        })
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face
            .as_ref()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get glyph advance width
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        self.face.as_ref().and_then(|face| {
            let glyph_id = face.glyph_index(c)?;
            face.glyph_hor_advance(glyph_id)
        })
    }

    /// Get font units per em
    pub fn units_per_em(&self) -> u16 {
        self.face
            .as_ref()
            .map(|face| face.units_per_em())
            .unwrap_or(1000)
    }

    /// Get font ascender
    pub fn ascender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.ascender())
            .unwrap_or(800)
    }

    /// Get font descender
    pub fn descender(&self) -> i16 {
        self.face
            .as_ref()
            .map(|face| face.descender())
            .unwrap_or(-200)
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let width = self.text_width(text);
        let units_per_em = self.units_per_em() as f32;
        (width as f32 / units_per_em) * font_size
    }

    /// Scale font units to PDF glyph space (1/1000 em)
    fn to_glyph_space(&self, value: i32) -> i32 {
        value * 1000 / self.units_per_em().max(1) as i32
    }

    /// Generate all PDF objects needed to embed this font
    ///
    /// References between the objects are placeholders; the document patches
    /// them in when the objects are added.
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        );

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let ascender = self.to_glyph_space(self.ascender() as i32);
        let descender = self.to_glyph_space(self.descender() as i32);

        let font_bbox = vec![0.into(), descender.into(), 1000.into(), ascender.into()];

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            ("FontBBox", font_bbox.into()),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascender.into()),
            ("Descent", descender.into()),
            ("CapHeight", ascender.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference((0, 0))),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference((0, 0))),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            ("DescendantFonts", vec![Object::Reference((0, 0))].into()),
            ("ToUnicode", Object::Reference((0, 0))),
        ]);

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// Encode text as hex string for PDF Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::new();
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        format!("<{result}>")
    }

    /// Generate /W array for glyph widths
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let face = match &self.face {
            Some(f) => f,
            None => return widths,
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| self.glyph_id(c))
            .collect();
        gids.sort();
        gids.dedup();

        // Individual format: [gid1 [width1] gid2 [width2] ...]
        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .map(|a| self.to_glyph_space(a as i32))
                .unwrap_or(1000);
            widths.push(gid.into());
            widths.push(vec![advance.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let mut char_list: Vec<char> = self.used_chars.iter().copied().collect();
        char_list.sort_by_key(|c| *c as u32);

        // bfchar sections are limited to 100 entries
        for chunk in char_list.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let unicode = *c as u32;
                cmap.push_str(&format!("<{gid:04X}> <{unicode:04X}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faceless_font() -> FontData {
        FontData {
            name: "test".to_string(),
            ttf_data: vec![0u8; 100],
            used_chars: HashSet::new(),
            face: None,
        }
    }

    #[test]
    fn test_add_chars() {
        let mut font = faceless_font();
        font.add_chars("Hello");
        assert_eq!(font.used_chars.len(), 4);
        assert!(font.used_chars.contains(&'H'));
        assert!(font.used_chars.contains(&'l'));
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontData::from_ttf("broken", &[0u8; 100]);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_builder_requires_regular() {
        let result = FontFamilyBuilder::new().build("body");
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_faceless_defaults() {
        let font = faceless_font();
        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.ascender(), 800);
        assert_eq!(font.descender(), -200);
        assert_eq!(font.text_width("Hello"), 0);
        assert_eq!(font.text_width_points("Hello", 12.0), 0.0);
        assert!(!font.has_glyph('A'));
    }

    #[test]
    fn test_encode_text_hex_no_face() {
        let font = faceless_font();
        assert_eq!(font.encode_text_hex(""), "<>");
        assert_eq!(font.encode_text_hex("AB"), "<00000000>");
    }

    #[test]
    fn test_to_pdf_objects() {
        let mut font = faceless_font();
        font.add_chars("Hello");

        let objects = font.to_pdf_objects().unwrap();
        assert!(!objects.type0_font.is_empty());
        assert!(!objects.cid_font.is_empty());
        assert!(!objects.font_descriptor.is_empty());
        assert!(!objects.font_file_stream.content.is_empty());
        assert!(!objects.tounicode_stream.content.is_empty());
    }

    #[test]
    fn test_generate_tounicode_cmap() {
        let mut font = faceless_font();
        font.add_chars("€1");

        let cmap = font.generate_tounicode_cmap();
        assert!(cmap.contains("begincmap"));
        assert!(cmap.contains("<0000> <20AC>"));
        assert!(cmap.contains("<0000> <0031>"));
        assert!(cmap.contains("endcmap"));
    }

    #[test]
    fn test_builtin_width_is_monospaced() {
        let w = BuiltinFont::Courier.text_width_points("abcd", 10.0);
        assert!((w - 24.0).abs() < 1e-6);
        assert_eq!(
            BuiltinFont::CourierBold.text_width_points("€ 1", 10.0),
            BuiltinFont::Courier.text_width_points("xyz", 10.0)
        );
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Hi"), "(Hi)");
        assert_eq!(encode_win_ansi("a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(encode_win_ansi("€ 5"), "(\\200 5)");
        assert_eq!(encode_win_ansi("•"), "(\\225)");
        assert_eq!(encode_win_ansi("à"), "(\\340)");
        assert_eq!(encode_win_ansi("Ж"), "(?)");
    }

    #[test]
    fn test_family_bold_fallback() {
        let family = FontFamily {
            regular: FontFace::Builtin(BuiltinFont::Courier),
            bold: None,
        };
        assert_eq!(family.get_variant(FontWeight::Bold).name(), "Courier");

        let mono = FontFamily::builtin_monospace();
        assert_eq!(mono.get_variant(FontWeight::Bold).name(), "Courier-Bold");
        assert_eq!(mono.faces().count(), 2);
    }
}
