//! PDF Document wrapper

use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{
    generate_fill_operators, generate_line_operators, generate_rect_operators,
    generate_text_operators, TextRenderContext,
};
use crate::{Align, BuiltinFont, FontFace, FontFamily, FontWeight, PdfError, Result, TextMeasure};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// A4 page width in points
pub const A4_WIDTH: f64 = 595.28;
/// A4 page height in points
pub const A4_HEIGHT: f64 = 841.89;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    /// Red color
    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }

    /// Neutral gray at the given level (0.0 black, 1.0 white)
    pub fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Stroke settings for rules and borders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Line width in points
    pub width: f64,
    pub color: Color,
}

impl LineStyle {
    pub fn new(width: f64, color: Color) -> Self {
        Self { width, color }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new(1.0, Color::black())
    }
}

/// A page owned by the document
#[derive(Debug, Clone, Copy)]
struct PageEntry {
    id: ObjectId,
    width: f64,
    height: f64,
}

/// PDF Document builder providing high-level operations
///
/// Coordinates passed to the drawing methods are in points with the origin
/// at the top-left corner of the page; `y` grows downwards. Text `y` is the
/// baseline.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root Pages node
    pages_id: ObjectId,
    /// Pages in order
    pages: Vec<PageEntry>,
    /// Registered font families
    font_families: HashMap<String, FontFamily>,
    /// Current font family name
    current_family: Option<String>,
    /// Current font weight
    current_weight: FontWeight,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Font resource names (font name -> resource name)
    font_resources: HashMap<String, String>,
    /// Fonts used per page (page number -> font names)
    page_font_resources: HashMap<usize, BTreeMap<String, String>>,
    /// Embedded images (data hash -> XObject)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> image name -> object ID)
    page_image_resources: HashMap<usize, BTreeMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = inner.add_object(catalog);
        inner.trailer.set("Root", Object::Reference(catalog_id));

        Self {
            inner,
            pages_id,
            pages: Vec::new(),
            font_families: HashMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: HashMap::new(),
            page_font_resources: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Add a blank A4 page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_blank_page(&mut self) -> Result<usize> {
        self.add_page(A4_WIDTH, A4_HEIGHT)
    }

    /// Add a blank page of the given size in points
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if width <= 0.0 || height <= 0.0 {
            return Err(PdfError::ParseError(format!(
                "Invalid page size {width}x{height}"
            )));
        }

        let id = self.inner.new_object_id();
        self.pages.push(PageEntry { id, width, height });

        let page = self.pages.len();
        tracing::debug!(page, "added blank page");
        Ok(page)
    }

    /// Page size `(width, height)` in points
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let entry = self.page_entry(page)?;
        Ok((entry.width, entry.height))
    }

    fn page_entry(&self, page: usize) -> Result<PageEntry> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(self.pages[page - 1])
    }

    /// Register a font family under `name`
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("body",
    ///     FontFamilyBuilder::new()
    ///         .regular(std::fs::read("DejaVuSans.ttf")?)
    ///         .bold(std::fs::read("DejaVuSans-Bold.ttf")?)
    ///         .build("body")?,
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.font_families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        self.font_families.insert(name.to_string(), family);
        Ok(())
    }

    /// Set the current font family and size
    ///
    /// ```ignore
    /// doc.set_font("body", 12.0)?;  // Regular 12pt
    /// doc.set_font_weight(FontWeight::Bold)?;  // Now bold 12pt
    /// ```
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.font_families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;

        Ok(())
    }

    /// Set only the font size (keeps current family/weight)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_font_size = size;
        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_weight = weight;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    pub fn font_size(&self) -> f32 {
        self.current_font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.current_weight
    }

    fn current_family(&self) -> Result<&FontFamily> {
        let name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        self.font_families
            .get(name)
            .ok_or_else(|| PdfError::FontNotFound(name.clone()))
    }

    fn current_face_mut(&mut self) -> Result<&mut FontFace> {
        let weight = self.current_weight;
        let name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        self.font_families
            .get_mut(name)
            .map(|family| family.get_variant_mut(weight))
            .ok_or_else(|| PdfError::FontNotFound(name.clone()))
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Alignment of the text relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let entry = self.page_entry(page)?;

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font_size = self.current_font_size;
        let (font_name, encoded, text_width) = {
            let face = self.current_face_mut()?;
            face.add_chars(text);
            (
                face.name().to_string(),
                face.encode_text(text),
                face.text_width_points(text, font_size) as f64,
            )
        };

        let font_resource_name = self.get_or_create_font_ref(&font_name, page);

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size,
            text_width,
            color: self.current_text_color,
        };

        // Convert Y coordinate from top-origin to PDF bottom-origin
        let pdf_y = entry.height - y;
        let operators = generate_text_operators(&encoded, x, pdf_y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Width of `text` in points for the current family
    pub fn measure(&self, text: &str, weight: FontWeight, size: f32) -> Result<f64> {
        let family = self.current_family()?;
        Ok(family.get_variant(weight).text_width_points(text, size) as f64)
    }

    /// Get or create the resource name (e.g., "F1") of a font on a page
    fn get_or_create_font_ref(&mut self, font_name: &str, page: usize) -> String {
        let next = self.font_resources.len() + 1;
        let resource_name = self
            .font_resources
            .entry(font_name.to_string())
            .or_insert_with(|| format!("F{next}"))
            .clone();

        self.page_font_resources
            .entry(page)
            .or_default()
            .insert(font_name.to_string(), resource_name.clone());

        resource_name
    }

    /// Insert an image stretched to the given box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the top edge in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let entry = self.page_entry(page)?;
        let resource_name = self.get_or_create_image_ref(data, page)?;

        let pdf_y = entry.height - y - height;
        let operators = generate_image_operators(&resource_name, x, pdf_y, width, height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1"). Images are deduplicated by
    /// hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let image_id = match self.embedded_images.get(&data_hash) {
            Some(id) => *id,
            None => {
                let xobject = ImageXObject::from_bytes(data)?;
                let smask = xobject
                    .to_smask_stream()
                    .map(|stream| self.inner.add_object(stream));
                let id = self.inner.add_object(xobject.to_pdf_stream(smask));
                tracing::debug!(
                    width = xobject.width,
                    height = xobject.height,
                    soft_mask = smask.is_some(),
                    "embedded image"
                );
                self.embedded_images.insert(data_hash, id);
                id
            }
        };

        let page_resources = self.page_image_resources.entry(page).or_default();
        if let Some((name, _)) = page_resources.iter().find(|(_, id)| **id == image_id) {
            return Ok(name.clone());
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        page_resources.insert(resource_name.clone(), image_id);

        Ok(resource_name)
    }

    /// Stroke a rectangle whose top-left corner is at `(x, y)`
    pub fn draw_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: &LineStyle,
    ) -> Result<()> {
        let entry = self.page_entry(page)?;
        let operators = generate_rect_operators(x, entry.height - y - height, width, height, style);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at `(x, y)`
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        let entry = self.page_entry(page)?;
        let operators = generate_fill_operators(x, entry.height - y - height, width, height, color);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Stroke a line between two points
    pub fn draw_line(
        &mut self,
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        style: &LineStyle,
    ) -> Result<()> {
        let entry = self.page_entry(page)?;
        let operators = generate_line_operators(
            from.0,
            entry.height - from.1,
            to.0,
            entry.height - to.1,
            style,
        );
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Save the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = self.build()?;
        let mut buffer = Vec::new();
        output
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Assemble a complete lopdf document: fonts, content streams, page tree
    fn build(&self) -> Result<Document> {
        if self.pages.is_empty() {
            return Err(PdfError::SaveError("Document has no pages".to_string()));
        }

        let mut output = self.inner.clone();
        let embedded_fonts = self.embed_fonts(&mut output)?;

        let mut kids = Vec::with_capacity(self.pages.len());
        for (index, entry) in self.pages.iter().enumerate() {
            let page = index + 1;
            let content = self
                .page_content_buffer
                .get(&page)
                .cloned()
                .unwrap_or_default();
            let contents_id = output.add_object(Stream::new(Dictionary::new(), content));

            let mut resources = Dictionary::new();
            if let Some(fonts) = self.page_font_resources.get(&page) {
                let mut font_dict = Dictionary::new();
                for (font_name, resource_name) in fonts {
                    let font_ref = embedded_fonts
                        .get(font_name)
                        .ok_or_else(|| PdfError::FontNotFound(font_name.clone()))?;
                    font_dict.set(resource_name.as_bytes(), Object::Reference(*font_ref));
                }
                resources.set("Font", Object::Dictionary(font_dict));
            }
            if let Some(images) = self.page_image_resources.get(&page) {
                let mut xobject_dict = Dictionary::new();
                for (resource_name, id) in images {
                    xobject_dict.set(resource_name.as_bytes(), Object::Reference(*id));
                }
                resources.set("XObject", Object::Dictionary(xobject_dict));
            }

            let page_dict = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(self.pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(entry.width as f32),
                        Object::Real(entry.height as f32),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(contents_id)),
            ]);
            output.objects.insert(entry.id, Object::Dictionary(page_dict));
            kids.push(Object::Reference(entry.id));
        }

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.pages.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        output
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        Ok(output)
    }

    /// Embed every font referenced by a page
    ///
    /// Returns font name -> font dictionary object ID.
    fn embed_fonts(&self, output: &mut Document) -> Result<HashMap<String, ObjectId>> {
        let mut embedded = HashMap::new();

        let used: Vec<&String> = self.font_resources.keys().collect();
        for family in self.font_families.values() {
            for face in family.faces() {
                let name = face.name().to_string();
                if embedded.contains_key(&name) || !used.contains(&&name) {
                    continue;
                }

                let font_id = match face {
                    FontFace::Builtin(font) => output.add_object(font.to_pdf_dictionary()),
                    FontFace::Embedded(data) => {
                        let font_objects = data.to_pdf_objects()?;

                        let font_file_id = output.add_object(font_objects.font_file_stream);

                        let mut font_descriptor = font_objects.font_descriptor;
                        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
                        let font_descriptor_id = output.add_object(font_descriptor);

                        let mut cid_font = font_objects.cid_font;
                        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
                        let cid_font_id = output.add_object(cid_font);

                        let tounicode_id = output.add_object(font_objects.tounicode_stream);

                        let mut type0_font = font_objects.type0_font;
                        type0_font.set(
                            "DescendantFonts",
                            Object::Array(vec![Object::Reference(cid_font_id)]),
                        );
                        type0_font.set("ToUnicode", Object::Reference(tounicode_id));
                        output.add_object(type0_font)
                    }
                };

                tracing::debug!(font = %name, builtin = face.is_builtin(), "embedded font");
                embedded.insert(name, font_id);
            }
        }

        Ok(embedded)
    }
}

impl TextMeasure for PdfDocument {
    /// Falls back to built-in Courier metrics when no family is active
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f64 {
        self.measure(text, weight, size).unwrap_or_else(|_| {
            let font = match weight {
                FontWeight::Regular => BuiltinFont::Courier,
                FontWeight::Bold => BuiltinFont::CourierBold,
            };
            font.text_width_points(text, size) as f64
        })
    }
}
