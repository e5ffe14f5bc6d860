//! Flowing layout of paragraphs, tables and images across pages
//!
//! Blocks are placed top to bottom inside a [`Frame`]. When a block does not
//! fit in the space left on the page a new page is started. Paragraphs split
//! between lines; table rows and images are never split. Every finished page
//! is handed to an optional [`PageDecorator`].

use crate::document::{Color, LineStyle, PdfDocument};
use crate::{Align, FontWeight, Result, TextMeasure, MM};

const EPSILON: f64 = 1e-6;

/// A run of text in a single weight
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub weight: FontWeight,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: FontWeight::Bold,
        }
    }
}

/// Paragraph typography
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font_size: f32,
    /// Distance between baselines
    pub leading: f64,
    pub align: Align,
    pub space_before: f64,
    pub space_after: f64,
}

impl ParagraphStyle {
    pub fn new(font_size: f32, leading: f64) -> Self {
        Self {
            font_size,
            leading,
            align: Align::Left,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_space_before(mut self, space: f64) -> Self {
        self.space_before = space;
        self
    }

    pub fn with_space_after(mut self, space: f64) -> Self {
        self.space_after = space;
        self
    }
}

/// An image drawn at a fixed size
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    /// JPEG or PNG bytes
    pub data: Vec<u8>,
    pub width: f64,
    pub height: f64,
    pub align: Align,
}

/// Vertical placement of cell content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Cell padding in points; negative values let content overhang the cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Padding {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::new(6.0, 6.0, 3.0, 3.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(Vec<Span>),
    Image(ImageBlock),
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(vec![Span::regular(text)])
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Cell::Text(vec![Span::bold(text)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
    /// Fixed row height; content height plus padding when `None`
    pub height: Option<f64>,
    /// Overrides the table padding for this row
    pub padding: Option<Padding>,
    /// Font size and leading for this row
    pub font: Option<(f32, f64)>,
    /// Text alignment for every cell of this row
    pub align: Option<Align>,
    pub valign: Option<VAlign>,
}

impl TableRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            height: None,
            padding: None,
            font: None,
            align: None,
            valign: None,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_font(mut self, font_size: f32, leading: f64) -> Self {
        self.font = Some((font_size, leading));
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = Some(valign);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub leading: f64,
    /// Stroke around every cell
    pub grid: Option<LineStyle>,
    /// Fill of the first row
    pub header_background: Option<Color>,
    /// Fill of the first column below the header
    pub label_background: Option<Color>,
    pub padding: Padding,
    /// Horizontal rules under the given rows, spanning all columns
    pub rules_below: Vec<(usize, LineStyle)>,
    pub valign: VAlign,
    /// Text alignment per column (missing columns align left)
    pub column_align: Vec<Align>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            leading: 12.0,
            grid: None,
            header_background: None,
            label_background: None,
            padding: Padding::default(),
            rules_below: Vec::new(),
            valign: VAlign::Top,
            column_align: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub column_widths: Vec<f64>,
    pub rows: Vec<TableRow>,
    pub style: TableStyle,
    /// Horizontal placement of the whole table in the frame
    pub align: Align,
}

impl Table {
    pub fn width(&self) -> f64 {
        self.column_widths.iter().sum()
    }
}

/// A unit of flowing content
#[derive(Debug, Clone, PartialEq)]
pub enum FlowBlock {
    Paragraph {
        spans: Vec<Span>,
        style: ParagraphStyle,
    },
    /// Vertical gap in points
    Spacer(f64),
    Table(Table),
    Image(ImageBlock),
    PageBreak,
}

impl FlowBlock {
    pub fn paragraph(spans: Vec<Span>, style: ParagraphStyle) -> Self {
        FlowBlock::Paragraph { spans, style }
    }

    /// Paragraph with a single regular span
    pub fn text(text: impl Into<String>, style: ParagraphStyle) -> Self {
        FlowBlock::Paragraph {
            spans: vec![Span::regular(text)],
            style,
        }
    }
}

/// Page size and margins, all in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub page_width: f64,
    pub page_height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Frame {
    /// A4 page with equal margins in millimetres
    pub fn a4(margin_mm: f64) -> Self {
        let margin = margin_mm * MM;
        Self {
            page_width: crate::A4_WIDTH,
            page_height: crate::A4_HEIGHT,
            left: margin,
            right: margin,
            top: margin,
            bottom: margin,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.page_width - self.left - self.right
    }

    /// Lowest usable y (from top)
    pub fn bottom_limit(&self) -> f64 {
        self.page_height - self.bottom
    }
}

/// Hook invoked once per finished page
pub trait PageDecorator {
    /// `page` is 1-indexed
    fn decorate(&self, doc: &mut PdfDocument, page: usize) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    weight: FontWeight,
}

/// Fragments with no whitespace between them
#[derive(Debug, Clone, Default, PartialEq)]
struct Word {
    fragments: Vec<Fragment>,
    width: f64,
}

enum Token {
    Word(Word),
    Break,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Line {
    words: Vec<Word>,
    /// Natural width with single spaces between words
    width: f64,
    /// Last line of a paragraph or followed by a hard break
    ends_paragraph: bool,
}

fn tokenize(spans: &[Span]) -> Vec<Token> {
    fn flush(word: &mut Word, buf: &mut String, weight: FontWeight) {
        if !buf.is_empty() {
            word.fragments.push(Fragment {
                text: std::mem::take(buf),
                weight,
            });
        }
    }

    let mut tokens = Vec::new();
    let mut current = Word::default();

    for span in spans {
        let mut buf = String::new();
        for c in span.text.chars() {
            if c.is_whitespace() {
                flush(&mut current, &mut buf, span.weight);
                if !current.fragments.is_empty() {
                    tokens.push(Token::Word(std::mem::take(&mut current)));
                }
                if c == '\n' {
                    tokens.push(Token::Break);
                }
            } else {
                buf.push(c);
            }
        }
        flush(&mut current, &mut buf, span.weight);
    }

    if !current.fragments.is_empty() {
        tokens.push(Token::Word(current));
    }
    tokens
}

/// Greedy line breaking of spans into lines no wider than `max_width`
fn layout_lines(spans: &[Span], max_width: f64, size: f32, measure: &dyn TextMeasure) -> Vec<Line> {
    let space = measure.text_width(" ", FontWeight::Regular, size);
    let mut lines = Vec::new();
    let mut current = Line::default();

    for token in tokenize(spans) {
        match token {
            Token::Break => {
                current.ends_paragraph = true;
                lines.push(std::mem::take(&mut current));
            }
            Token::Word(mut word) => {
                word.width = word
                    .fragments
                    .iter()
                    .map(|f| measure.text_width(&f.text, f.weight, size))
                    .sum();

                if current.words.is_empty() {
                    current.width = word.width;
                } else if current.width + space + word.width <= max_width + EPSILON {
                    current.width += space + word.width;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current.width = word.width;
                }
                current.words.push(word);
            }
        }
    }

    if !current.words.is_empty() {
        current.ends_paragraph = true;
        lines.push(current);
    }
    lines
}

#[allow(clippy::too_many_arguments)]
fn draw_line(
    doc: &mut PdfDocument,
    page: usize,
    line: &Line,
    x: f64,
    width: f64,
    baseline: f64,
    size: f32,
    align: Align,
) -> Result<()> {
    let space = doc.text_width(" ", FontWeight::Regular, size);
    let (mut cursor, gap) = match align {
        Align::Left => (x, space),
        Align::Center => (x + (width - line.width) / 2.0, space),
        Align::Right => (x + width - line.width, space),
        Align::Justify if !line.ends_paragraph && line.words.len() > 1 => {
            let extra = (width - line.width) / (line.words.len() - 1) as f64;
            (x, space + extra)
        }
        Align::Justify => (x, space),
    };

    for word in &line.words {
        for fragment in &word.fragments {
            doc.set_font_weight(fragment.weight)?;
            doc.insert_text(&fragment.text, page, cursor, baseline, Align::Left)?;
            cursor += doc.text_width(&fragment.text, fragment.weight, size);
        }
        cursor += gap;
    }

    doc.set_font_weight(FontWeight::Regular)
}

struct FlowState {
    page: usize,
    /// Top of the free space (from top of page)
    y: f64,
    pages: usize,
}

/// Places [`FlowBlock`]s onto pages
pub struct FlowRenderer {
    frame: Frame,
    family: String,
    decorator: Option<Box<dyn PageDecorator>>,
}

impl FlowRenderer {
    /// `family` must be registered with the document before rendering
    pub fn new(frame: Frame, family: impl Into<String>) -> Self {
        Self {
            frame,
            family: family.into(),
            decorator: None,
        }
    }

    pub fn with_decorator(mut self, decorator: impl PageDecorator + 'static) -> Self {
        self.decorator = Some(Box::new(decorator));
        self
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Render blocks starting on a fresh page
    ///
    /// Returns the number of pages added.
    pub fn render(&self, doc: &mut PdfDocument, blocks: &[FlowBlock]) -> Result<usize> {
        let page = doc.add_page(self.frame.page_width, self.frame.page_height)?;
        let mut state = FlowState {
            page,
            y: self.frame.top,
            pages: 1,
        };

        for block in blocks {
            match block {
                FlowBlock::Paragraph { spans, style } => {
                    self.render_paragraph(doc, &mut state, spans, style)?
                }
                FlowBlock::Spacer(height) => {
                    state.y += height;
                    if state.y > self.frame.bottom_limit() + EPSILON {
                        self.new_page(doc, &mut state)?;
                    }
                }
                FlowBlock::Table(table) => self.render_table(doc, &mut state, table)?,
                FlowBlock::Image(image) => self.render_image(doc, &mut state, image)?,
                FlowBlock::PageBreak => self.new_page(doc, &mut state)?,
            }
        }

        self.finish_page(doc, state.page)?;
        tracing::debug!(pages = state.pages, blocks = blocks.len(), "flow rendered");
        Ok(state.pages)
    }

    fn finish_page(&self, doc: &mut PdfDocument, page: usize) -> Result<()> {
        match &self.decorator {
            Some(decorator) => decorator.decorate(doc, page),
            None => Ok(()),
        }
    }

    fn new_page(&self, doc: &mut PdfDocument, state: &mut FlowState) -> Result<()> {
        self.finish_page(doc, state.page)?;
        state.page = doc.add_page(self.frame.page_width, self.frame.page_height)?;
        state.y = self.frame.top;
        state.pages += 1;
        tracing::debug!(page = state.page, "page break");
        Ok(())
    }

    fn at_top(&self, state: &FlowState) -> bool {
        (state.y - self.frame.top).abs() < EPSILON
    }

    /// Start a new page unless `height` fits (an empty page always fits)
    fn ensure_space(&self, doc: &mut PdfDocument, state: &mut FlowState, height: f64) -> Result<()> {
        if state.y + height > self.frame.bottom_limit() + EPSILON && !self.at_top(state) {
            self.new_page(doc, state)?;
        }
        Ok(())
    }

    fn aligned_x(&self, width: f64, align: Align) -> f64 {
        let free = self.frame.content_width() - width;
        match align {
            Align::Left | Align::Justify => self.frame.left,
            Align::Center => self.frame.left + free / 2.0,
            Align::Right => self.frame.left + free,
        }
    }

    fn render_paragraph(
        &self,
        doc: &mut PdfDocument,
        state: &mut FlowState,
        spans: &[Span],
        style: &ParagraphStyle,
    ) -> Result<()> {
        if !self.at_top(state) {
            state.y += style.space_before;
        }

        doc.set_font(&self.family, style.font_size)?;
        let width = self.frame.content_width();
        let lines = layout_lines(spans, width, style.font_size, &*doc);

        for line in &lines {
            self.ensure_space(doc, state, style.leading)?;
            doc.set_font(&self.family, style.font_size)?;
            let baseline = state.y + style.font_size as f64;
            draw_line(
                doc,
                state.page,
                line,
                self.frame.left,
                width,
                baseline,
                style.font_size,
                style.align,
            )?;
            state.y += style.leading;
        }

        state.y += style.space_after;
        Ok(())
    }

    fn render_image(
        &self,
        doc: &mut PdfDocument,
        state: &mut FlowState,
        image: &ImageBlock,
    ) -> Result<()> {
        if image.width <= 0.0 || image.height <= 0.0 {
            return Ok(());
        }

        self.ensure_space(doc, state, image.height)?;
        let x = self.aligned_x(image.width, image.align);
        doc.insert_image(&image.data, state.page, x, state.y, image.width, image.height)?;
        state.y += image.height;
        Ok(())
    }

    fn render_table(&self, doc: &mut PdfDocument, state: &mut FlowState, table: &Table) -> Result<()> {
        let style = &table.style;
        let x0 = self.aligned_x(table.width(), table.align);
        doc.set_font(&self.family, style.font_size)?;

        for (row_index, row) in table.rows.iter().enumerate() {
            let padding = row.padding.unwrap_or(style.padding);
            let (font_size, leading) = row.font.unwrap_or((style.font_size, style.leading));

            let contents: Vec<(Vec<Line>, f64)> = table
                .column_widths
                .iter()
                .enumerate()
                .map(|(col, col_width)| match row.cells.get(col) {
                    Some(Cell::Text(spans)) => {
                        let inner = col_width - padding.left - padding.right;
                        let lines = layout_lines(spans, inner, font_size, &*doc);
                        let height = lines.len() as f64 * leading;
                        (lines, height)
                    }
                    Some(Cell::Image(image)) => (Vec::new(), image.height),
                    Some(Cell::Empty) | None => (Vec::new(), 0.0),
                })
                .collect();

            let content_height = contents.iter().map(|(_, h)| *h).fold(0.0, f64::max);
            let row_height = row
                .height
                .unwrap_or(content_height + padding.top + padding.bottom);

            self.ensure_space(doc, state, row_height)?;
            let page = state.page;
            let top = state.y;

            let mut x = x0;
            for (col, col_width) in table.column_widths.iter().enumerate() {
                let background = if row_index == 0 && style.header_background.is_some() {
                    style.header_background
                } else if col == 0 {
                    style.label_background
                } else {
                    None
                };
                if let Some(color) = background {
                    doc.fill_rect(page, x, top, *col_width, row_height, color)?;
                }

                let (lines, height) = &contents[col];
                let content_top = match row.valign.unwrap_or(style.valign) {
                    VAlign::Top => top + padding.top,
                    VAlign::Middle => {
                        top + padding.top
                            + (row_height - padding.top - padding.bottom - height) / 2.0
                    }
                    VAlign::Bottom => top + row_height - padding.bottom - height,
                };
                let inner_x = x + padding.left;
                let inner_width = col_width - padding.left - padding.right;
                let align = row
                    .align
                    .or_else(|| style.column_align.get(col).copied())
                    .unwrap_or_default();

                match row.cells.get(col) {
                    Some(Cell::Text(_)) => {
                        doc.set_font(&self.family, font_size)?;
                        for (i, line) in lines.iter().enumerate() {
                            let baseline = content_top + i as f64 * leading + font_size as f64;
                            draw_line(
                                doc,
                                page,
                                line,
                                inner_x,
                                inner_width,
                                baseline,
                                font_size,
                                align,
                            )?;
                        }
                    }
                    Some(Cell::Image(image)) if image.width > 0.0 && image.height > 0.0 => {
                        let offset = match image.align {
                            Align::Left | Align::Justify => 0.0,
                            Align::Center => (inner_width - image.width) / 2.0,
                            Align::Right => inner_width - image.width,
                        };
                        doc.insert_image(
                            &image.data,
                            page,
                            inner_x + offset,
                            content_top,
                            image.width,
                            image.height,
                        )?;
                    }
                    _ => {}
                }

                if let Some(grid) = &style.grid {
                    doc.draw_rect(page, x, top, *col_width, row_height, grid)?;
                }
                x += col_width;
            }

            for (rule_row, rule) in &style.rules_below {
                if *rule_row == row_index {
                    let y = top + row_height;
                    doc.draw_line(page, (x0, y), (x0 + table.width(), y), rule)?;
                }
            }

            state.y += row_height;
        }

        Ok(())
    }
}
