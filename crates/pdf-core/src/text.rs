//! Content stream operators and text utilities

use crate::document::{Color, LineStyle};
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Calculate X offset for text alignment inside a container
///
/// # Arguments
/// * `text_width` - Width of text in points
/// * `container_width` - Available width for alignment
/// * `align` - Desired alignment
pub fn calculate_x_offset(text_width: f64, container_width: f64, align: Align) -> f64 {
    match align {
        Align::Left | Align::Justify => 0.0,
        Align::Center => (container_width - text_width) / 2.0,
        Align::Right => container_width - text_width,
    }
}

/// Generate PDF operators for text insertion
///
/// Creates the text operators (BT, rg, Tf, Td, Tj, ET) to render text
/// at a specific position with alignment support.
///
/// # Arguments
/// * `encoded` - Encoded string operand (`<0041>` hex or `(A)` literal)
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `align` - Text alignment relative to `x`
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    encoded: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left | Align::Justify => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };

    let final_x = x + x_offset;
    let Color { r, g, b } = ctx.color;

    format!(
        "BT\n{r} {g} {b} rg\n/{} {} Tf\n{final_x} {y} Td\n{encoded} Tj\nET\n",
        ctx.font_name, ctx.font_size
    )
    .into_bytes()
}

/// Operators stroking a rectangle (PDF coordinates, lower-left origin)
pub fn generate_rect_operators(x: f64, y: f64, width: f64, height: f64, style: &LineStyle) -> Vec<u8> {
    let Color { r, g, b } = style.color;
    format!(
        "q\n{r} {g} {b} RG\n{} w\n{x} {y} {width} {height} re\nS\nQ\n",
        style.width
    )
    .into_bytes()
}

/// Operators filling a rectangle (PDF coordinates, lower-left origin)
pub fn generate_fill_operators(x: f64, y: f64, width: f64, height: f64, color: Color) -> Vec<u8> {
    let Color { r, g, b } = color;
    format!("q\n{r} {g} {b} rg\n{x} {y} {width} {height} re\nf\nQ\n").into_bytes()
}

/// Operators stroking a straight line (PDF coordinates)
pub fn generate_line_operators(x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) -> Vec<u8> {
    let Color { r, g, b } = style.color;
    format!(
        "q\n{r} {g} {b} RG\n{} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        style.width
    )
    .into_bytes()
}

/// Split text into lines no wider than `max_width`
///
/// Words are separated by whitespace and measured with `measure`. A single
/// word wider than the limit is kept whole on its own line.
pub fn wrap_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
            continue;
        }

        let candidate = format!("{current_line} {word}");
        if measure(&candidate) <= max_width {
            current_line = candidate;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}
