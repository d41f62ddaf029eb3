mod html;

use std::path::Path;

use crate::cards::layout::Bounds;

pub use html::HtmlRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const INK: Rgb = Rgb(33, 33, 33);
    pub const PAPER_GREY: Rgb = Rgb(222, 222, 222);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f32,
    pub dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub bold: bool,
}

/// Drawing surface for card pages and slides.
pub trait Renderer {
    fn begin_page(&mut self, width: f32, height: f32);
    fn rect(&mut self, bounds: Bounds, style: BoxStyle);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), style: LineStyle);
    /// Centers `text` inside `bounds`, wrapping and shrinking it until it fits.
    fn text(&mut self, text: &str, bounds: Bounds, style: TextStyle);
    /// Places an image scaled into `max_bounds` with its aspect ratio kept.
    fn image(&mut self, path: &Path, pixel_size: (u32, u32), max_bounds: Bounds);
    fn save(&mut self, path: &Path) -> Result<(), String>;
}

/// Largest box with the aspect ratio of `pixel_size` that fits in `max_bounds`,
/// centered inside it.
pub fn fit_within(pixel_size: (u32, u32), max_bounds: Bounds) -> Bounds {
    let (w, h) = pixel_size;
    if w == 0 || h == 0 {
        return max_bounds;
    }

    let scale = (max_bounds.width / w as f32).min(max_bounds.height / h as f32);
    let width = w as f32 * scale;
    let height = h as f32 * scale;

    Bounds::new(
        max_bounds.x + (max_bounds.width - width) / 2.0,
        max_bounds.y + (max_bounds.height - height) / 2.0,
        width,
        height,
    )
}

/// Greedy word wrap where a glyph is assumed to be `char_width` wide.
/// Words longer than a line are kept whole.
pub fn wrap_text(text: &str, max_width: f32, char_width: f32) -> Vec<String> {
    let max_chars = ((max_width / char_width).floor() as usize).max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
