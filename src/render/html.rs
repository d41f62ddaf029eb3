use std::{fmt::Write as _, fs, path::Path};

use crate::{cards::layout::Bounds, storage};

use super::{BoxStyle, LineStyle, Renderer, TextStyle, fit_within, wrap_text};

const CHAR_WIDTH_RATIO: f32 = 0.55;
const LINE_HEIGHT_RATIO: f32 = 1.15;
const MIN_FONT_SIZE: f32 = 6.0;

struct Page {
    width: f32,
    height: f32,
    body: String,
}

/// Writes a printable HTML document with one inline SVG per page.
pub struct HtmlRenderer {
    title: String,
    pages: Vec<Page>,
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.begin_page(0.0, 0.0);
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last].body
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(&self.title));
        html.push_str(
            "<style>\n\
             body { margin: 0; background: #777; }\n\
             svg.page { display: block; margin: 0 auto 16px auto; background: #fff; }\n\
             @media print { body { background: none; } svg.page { margin: 0; page-break-after: always; } }\n\
             </style>\n</head>\n<body>\n",
        );

        for page in &self.pages {
            let _ = writeln!(
                html,
                "<svg class=\"page\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
                w = page.width,
                h = page.height
            );
            html.push_str(&page.body);
            html.push_str("</svg>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

impl Renderer for HtmlRenderer {
    fn begin_page(&mut self, width: f32, height: f32) {
        self.pages.push(Page {
            width,
            height,
            body: String::new(),
        });
    }

    fn rect(&mut self, bounds: Bounds, style: BoxStyle) {
        let fill = style.fill.map(|c| c.hex()).unwrap_or_else(|| "none".to_string());
        let stroke = style
            .stroke
            .map(|c| c.hex())
            .unwrap_or_else(|| "none".to_string());
        let _ = writeln!(
            self.current(),
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            bounds.x, bounds.y, bounds.width, bounds.height, fill, stroke, style.stroke_width
        );
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), style: LineStyle) {
        let dash = if style.dashed {
            " stroke-dasharray=\"6 4\""
        } else {
            ""
        };
        let _ = writeln!(
            self.current(),
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
            from.0,
            from.1,
            to.0,
            to.1,
            style.color.hex(),
            style.width,
            dash
        );
    }

    fn text(&mut self, text: &str, bounds: Bounds, style: TextStyle) {
        let (size, lines) = fit_text(text, bounds, style.size);
        if lines.is_empty() {
            return;
        }

        let line_height = size * LINE_HEIGHT_RATIO;
        let block_height = line_height * lines.len() as f32;
        let center_x = bounds.x + bounds.width / 2.0;
        // Baseline of the first line, with the whole block centered vertically.
        let first_baseline = bounds.y + (bounds.height - block_height) / 2.0 + size;
        let weight = if style.bold { "bold" } else { "normal" };

        let body = self.current();
        let _ = writeln!(
            body,
            "<text x=\"{}\" y=\"{}\" font-family=\"Helvetica, Arial, sans-serif\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"middle\">",
            center_x,
            first_baseline,
            size,
            weight,
            style.color.hex()
        );
        for (i, line) in lines.iter().enumerate() {
            let dy = if i == 0 { 0.0 } else { line_height };
            let _ = writeln!(
                body,
                "<tspan x=\"{}\" dy=\"{}\">{}</tspan>",
                center_x,
                dy,
                escape(line)
            );
        }
        body.push_str("</text>\n");
    }

    fn image(&mut self, path: &Path, pixel_size: (u32, u32), max_bounds: Bounds) {
        let placed = fit_within(pixel_size, max_bounds);
        let href = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let _ = writeln!(
            self.current(),
            "<image href=\"file://{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
            escape(&href.to_string_lossy()),
            placed.x,
            placed.y,
            placed.width,
            placed.height
        );
    }

    fn save(&mut self, path: &Path) -> Result<(), String> {
        storage::write_text_file(path, &self.to_html())
    }
}

fn fit_text(text: &str, bounds: Bounds, preferred: f32) -> (f32, Vec<String>) {
    let mut size = preferred;
    loop {
        let lines = wrap_text(text, bounds.width * 0.92, size * CHAR_WIDTH_RATIO);
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f32;
        let fits_width = widest * size * CHAR_WIDTH_RATIO <= bounds.width * 0.92;
        let fits_height = lines.len() as f32 * size * LINE_HEIGHT_RATIO <= bounds.height * 0.9;

        if (fits_width && fits_height) || size <= MIN_FONT_SIZE {
            return (size, lines);
        }
        size = (size - 1.0).max(MIN_FONT_SIZE);
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
