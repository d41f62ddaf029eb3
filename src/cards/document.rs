use std::path::Path;

use tracing::info;

use crate::{
    error::AppError,
    render::{BoxStyle, LineStyle, Renderer, Rgb, TextStyle},
};

use super::{
    batch::{Card, page_count},
    fill::CellKind,
    layout::{Bounds, GridLayout},
};

const TITLE_TEXT: TextStyle = TextStyle {
    size: 28.0,
    color: Rgb::WHITE,
    bold: true,
};

const CONTENT_TEXT: TextStyle = TextStyle {
    size: 10.0,
    color: Rgb::INK,
    bold: false,
};

const FREE_SPACE_TEXT: TextStyle = TextStyle {
    size: 12.0,
    color: Rgb::INK,
    bold: true,
};

const CELL_PADDING: f32 = 4.0;

/// Draws every card, two per page, with a dashed cut line between them.
pub fn draw_cards<R: Renderer>(renderer: &mut R, layout: &GridLayout, cards: &[Card]) {
    for page in 0..page_count(cards) {
        renderer.begin_page(layout.page_width, layout.page_height);

        for card in cards.iter().filter(|card| card.page == page) {
            draw_card(renderer, card);
        }

        let margin = layout.top.first().map(|cell| cell.x).unwrap_or(0.0);
        renderer.line(
            (margin, layout.cut_line_y),
            (layout.page_width - margin, layout.cut_line_y),
            LineStyle {
                color: Rgb::BLACK,
                width: 0.75,
                dashed: true,
            },
        );
    }
}

fn draw_card<R: Renderer>(renderer: &mut R, card: &Card) {
    for cell in &card.cells {
        let bounds = cell.rect.bounds();
        let (style, text) = match cell.kind {
            CellKind::Title => (
                BoxStyle {
                    fill: Some(Rgb::INK),
                    stroke: Some(Rgb::INK),
                    stroke_width: 1.0,
                },
                TITLE_TEXT,
            ),
            CellKind::FreeSpace => (
                BoxStyle {
                    fill: Some(Rgb::PAPER_GREY),
                    stroke: Some(Rgb::BLACK),
                    stroke_width: 1.0,
                },
                FREE_SPACE_TEXT,
            ),
            CellKind::Content => (
                BoxStyle {
                    fill: None,
                    stroke: Some(Rgb::BLACK),
                    stroke_width: 1.0,
                },
                CONTENT_TEXT,
            ),
        };

        renderer.rect(bounds, style);
        if !cell.text.is_empty() {
            let inner = Bounds::new(
                bounds.x + CELL_PADDING,
                bounds.y + CELL_PADDING,
                bounds.width - CELL_PADDING * 2.0,
                bounds.height - CELL_PADDING * 2.0,
            );
            renderer.text(&cell.text, inner, text);
        }
    }
}

/// Renders the batch and hands the document to `renderer` for saving.
pub fn write_cards<R: Renderer>(
    renderer: &mut R,
    layout: &GridLayout,
    cards: &[Card],
    path: &Path,
) -> Result<(), AppError> {
    draw_cards(renderer, layout, cards);
    renderer
        .save(path)
        .map_err(|e| AppError::io(format!("writing cards {}", path.display()), e))?;
    info!(path = %path.display(), cards = cards.len(), "wrote card document");
    Ok(())
}
