use crate::constants::CARD_SETTINGS;

use super::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Title,
    Content,
    FreeSpace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilledCell {
    pub rect: Rect,
    pub text: String,
    pub kind: CellKind,
}

/// Pool entries one grid consumes.
pub fn required_pool_len(grid: &[Rect], columns: usize, use_free_space: bool) -> usize {
    let content = grid.len().saturating_sub(columns);
    if use_free_space {
        content.saturating_sub(1)
    } else {
        content
    }
}

pub fn is_free_space_cell(rect: &Rect) -> bool {
    rect.row == CARD_SETTINGS.free_space_row && rect.col == CARD_SETTINGS.free_space_col
}

/// Uppercased and cut or space-padded to exactly `columns` characters.
pub fn title_letters(title: &str, columns: usize) -> Vec<String> {
    let mut letters: Vec<String> = title
        .to_uppercase()
        .chars()
        .take(columns)
        .map(|c| c.to_string())
        .collect();
    letters.resize(columns, " ".to_string());
    letters
}

/// Lays `title` across the title row and `pool` row-major over the rest.
///
/// The caller guarantees `pool` holds at least [`required_pool_len`] entries;
/// cells past the end of a short pool are left empty.
pub fn fill(grid: &[Rect], title: &str, pool: &[String], use_free_space: bool) -> Vec<FilledCell> {
    let columns = grid.iter().filter(|rect| rect.is_title_row).count();
    let letters = title_letters(title, columns);
    let mut next = pool.iter();

    grid.iter()
        .map(|rect| {
            if rect.is_title_row {
                FilledCell {
                    rect: *rect,
                    text: letters.get(rect.col).cloned().unwrap_or_default(),
                    kind: CellKind::Title,
                }
            } else if use_free_space && is_free_space_cell(rect) {
                FilledCell {
                    rect: *rect,
                    text: CARD_SETTINGS.free_space_label.to_string(),
                    kind: CellKind::FreeSpace,
                }
            } else {
                FilledCell {
                    rect: *rect,
                    text: next.next().cloned().unwrap_or_default(),
                    kind: CellKind::Content,
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{cards::layout::compute_layout, constants::GRID};

    use super::*;

    fn pool(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Movie {i:03}")).collect()
    }

    #[test]
    fn test_title_letters_pad_and_truncate() {
        assert_eq!(title_letters("bingo", 5), vec!["B", "I", "N", "G", "O"]);
        assert_eq!(title_letters("go", 5), vec!["G", "O", " ", " ", " "]);
        assert_eq!(title_letters("stillframe", 5), vec!["S", "T", "I", "L", "L"]);
    }

    #[test]
    fn test_fill_without_free_space_uses_every_content_cell() {
        let layout = compute_layout(&GRID);
        let needed = required_pool_len(&layout.top, GRID.columns, false);
        assert_eq!(needed, GRID.rows * GRID.columns - GRID.columns);

        let cells = fill(&layout.top, "bingo", &pool(needed), false);
        let content: Vec<&FilledCell> =
            cells.iter().filter(|c| c.kind == CellKind::Content).collect();

        assert_eq!(content.len(), needed);
        assert_eq!(content[0].text, "Movie 000");
        assert_eq!(content[0].rect.row, 1);
        assert_eq!(content[needed - 1].text, format!("Movie {:03}", needed - 1));
        assert!(cells.iter().all(|c| c.kind != CellKind::FreeSpace));
    }

    #[test]
    fn test_fill_with_free_space_reserves_one_fixed_cell() {
        let layout = compute_layout(&GRID);
        let needed = required_pool_len(&layout.bottom, GRID.columns, true);
        assert_eq!(needed, GRID.rows * GRID.columns - GRID.columns - 1);

        let cells = fill(&layout.bottom, "bingo", &pool(needed + 1), true);
        let free: Vec<&FilledCell> = cells
            .iter()
            .filter(|c| c.kind == CellKind::FreeSpace)
            .collect();

        assert_eq!(free.len(), 1);
        assert_eq!(free[0].text, CARD_SETTINGS.free_space_label);
        assert_eq!(free[0].rect.row, CARD_SETTINGS.free_space_row);
        assert_eq!(free[0].rect.col, CARD_SETTINGS.free_space_col);

        let content: Vec<&String> = cells
            .iter()
            .filter(|c| c.kind == CellKind::Content)
            .map(|c| &c.text)
            .collect();
        assert_eq!(content.len(), needed);
        assert!(!content.contains(&&format!("Movie {needed:03}")));
    }

    #[test]
    fn test_title_row_holds_one_letter_per_column() {
        let layout = compute_layout(&GRID);
        let cells = fill(&layout.top, "Reel", &pool(25), false);
        let title: String = cells
            .iter()
            .filter(|c| c.kind == CellKind::Title)
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(title, "REEL ");
    }
}
