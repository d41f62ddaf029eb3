use crate::constants::GridSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[cfg(test)]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// One grid cell. Row 0 is the title row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub row: usize,
    pub col: usize,
    pub is_title_row: bool,
}

impl Rect {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// The two stacked grids of a card page. Built once at startup and shared
/// read-only by every card.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub top: Vec<Rect>,
    pub bottom: Vec<Rect>,
    pub columns: usize,
    pub rows: usize,
    pub page_width: f32,
    pub page_height: f32,
    /// Vertical midpoint of the gap between the two grids.
    pub cut_line_y: f32,
}

pub fn compute_layout(grid: &GridSettings) -> GridLayout {
    let grid_height = grid.rows as f32 * grid.cell_height;
    let top_y = grid.margin;
    let bottom_y = top_y + grid_height + grid.grid_gap;

    GridLayout {
        top: grid_cells(grid, grid.margin, top_y),
        bottom: grid_cells(grid, grid.margin, bottom_y),
        columns: grid.columns,
        rows: grid.rows,
        page_width: grid.page_width,
        page_height: grid.page_height,
        cut_line_y: top_y + grid_height + grid.grid_gap / 2.0,
    }
}

fn grid_cells(grid: &GridSettings, origin_x: f32, origin_y: f32) -> Vec<Rect> {
    let mut cells = Vec::with_capacity(grid.rows * grid.columns);
    for row in 0..grid.rows {
        for col in 0..grid.columns {
            cells.push(Rect {
                x: origin_x + col as f32 * grid.cell_width,
                y: origin_y + row as f32 * grid.cell_height,
                width: grid.cell_width,
                height: grid.cell_height,
                row,
                col,
                is_title_row: row == 0,
            });
        }
    }
    cells
}
