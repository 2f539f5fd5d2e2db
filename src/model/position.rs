use serde::Deserialize;

/// Direction for focus movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cell coordinate within the grid body (header rows excluded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct FocusPosition {
    pub row: usize,
    pub col: usize,
}

impl FocusPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Clamp into `[0, max_row] x [0, max_col]`.
    pub fn clamped(self, bounds: GridBounds) -> Self {
        Self {
            row: self.row.min(bounds.max_row),
            col: self.col.min(bounds.max_col),
        }
    }

    /// One step in `dir`, clamped to `bounds`.
    pub fn step(self, dir: Direction, bounds: GridBounds) -> Self {
        let next = match dir {
            Direction::Up => Self::new(self.row.saturating_sub(1), self.col),
            Direction::Down => Self::new(self.row.saturating_add(1), self.col),
            Direction::Left => Self::new(self.row, self.col.saturating_sub(1)),
            Direction::Right => Self::new(self.row, self.col.saturating_add(1)),
        };
        next.clamped(bounds)
    }
}

/// Extents of the rendered grid, re-derived from the surface on every handler call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridBounds {
    pub max_row: usize,
    pub max_col: usize,
    /// Number of line-number markers in the grid.
    pub line_count: usize,
}

impl GridBounds {
    pub fn new(row_count: usize, col_count: usize, line_count: usize) -> Self {
        Self {
            max_row: row_count.saturating_sub(1),
            max_col: col_count.saturating_sub(1),
            line_count,
        }
    }

    pub fn last_line(&self) -> Option<usize> {
        self.line_count.checked_sub(1)
    }
}
