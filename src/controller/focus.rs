use crate::error::GridError;
use crate::model::{Direction, FocusPosition, GridBounds};
use crate::surface::{FocusTarget, GridSurface};

/// Cell focus. The surface's focused element is the source of truth; the stored position is
/// only a fallback for when focus sits on the root or on an element that was re-rendered away.
#[derive(Debug, Clone, Default)]
pub struct FocusModel {
    last_known: FocusPosition,
}

impl FocusModel {
    pub fn new(initial: FocusPosition) -> Self {
        Self {
            last_known: initial,
        }
    }

    pub fn last_known(&self) -> FocusPosition {
        self.last_known
    }

    pub fn remember(&mut self, pos: FocusPosition) {
        self.last_known = pos;
    }

    /// Position of the focused cell, or the last known one.
    pub fn current<S: GridSurface + ?Sized>(&self, surface: &S) -> FocusPosition {
        let cell = match surface.focus_target() {
            FocusTarget::Root => None,
            FocusTarget::Cell(id) | FocusTarget::Affordance(id) => Some(id),
        };
        cell.and_then(|id| surface.attrs(id))
            .map(|attrs| FocusPosition::new(attrs.row, attrs.col))
            .unwrap_or(self.last_known)
    }

    /// Move one cell in `dir`, clamped to `bounds`.
    pub fn move_focus<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        dir: Direction,
        bounds: GridBounds,
    ) -> Result<FocusPosition, GridError> {
        let target = self.current(surface).step(dir, bounds);
        self.focus_cell(surface, target, bounds)
    }

    /// Focus the cell at `pos` (clamped). A cell that is not rendered leaves focus unchanged.
    pub fn focus_cell<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        pos: FocusPosition,
        bounds: GridBounds,
    ) -> Result<FocusPosition, GridError> {
        let pos = pos.clamped(bounds);
        let id = surface
            .cell_at(pos.row, pos.col)
            .ok_or_else(|| GridError::TargetNotFound(format!("cell ({}, {})", pos.row, pos.col)))?;

        if !surface.focus(FocusTarget::Cell(id)) {
            return Err(GridError::TargetNotFound(format!(
                "cell ({}, {})",
                pos.row, pos.col
            )));
        }
        self.last_known = pos;
        Ok(pos)
    }

    /// Focus the row carrying `line`, keeping the last known column.
    pub fn focus_line<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        line: usize,
        col: usize,
        bounds: GridBounds,
    ) -> Result<FocusPosition, GridError> {
        let row = surface
            .line_number_cell(line)
            .and_then(|id| surface.attrs(id))
            .map(|attrs| attrs.row)
            .ok_or_else(|| GridError::TargetNotFound(format!("line {line}")))?;
        self.focus_cell(surface, FocusPosition::new(row, col), bounds)
    }
}
