//! The rendered grid as the controller sees it.
//!
//! Everything the controller knows about the grid is read through [`GridSurface`] at the
//! moment it needs it. Element handles from an earlier render are not guaranteed to resolve
//! after the owner re-renders.

pub mod affordance;
pub mod rendered;

pub use affordance::EditAffordance;
pub use rendered::RenderedGrid;

use crate::model::{GridBounds, GridMode};

slotmap::new_key_type! {
    /// Handle to one rendered cell element.
    pub struct ElementId;
}

/// What currently holds input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    /// The grid container itself, or nothing inside it.
    #[default]
    Root,
    Cell(ElementId),
    /// The edit affordance mounted inside the given cell.
    Affordance(ElementId),
}

/// Attributes the owner renders onto each cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellAttrs {
    pub row: usize,
    pub col: usize,
    /// Present on line-number cells.
    pub line: Option<usize>,
    pub chunk_id: Option<String>,
    pub col_name: Option<String>,
    pub editable: bool,
    pub deletable: bool,
    pub selectable: bool,
    pub text: String,
}

impl CellAttrs {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A selectable line-number cell for `line`.
    pub fn line_number(line: usize) -> Self {
        Self {
            line: Some(line),
            selectable: true,
            text: (line + 1).to_string(),
            ..Default::default()
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn bound_to(mut self, chunk_id: impl Into<String>, col_name: impl Into<String>) -> Self {
        self.chunk_id = Some(chunk_id.into());
        self.col_name = Some(col_name.into());
        self
    }
}

/// Read/write access to a rendered grid.
///
/// The controller is the only writer of focus and of the per-line selection markers; cell
/// content and structure belong to the owner. Mutating calls on missing elements return
/// `false` and change nothing.
pub trait GridSurface {
    fn mode(&self) -> GridMode;

    /// Re-scan the grid extents.
    fn bounds(&self) -> GridBounds;

    /// Line the owner wants focused after this render.
    fn latest_line(&self) -> Option<usize>;

    fn focus_target(&self) -> FocusTarget;

    fn cell_at(&self, row: usize, col: usize) -> Option<ElementId>;

    fn line_number_cell(&self, line: usize) -> Option<ElementId>;

    fn attrs(&self, id: ElementId) -> Option<&CellAttrs>;

    fn focus(&mut self, target: FocusTarget) -> bool;

    /// Toggle the `data-selected` marker on every cell of the row carrying `line`.
    fn set_line_selected(&mut self, line: usize, selected: bool) -> bool;

    fn is_line_selected(&self, line: usize) -> bool;

    /// Cell that currently has an edit affordance mounted.
    fn editing_cell(&self) -> Option<ElementId>;

    fn affordance(&self, cell: ElementId) -> Option<&EditAffordance>;

    fn affordance_mut(&mut self, cell: ElementId) -> Option<&mut EditAffordance>;
}
