use std::collections::HashMap;

use slotmap::SlotMap;
use smallvec::SmallVec;

use super::{CellAttrs, EditAffordance, ElementId, FocusTarget, GridSurface};
use crate::model::{GridBounds, GridMode};

#[derive(Debug, Clone)]
struct CellNode {
    attrs: CellAttrs,
    focused: bool,
    selected: bool,
    affordance: Option<EditAffordance>,
}

/// In-memory grid surface.
///
/// Re-rendering goes through [`RenderedGrid::reset`], which drops every element, so handles
/// taken before the render stop resolving, and focus falls back to the root.
#[derive(Debug, Clone)]
pub struct RenderedGrid {
    nodes: SlotMap<ElementId, CellNode>,
    rows: Vec<SmallVec<[ElementId; 4]>>,
    /// Line index to its line-number cell.
    lines: HashMap<usize, ElementId>,
    columns: Vec<String>,
    mode: GridMode,
    latest_line: Option<usize>,
    focus: FocusTarget,
}

impl RenderedGrid {
    pub fn new<I, S>(mode: GridMode, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: SlotMap::with_key(),
            rows: Vec::new(),
            lines: HashMap::new(),
            columns: columns.into_iter().map(Into::into).collect(),
            mode,
            latest_line: None,
            focus: FocusTarget::Root,
        }
    }

    /// Drop every rendered element and start a fresh render.
    pub fn reset<I, S>(&mut self, mode: GridMode, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.clear();
        self.rows.clear();
        self.lines.clear();
        self.columns = columns.into_iter().map(Into::into).collect();
        self.mode = mode;
        self.latest_line = None;
        self.focus = FocusTarget::Root;
    }

    /// Append a body row. Row and column indices on the attributes are overwritten.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = CellAttrs>) -> usize {
        let row = self.rows.len();
        let mut ids = SmallVec::new();
        for (col, mut attrs) in cells.into_iter().enumerate() {
            attrs.row = row;
            attrs.col = col;
            let line = attrs.line;
            let id = self.nodes.insert(CellNode {
                attrs,
                focused: false,
                selected: false,
                affordance: None,
            });
            if let Some(line) = line {
                self.lines.entry(line).or_insert(id);
            }
            ids.push(id);
        }
        self.rows.push(ids);
        row
    }

    /// Mount an edit affordance holding `value` in the cell at `(row, col)`.
    pub fn mount_affordance(&mut self, row: usize, col: usize, value: &str) -> Option<ElementId> {
        let id = self.cell_at(row, col)?;
        let node = self.nodes.get_mut(id)?;
        node.affordance = Some(EditAffordance::new(value));
        Some(id)
    }

    pub fn set_latest_line(&mut self, line: Option<usize>) {
        self.latest_line = line;
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, row: usize) -> Option<&[ElementId]> {
        self.rows.get(row).map(|ids| ids.as_slice())
    }

    /// Whether the `data-focused` marker is on this cell.
    pub fn is_focused(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.focused)
    }

    /// Whether the `data-selected` marker is on this cell.
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.selected)
    }

    /// The affordance, if it currently has input focus.
    pub fn focused_affordance_mut(&mut self) -> Option<&mut EditAffordance> {
        match self.focus {
            FocusTarget::Affordance(id) => self.affordance_mut(id),
            _ => None,
        }
    }

    fn marker_cell(&self, target: FocusTarget) -> Option<ElementId> {
        match target {
            FocusTarget::Root => None,
            FocusTarget::Cell(id) | FocusTarget::Affordance(id) => Some(id),
        }
    }
}

impl GridSurface for RenderedGrid {
    fn mode(&self) -> GridMode {
        self.mode
    }

    fn bounds(&self) -> GridBounds {
        GridBounds::new(self.rows.len(), self.columns.len(), self.lines.len())
    }

    fn latest_line(&self) -> Option<usize> {
        self.latest_line
    }

    fn focus_target(&self) -> FocusTarget {
        self.focus
    }

    fn cell_at(&self, row: usize, col: usize) -> Option<ElementId> {
        self.rows.get(row)?.get(col).copied()
    }

    fn line_number_cell(&self, line: usize) -> Option<ElementId> {
        self.lines.get(&line).copied()
    }

    fn attrs(&self, id: ElementId) -> Option<&CellAttrs> {
        self.nodes.get(id).map(|node| &node.attrs)
    }

    fn focus(&mut self, target: FocusTarget) -> bool {
        let valid = match target {
            FocusTarget::Root => true,
            FocusTarget::Cell(id) => self.nodes.contains_key(id),
            FocusTarget::Affordance(id) => self
                .nodes
                .get(id)
                .is_some_and(|node| node.affordance.is_some()),
        };
        if !valid {
            return false;
        }

        if let Some(node) = self
            .marker_cell(self.focus)
            .and_then(|id| self.nodes.get_mut(id))
        {
            node.focused = false;
        }
        if let Some(node) = self.marker_cell(target).and_then(|id| self.nodes.get_mut(id)) {
            node.focused = true;
        }
        self.focus = target;
        true
    }

    fn set_line_selected(&mut self, line: usize, selected: bool) -> bool {
        let Some(row) = self
            .line_number_cell(line)
            .map(|id| self.nodes[id].attrs.row)
        else {
            return false;
        };

        for id in self.rows[row].iter() {
            self.nodes[*id].selected = selected;
        }
        true
    }

    fn is_line_selected(&self, line: usize) -> bool {
        self.line_number_cell(line)
            .is_some_and(|id| self.nodes[id].selected)
    }

    fn editing_cell(&self) -> Option<ElementId> {
        self.rows
            .iter()
            .flatten()
            .copied()
            .find(|id| self.nodes[*id].affordance.is_some())
    }

    fn affordance(&self, cell: ElementId) -> Option<&EditAffordance> {
        self.nodes.get(cell)?.affordance.as_ref()
    }

    fn affordance_mut(&mut self, cell: ElementId) -> Option<&mut EditAffordance> {
        self.nodes.get_mut(cell)?.affordance.as_mut()
    }
}
