use std::sync::LazyLock;

use regex::Regex;

use crate::error::GridError;
use crate::intent::{Intent, Owner};
use crate::model::FocusPosition;
use crate::surface::{ElementId, FocusTarget, GridSurface};

static LINE_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^").expect("valid line start regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    /// `start_edit` sent, no affordance rendered yet.
    Pending,
    /// The affordance is mounted.
    Live,
    /// `update_cell`, `cancel_edit` or `delete_line` sent; waiting for the read view.
    Closing,
}

/// Outcome of comparing the session with the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciled {
    Live,
    Waiting,
    Gone,
}

/// One cell being typed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target_row: usize,
    pub target_col: usize,
    phase: EditPhase,
    mounted: Option<ElementId>,
}

impl EditSession {
    /// Ask the owner to mount an affordance for `(row, col)`.
    pub fn start<O: Owner + ?Sized>(owner: &mut O, row: usize, col: usize) -> Self {
        owner.push_event(Intent::StartEdit {
            row_index: row,
            col_index: col,
        });
        Self {
            target_row: row,
            target_col: col,
            phase: EditPhase::Pending,
            mounted: None,
        }
    }

    /// Session for an affordance the owner rendered without a `start_edit` from us.
    pub(crate) fn adopt(row: usize, col: usize) -> Self {
        Self {
            target_row: row,
            target_col: col,
            phase: EditPhase::Pending,
            mounted: None,
        }
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn target(&self) -> FocusPosition {
        FocusPosition::new(self.target_row, self.target_col)
    }

    /// Track the affordance. A newly mounted one takes focus with the caret at the end.
    pub(crate) fn reconcile<S: GridSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        rendered: bool,
    ) -> Reconciled {
        let Some(cell) = surface.editing_cell() else {
            return match self.phase {
                EditPhase::Pending if !rendered => Reconciled::Waiting,
                _ => Reconciled::Gone,
            };
        };

        if rendered || self.phase == EditPhase::Pending {
            self.phase = EditPhase::Live;
        }
        if self.mounted != Some(cell) {
            self.mounted = Some(cell);
            if let Some(input) = surface.affordance_mut(cell) {
                input.caret_to_end();
            }
            surface.focus(FocusTarget::Affordance(cell));
        }
        Reconciled::Live
    }

    /// Ctrl/Cmd+Enter: send the affordance's value verbatim.
    pub fn submit<S, O>(&mut self, surface: &S, owner: &mut O, cell: ElementId) -> Result<(), GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let attrs = surface
            .attrs(cell)
            .ok_or_else(|| GridError::TargetNotFound("edited cell".to_string()))?;
        let value = surface
            .affordance(cell)
            .ok_or_else(|| GridError::TargetNotFound("edit affordance".to_string()))?
            .value();

        tracing::debug!(row = attrs.row, col = attrs.col, "submitting cell");
        owner.push_event(Intent::UpdateCell {
            chunk_id: attrs.chunk_id.clone().unwrap_or_default(),
            col_name: attrs.col_name.clone().unwrap_or_default(),
            value,
        });
        self.phase = EditPhase::Closing;
        Ok(())
    }

    /// Escape: abandon the edit and hand focus back to the originating cell.
    pub fn cancel<S, O>(&mut self, surface: &mut S, owner: &mut O)
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        owner.push_event(Intent::CancelEdit);
        if let Some(cell) = surface.cell_at(self.target_row, self.target_col) {
            surface.focus(FocusTarget::Cell(cell));
        }
        self.phase = EditPhase::Closing;
    }

    /// Backspace on an empty affordance of a deletable cell deletes the line.
    /// Returns whether the key was taken.
    pub fn delete_if_empty<S, O>(
        &mut self,
        surface: &S,
        owner: &mut O,
        cell: ElementId,
    ) -> Result<bool, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let input = surface
            .affordance(cell)
            .ok_or_else(|| GridError::TargetNotFound("edit affordance".to_string()))?;
        if !input.is_empty() {
            return Ok(false);
        }
        if !surface.attrs(cell).is_some_and(|attrs| attrs.deletable) {
            return Ok(false);
        }

        tracing::debug!("backspace in empty deletable cell");
        owner.push_event(Intent::DeleteLine);
        self.phase = EditPhase::Closing;
        Ok(true)
    }

    /// Tab: indent the selected lines in place. No owner round-trip.
    pub fn indent<S: GridSurface + ?Sized>(
        &self,
        surface: &mut S,
        cell: ElementId,
    ) -> Result<(), GridError> {
        let input = surface
            .affordance_mut(cell)
            .ok_or_else(|| GridError::TargetNotFound("edit affordance".to_string()))?;
        let (start, end) = input.selection();
        let (value, start, end) = indent_selection(&input.value(), start, end);
        input.set_value(&value);
        input.set_selection_range(start, end);
        Ok(())
    }
}

/// Insert a tab at every line start inside `value[start..end]` (char offsets), counting the
/// selection start itself. Returns the new value and the selection covering the indented text.
pub fn indent_selection(value: &str, start: usize, end: usize) -> (String, usize, usize) {
    let end = end.max(start);
    let start_byte = char_to_byte(value, start);
    let end_byte = char_to_byte(value, end);

    let selected = &value[start_byte..end_byte];
    let count = LINE_START_RE.find_iter(selected).count();
    let indented = LINE_START_RE.replace_all(selected, "\t");

    let mut out = String::with_capacity(value.len() + count);
    out.push_str(&value[..start_byte]);
    out.push_str(&indented);
    out.push_str(&value[end_byte..]);
    (out, start, end + count)
}

fn char_to_byte(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(byte, _)| byte)
}
