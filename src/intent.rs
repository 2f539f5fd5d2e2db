//! Named events pushed to the owner of the grid.

use serde_json::{Value, json};

use crate::model::LineRange;

/// Everything the controller can ask of the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartEdit {
        row_index: usize,
        col_index: usize,
    },
    UpdateCell {
        chunk_id: String,
        col_name: String,
        value: String,
    },
    CancelEdit,
    DeleteLine,
    StartSelection(LineRange),
    UpdateSelection(LineRange),
    CancelSelection,
    /// `None` when the range was already sent with `update_selection`.
    Rechunk(Option<LineRange>),
    CellFocused {
        row: usize,
        col: usize,
    },
    CellActivated {
        row: usize,
        col: usize,
        cell_content: String,
    },
    TextSelected {
        text: String,
        chunk_id: String,
        start_offset: usize,
    },
}

impl Intent {
    /// Free-text selection report. Empty selections are not reported.
    pub fn text_selected(text: &str, chunk_id: &str, start_offset: usize) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Some(Intent::TextSelected {
            text: text.to_string(),
            chunk_id: chunk_id.to_string(),
            start_offset,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::StartEdit { .. } => "start_edit",
            Intent::UpdateCell { .. } => "update_cell",
            Intent::CancelEdit => "cancel_edit",
            Intent::DeleteLine => "delete_line",
            Intent::StartSelection(_) => "start_selection",
            Intent::UpdateSelection(_) => "update_selection",
            Intent::CancelSelection => "cancel_selection",
            Intent::Rechunk(_) => "rechunk",
            Intent::CellFocused { .. } => "cell_focused",
            Intent::CellActivated { .. } => "cell_activated",
            Intent::TextSelected { .. } => "text_selected",
        }
    }

    /// Event payload as sent over the wire.
    pub fn payload(&self) -> Value {
        match self {
            Intent::StartEdit {
                row_index,
                col_index,
            } => json!({ "row_index": row_index, "col_index": col_index }),
            Intent::UpdateCell {
                chunk_id,
                col_name,
                value,
            } => json!({ "chunk_id": chunk_id, "col_name": col_name, "value": value }),
            Intent::StartSelection(range)
            | Intent::UpdateSelection(range)
            | Intent::Rechunk(Some(range)) => json!({ "start": range.start, "end": range.end }),
            Intent::CancelEdit | Intent::DeleteLine | Intent::CancelSelection | Intent::Rechunk(None) => {
                json!({})
            }
            Intent::CellFocused { row, col } => json!({ "row": row, "col": col }),
            Intent::CellActivated {
                row,
                col,
                cell_content,
            } => json!({ "row": row, "col": col, "cellContent": cell_content }),
            Intent::TextSelected {
                text,
                chunk_id,
                start_offset,
            } => json!({ "text": text, "chunk_id": chunk_id, "start_offset": start_offset }),
        }
    }
}

/// Receiver of intents. Implementations re-render the grid on their own schedule.
pub trait Owner {
    fn push_event(&mut self, intent: Intent);
}

impl Owner for Vec<Intent> {
    fn push_event(&mut self, intent: Intent) {
        self.push(intent);
    }
}
