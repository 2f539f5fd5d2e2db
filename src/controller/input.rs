use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::surface::{ElementId, FocusTarget, GridSurface};

/// Raw input delivered to the controller. Pointer events carry the cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    MouseDown(Option<ElementId>),
    MouseOver(Option<ElementId>),
    MouseUp(Option<ElementId>),
    /// The pointer left the grid.
    MouseLeave,
}

impl InputEvent {
    pub(crate) fn listener(&self) -> Listener {
        match self {
            InputEvent::Key(_) => Listener::KeyDown,
            InputEvent::MouseDown(_) => Listener::MouseDown,
            InputEvent::MouseOver(_) => Listener::MouseOver,
            InputEvent::MouseUp(_) => Listener::MouseUp,
            InputEvent::MouseLeave => Listener::MouseLeave,
        }
    }
}

/// Listeners a controller can hold on its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listener {
    KeyDown,
    MouseDown,
    MouseUp,
    MouseLeave,
    /// Only registered while a pointer drag is extending a range.
    MouseOver,
}

/// Whether the host should still run the input's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Consumed,
    Default,
}

/// Classification of the focused element, resolved once per dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusedKind {
    Root,
    EditAffordance {
        cell: ElementId,
    },
    EditableCell {
        row: usize,
        col: usize,
    },
    LineNumberCell {
        line: usize,
        selectable: bool,
    },
    PlainCell {
        row: usize,
        col: usize,
        text: String,
    },
}

impl FocusedKind {
    pub fn resolve<S: GridSurface + ?Sized>(surface: &S) -> Self {
        let (cell, in_affordance) = match surface.focus_target() {
            FocusTarget::Root => return FocusedKind::Root,
            FocusTarget::Cell(cell) => (cell, false),
            FocusTarget::Affordance(cell) => (cell, true),
        };
        let Some(attrs) = surface.attrs(cell) else {
            return FocusedKind::Root;
        };

        if in_affordance && surface.affordance(cell).is_some() {
            FocusedKind::EditAffordance { cell }
        } else if let Some(line) = attrs.line {
            FocusedKind::LineNumberCell {
                line,
                selectable: attrs.selectable,
            }
        } else if attrs.editable {
            FocusedKind::EditableCell {
                row: attrs.row,
                col: attrs.col,
            }
        } else {
            FocusedKind::PlainCell {
                row: attrs.row,
                col: attrs.col,
                text: attrs.text.trim().to_string(),
            }
        }
    }
}

pub(crate) fn is_press(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}

/// Ctrl+Enter, or Cmd+Enter where the terminal reports it.
pub(crate) fn is_submit_combo(key: &KeyEvent) -> bool {
    key.code == KeyCode::Enter
        && key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META)
}

pub(crate) fn is_plain(key: &KeyEvent) -> bool {
    key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT
}
