//! Input-to-intent state machine for one grid.
//!
//! The controller owns cell focus, at most one edit session and at most one line-range
//! selection. Every handler re-reads the grid through [`GridSurface`] before acting; nothing
//! derived from a previous render is trusted.

pub mod edit;
pub mod focus;
pub mod input;
pub mod range;

use crossterm::event::{KeyCode, KeyEvent};
use smallvec::SmallVec;

use crate::error::GridError;
use crate::intent::{Intent, Owner};
use crate::model::config::{AppConfig, RechunkPayload, RefocusTarget};
use crate::model::{ControllerState, Direction, FocusPosition, GridBounds, LineSelection};
use crate::surface::{ElementId, FocusTarget, GridSurface};

pub use edit::{EditPhase, EditSession, indent_selection};
pub use focus::FocusModel;
pub use input::{FocusedKind, InputEvent, Listener, Propagation};
pub use range::{Gesture, RangeSelector};

use edit::Reconciled;
use input::{is_plain, is_press, is_submit_combo};

/// Behavior switches for one controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub default_cell: FocusPosition,
    pub sentinel_cell: FocusPosition,
    pub gesture_keys: Vec<char>,
    pub rechunk_payload: RechunkPayload,
    pub refocus_after_commit: RefocusTarget,
    pub cancel_on_pointer_leave: bool,
    pub emit_cell_focused: bool,
    pub emit_cell_activated: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_cell: FocusPosition::new(0, 0),
            sentinel_cell: FocusPosition::new(0, 1),
            gesture_keys: vec![' ', 'v', 'V'],
            rechunk_payload: RechunkPayload::Range,
            refocus_after_commit: RefocusTarget::Sentinel,
            cancel_on_pointer_leave: true,
            emit_cell_focused: false,
            emit_cell_activated: false,
        }
    }
}

impl From<&AppConfig> for ControllerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_cell: config.grid.default_cell,
            sentinel_cell: config.grid.sentinel_cell,
            gesture_keys: config.selection.gesture_keys.clone(),
            rechunk_payload: config.selection.rechunk_payload,
            refocus_after_commit: config.selection.refocus_after_commit,
            cancel_on_pointer_leave: config.selection.cancel_on_pointer_leave,
            emit_cell_focused: config.telemetry.cell_focused,
            emit_cell_activated: config.telemetry.cell_activated,
        }
    }
}

/// Focus to restore once the owner has re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingFocus {
    Cell(FocusPosition),
    Line(usize),
}

pub struct GridController {
    config: ControllerConfig,
    focus: FocusModel,
    edit: Option<EditSession>,
    selection: RangeSelector,
    listeners: SmallVec<[Listener; 5]>,
    pending_focus: Option<PendingFocus>,
}

impl GridController {
    pub fn new(config: ControllerConfig) -> Self {
        let focus = FocusModel::new(config.default_cell);
        Self {
            config,
            focus,
            edit: None,
            selection: RangeSelector::default(),
            listeners: SmallVec::new(),
            pending_focus: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Register the grid listeners and sync with the current render.
    pub fn attach<S: GridSurface + ?Sized>(&mut self, surface: &mut S) {
        self.listeners.clear();
        self.listeners.extend([
            Listener::KeyDown,
            Listener::MouseDown,
            Listener::MouseUp,
            Listener::MouseLeave,
        ]);
        tracing::info!(mode = ?surface.mode(), "grid controller attached");
        self.on_rendered(surface);
    }

    /// Drop every listener, the transient drag listener included. A live range is cancelled
    /// since its release would go unheard while detached.
    pub fn detach<S, O>(&mut self, surface: &mut S, owner: &mut O)
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if !self.is_attached() {
            return;
        }
        if self.selection.is_active() {
            self.cancel_selection(surface, owner);
        }
        self.release_listeners();
    }

    fn release_listeners(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        self.listeners.clear();
        tracing::info!("grid controller detached");
    }

    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn listens(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        match (&self.edit, self.selection.is_active()) {
            (Some(edit), _) if edit.phase() == EditPhase::Live => ControllerState::Editing,
            (Some(_), _) => ControllerState::AwaitingRender,
            (None, true) => ControllerState::Selecting,
            (None, false) => ControllerState::Navigating,
        }
    }

    pub fn selection(&self) -> LineSelection {
        self.selection.selection()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn focus_position(&self) -> FocusPosition {
        self.focus.last_known()
    }

    // ── Dispatch ─────────────────────────────────────────────────

    /// Route one raw input. Intents go to `owner` in the order they are produced.
    pub fn dispatch<S, O>(&mut self, surface: &mut S, owner: &mut O, event: InputEvent) -> Propagation
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if !self.listens(event.listener()) {
            return Propagation::Default;
        }

        let result = match event {
            InputEvent::Key(key) => self.on_key(surface, owner, key),
            InputEvent::MouseDown(target) => self.on_mouse_down(surface, owner, target),
            InputEvent::MouseOver(target) => self.on_mouse_over(surface, owner, target),
            InputEvent::MouseUp(target) => self.on_mouse_up(surface, owner, target),
            InputEvent::MouseLeave => self.on_mouse_leave(surface, owner),
        };

        match result {
            Ok(propagation) => propagation,
            Err(err @ GridError::TargetNotFound(_)) => {
                tracing::debug!("input ignored: {err}");
                Propagation::Consumed
            }
            Err(err @ GridError::InvalidGesture(_)) => {
                tracing::debug!("input ignored: {err}");
                Propagation::Default
            }
        }
    }

    /// Re-synchronize after the owner replaced the rendered grid.
    pub fn on_rendered<S: GridSurface + ?Sized>(&mut self, surface: &mut S) {
        let bounds = surface.bounds();

        if self.sync_edit(surface, true) {
            return;
        }
        self.selection.restyle(surface);

        if let Some(pending) = self.pending_focus.take() {
            let restored = match pending {
                PendingFocus::Cell(pos) => self.focus.focus_cell(surface, pos, bounds),
                PendingFocus::Line(line) => {
                    let col = self.focus.last_known().col;
                    self.focus.focus_line(surface, line, col, bounds)
                }
            };
            match restored {
                Ok(_) => return,
                Err(err) => tracing::debug!("pending focus dropped: {err}"),
            }
        }

        if let Some(current) = self.selection.selection().current
            && let Some(cell) = surface.line_number_cell(current)
        {
            surface.focus(FocusTarget::Cell(cell));
            return;
        }

        if surface.mode().is_author()
            && let Some(line) = surface.latest_line()
            && self
                .focus
                .focus_line(surface, line, self.focus.last_known().col, bounds)
                .is_ok()
        {
            return;
        }

        if let Err(err) = self.focus.focus_cell(surface, self.focus.last_known(), bounds) {
            tracing::debug!("focus not restored: {err}");
        }
    }

    /// Reconcile the edit session with the grid. Returns whether an affordance is live.
    fn sync_edit<S: GridSurface + ?Sized>(&mut self, surface: &mut S, rendered: bool) -> bool {
        if self.edit.is_none() {
            let Some(cell) = surface.editing_cell() else {
                return false;
            };
            let Some(attrs) = surface.attrs(cell) else {
                return false;
            };
            self.edit = Some(EditSession::adopt(attrs.row, attrs.col));
        }

        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        match edit.reconcile(surface, rendered) {
            Reconciled::Live => {
                self.focus.remember(edit.target());
                true
            }
            Reconciled::Waiting => false,
            Reconciled::Gone => {
                self.pending_focus = Some(PendingFocus::Cell(edit.target()));
                self.edit = None;
                false
            }
        }
    }

    // ── Keyboard ─────────────────────────────────────────────────

    fn on_key<S, O>(&mut self, surface: &mut S, owner: &mut O, key: KeyEvent) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if !is_press(&key) {
            return Ok(Propagation::Default);
        }

        let bounds = surface.bounds();
        self.sync_edit(surface, false);

        if key.code == KeyCode::Esc {
            return Ok(self.on_escape(surface, owner));
        }

        let focused = FocusedKind::resolve(surface);

        if let Some(edit) = self.edit.as_mut() {
            if edit.phase() != EditPhase::Live {
                return Err(GridError::InvalidGesture("waiting for the owner to render"));
            }
            let FocusedKind::EditAffordance { cell } = focused else {
                return Ok(Propagation::Default);
            };
            return Self::on_edit_key(edit, surface, owner, key, cell);
        }

        match key.code {
            KeyCode::Up | KeyCode::Down if self.selection.is_anchored() => {
                let dir = if key.code == KeyCode::Up {
                    Direction::Up
                } else {
                    Direction::Down
                };
                let range = self.selection.extend(surface, owner, dir, bounds)?;
                if let Some(cell) = surface.line_number_cell(range.end) {
                    surface.focus(FocusTarget::Cell(cell));
                }
                Ok(Propagation::Consumed)
            }
            KeyCode::Left | KeyCode::Right if self.selection.is_anchored() => Ok(Propagation::Consumed),
            KeyCode::Up => self.move_focus(surface, owner, Direction::Up, bounds),
            KeyCode::Down => self.move_focus(surface, owner, Direction::Down, bounds),
            KeyCode::Left => self.move_focus(surface, owner, Direction::Left, bounds),
            KeyCode::Right => self.move_focus(surface, owner, Direction::Right, bounds),
            KeyCode::Enter if is_plain(&key) => self.on_enter(surface, owner, focused, bounds),
            KeyCode::Char(ch) if is_plain(&key) && self.config.gesture_keys.contains(&ch) => {
                self.on_gesture_key(surface, owner, focused)
            }
            _ => Ok(Propagation::Default),
        }
    }

    fn on_edit_key<S, O>(
        edit: &mut EditSession,
        surface: &mut S,
        owner: &mut O,
        key: KeyEvent,
        cell: ElementId,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if is_submit_combo(&key) {
            edit.submit(surface, owner, cell)?;
            return Ok(Propagation::Consumed);
        }

        match key.code {
            KeyCode::Tab => {
                edit.indent(surface, cell)?;
                Ok(Propagation::Consumed)
            }
            KeyCode::Backspace => {
                if edit.delete_if_empty(surface, owner, cell)? {
                    Ok(Propagation::Consumed)
                } else {
                    Ok(Propagation::Default)
                }
            }
            _ => Ok(Propagation::Default),
        }
    }

    /// Escape cancels whatever is in progress, editing first.
    fn on_escape<S, O>(&mut self, surface: &mut S, owner: &mut O) -> Propagation
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if let Some(edit) = self.edit.as_mut() {
            edit.cancel(surface, owner);
            self.pending_focus = Some(PendingFocus::Cell(edit.target()));
            self.focus.remember(edit.target());
            return Propagation::Consumed;
        }

        if self.selection.is_anchored() {
            self.cancel_selection(surface, owner);
            return Propagation::Consumed;
        }

        if self.selection.disarm() {
            tracing::debug!("selecting mode disarmed");
            return Propagation::Consumed;
        }

        Propagation::Default
    }

    fn move_focus<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        dir: Direction,
        bounds: GridBounds,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let pos = self.focus.move_focus(surface, dir, bounds)?;
        if self.config.emit_cell_focused {
            owner.push_event(Intent::CellFocused {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(Propagation::Consumed)
    }

    fn on_enter<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        focused: FocusedKind,
        bounds: GridBounds,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let author = surface.mode().is_author();

        match focused {
            FocusedKind::Root => {
                self.focus.focus_cell(surface, self.config.default_cell, bounds)?;
            }
            FocusedKind::EditAffordance { .. } => return Ok(Propagation::Default),
            _ if self.selection.is_anchored() => self.commit_selection(surface, owner)?,
            FocusedKind::EditableCell { row, col } => {
                if !author {
                    return Err(GridError::InvalidGesture("editing needs author mode"));
                }
                self.start_edit(surface, owner, row, col)?;
            }
            FocusedKind::LineNumberCell { line, selectable } => {
                if !author || !selectable {
                    return Err(GridError::InvalidGesture("line is not selectable"));
                }
                if self.selection.is_armed() {
                    self.begin_selection(surface, owner, line, Gesture::Keyboard)?;
                } else {
                    self.selection.arm()?;
                    tracing::debug!(line, "selecting mode armed");
                }
            }
            FocusedKind::PlainCell { row, col, text } => {
                if !self.config.emit_cell_activated {
                    return Ok(Propagation::Default);
                }
                owner.push_event(Intent::CellActivated {
                    row,
                    col,
                    cell_content: text,
                });
            }
        }
        Ok(Propagation::Consumed)
    }

    /// Space / `v` on a line-number cell starts a range there.
    fn on_gesture_key<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        focused: FocusedKind,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let FocusedKind::LineNumberCell { line, selectable } = focused else {
            return Ok(Propagation::Default);
        };
        if !surface.mode().is_author() || !selectable {
            return Err(GridError::InvalidGesture("line is not selectable"));
        }
        if self.selection.is_anchored() {
            return Ok(Propagation::Consumed);
        }

        self.begin_selection(surface, owner, line, Gesture::Keyboard)?;
        Ok(Propagation::Consumed)
    }

    // ── Pointer ──────────────────────────────────────────────────

    fn on_mouse_down<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        target: Option<ElementId>,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        self.sync_edit(surface, false);

        let Some(line) = selectable_line(surface, target) else {
            if self.selection.is_anchored() {
                self.cancel_selection(surface, owner);
                return Ok(Propagation::Consumed);
            }
            return Ok(Propagation::Default);
        };

        if !surface.mode().is_author() || self.edit.is_some() {
            return Ok(Propagation::Default);
        }

        if self.selection.is_anchored() {
            self.cancel_selection(surface, owner);
        }
        self.begin_selection(surface, owner, line, Gesture::Pointer)?;
        if let Some(cell) = target {
            surface.focus(FocusTarget::Cell(cell));
        }
        Ok(Propagation::Consumed)
    }

    fn on_mouse_over<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        target: Option<ElementId>,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let Some(line) = selectable_line(surface, target) else {
            return Ok(Propagation::Default);
        };
        self.selection.hover(surface, owner, line)?;
        Ok(Propagation::Consumed)
    }

    fn on_mouse_up<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        target: Option<ElementId>,
    ) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let line = selectable_line(surface, target);

        if self.selection.is_dragging() {
            match line {
                Some(line) => {
                    self.selection.hover(surface, owner, line)?;
                    self.commit_selection(surface, owner)?;
                }
                None => self.cancel_selection(surface, owner),
            }
            return Ok(Propagation::Consumed);
        }

        if self.selection.is_anchored() && line.is_none() {
            self.cancel_selection(surface, owner);
            return Ok(Propagation::Consumed);
        }

        Ok(Propagation::Default)
    }

    fn on_mouse_leave<S, O>(&mut self, surface: &mut S, owner: &mut O) -> Result<Propagation, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if self.selection.is_dragging() && self.config.cancel_on_pointer_leave {
            tracing::debug!("pointer left the grid mid-drag");
            self.cancel_selection(surface, owner);
            return Ok(Propagation::Consumed);
        }
        Ok(Propagation::Default)
    }

    // ── Transitions ──────────────────────────────────────────────

    fn start_edit<S, O>(&mut self, surface: &mut S, owner: &mut O, row: usize, col: usize) -> Result<(), GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if self.selection.is_active() {
            return Err(GridError::InvalidGesture("cannot edit while selecting"));
        }
        if self.edit.is_some() || surface.editing_cell().is_some() {
            return Err(GridError::InvalidGesture("already editing"));
        }

        self.focus.remember(FocusPosition::new(row, col));
        self.edit = Some(EditSession::start(owner, row, col));
        Ok(())
    }

    fn begin_selection<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        line: usize,
        gesture: Gesture,
    ) -> Result<(), GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if self.edit.is_some() || surface.editing_cell().is_some() {
            return Err(GridError::InvalidGesture("cannot select while editing"));
        }

        self.selection.begin(surface, owner, line, gesture)?;
        if gesture == Gesture::Pointer && !self.listens(Listener::MouseOver) {
            self.listeners.push(Listener::MouseOver);
        }
        Ok(())
    }

    fn commit_selection<S, O>(&mut self, surface: &mut S, owner: &mut O) -> Result<(), GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let range = self
            .selection
            .commit(surface, owner, self.config.rechunk_payload)?;
        self.drop_drag_listener();

        let bounds = surface.bounds();
        let pending = match self.config.refocus_after_commit {
            RefocusTarget::Sentinel => PendingFocus::Cell(self.config.sentinel_cell),
            RefocusTarget::Anchor => PendingFocus::Line(range.start),
        };
        let focused = match pending {
            PendingFocus::Cell(pos) => self.focus.focus_cell(surface, pos, bounds),
            PendingFocus::Line(line) => self.focus.focus_line(surface, line, 0, bounds),
        };
        if let Err(err) = focused {
            tracing::debug!("refocus after commit deferred: {err}");
        }
        self.pending_focus = Some(pending);
        Ok(())
    }

    fn cancel_selection<S, O>(&mut self, surface: &mut S, owner: &mut O)
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        self.selection.cancel(surface, owner);
        self.drop_drag_listener();
    }

    fn drop_drag_listener(&mut self) {
        self.listeners.retain(|listener| *listener != Listener::MouseOver);
    }
}

impl Drop for GridController {
    fn drop(&mut self) {
        self.release_listeners();
    }
}

/// Line index of `target` if it is a selectable line-number cell.
fn selectable_line<S: GridSurface + ?Sized>(surface: &S, target: Option<ElementId>) -> Option<usize> {
    let attrs = surface.attrs(target?)?;
    attrs.line.filter(|_| attrs.selectable)
}

#[cfg(test)]
mod tests;
