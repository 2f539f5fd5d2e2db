use crate::error::GridError;
use crate::intent::{Intent, Owner};
use crate::model::config::RechunkPayload;
use crate::model::{Direction, GridBounds, LineRange, LineSelection};
use crate::surface::GridSurface;

/// Input that started the current range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Keyboard,
    Pointer,
}

/// Line-range selection used to regroup lines into chunks.
#[derive(Debug, Clone, Default)]
pub struct RangeSelector {
    selection: LineSelection,
    gesture: Option<Gesture>,
    /// Lines currently carrying the selected marker.
    marked: Option<LineRange>,
}

impl RangeSelector {
    pub fn selection(&self) -> LineSelection {
        self.selection
    }

    pub fn is_active(&self) -> bool {
        self.selection.active
    }

    pub fn is_anchored(&self) -> bool {
        self.selection.anchor.is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.selection.is_armed()
    }

    /// A pointer press started the range and the button is still down.
    pub fn is_dragging(&self) -> bool {
        self.is_anchored() && self.gesture == Some(Gesture::Pointer)
    }

    /// Enter selecting mode without a range; the next gesture starts one.
    pub fn arm(&mut self) -> Result<(), GridError> {
        if self.selection.active {
            return Err(GridError::InvalidGesture("already selecting"));
        }
        self.selection.active = true;
        Ok(())
    }

    /// Leave selecting mode if nothing was started. Returns whether it was armed.
    pub fn disarm(&mut self) -> bool {
        if !self.is_armed() {
            return false;
        }
        self.selection.clear();
        true
    }

    /// Pin the anchor at `line`.
    pub fn begin<S, O>(
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
        if self.is_anchored() {
            return Err(GridError::InvalidGesture("range already anchored"));
        }

        self.selection = LineSelection {
            anchor: Some(line),
            current: Some(line),
            active: true,
        };
        self.gesture = Some(gesture);
        owner.push_event(Intent::StartSelection(LineRange::new(line, line)));
        self.apply_markers(surface, Some(LineRange::new(line, line)));
        Ok(())
    }

    /// Move the free end one line. Up never passes the anchor; Down stops at the last line.
    pub fn extend<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        dir: Direction,
        bounds: GridBounds,
    ) -> Result<LineRange, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let (Some(anchor), Some(current)) = (self.selection.anchor, self.selection.current) else {
            return Err(GridError::InvalidGesture("no range to extend"));
        };

        let next = match dir {
            Direction::Up => current.saturating_sub(1).max(anchor),
            Direction::Down => (current + 1).min(bounds.last_line().unwrap_or(anchor)),
            Direction::Left | Direction::Right => {
                return Err(GridError::InvalidGesture("ranges extend vertically"));
            }
        };

        self.selection.current = Some(next);
        let range = LineRange::new(anchor, next);
        owner.push_event(Intent::UpdateSelection(range));
        self.apply_markers(surface, Some(range));
        Ok(range)
    }

    /// Pointer moved over `line` during a drag. Returns whether the free end moved.
    pub fn hover<S, O>(&mut self, surface: &mut S, owner: &mut O, line: usize) -> Result<bool, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let Some(anchor) = self.selection.anchor else {
            return Err(GridError::InvalidGesture("no range to extend"));
        };
        if self.selection.current == Some(line) {
            return Ok(false);
        }

        self.selection.current = Some(line);
        let range = LineRange::new(anchor, line);
        owner.push_event(Intent::UpdateSelection(range));
        self.apply_markers(surface, Some(range));
        Ok(true)
    }

    /// Send the range as a new chunk and clear.
    pub fn commit<S, O>(
        &mut self,
        surface: &mut S,
        owner: &mut O,
        payload: RechunkPayload,
    ) -> Result<LineRange, GridError>
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        let range = self
            .selection
            .range()
            .ok_or(GridError::InvalidGesture("no range to commit"))?;

        let intent = match payload {
            RechunkPayload::Range => Intent::Rechunk(Some(range)),
            RechunkPayload::Bare => Intent::Rechunk(None),
        };
        owner.push_event(intent);
        self.clear(surface);
        Ok(range)
    }

    /// Abandon the range. Only an anchored range was ever reported, so only that one is
    /// cancelled on the owner's side.
    pub fn cancel<S, O>(&mut self, surface: &mut S, owner: &mut O)
    where
        S: GridSurface + ?Sized,
        O: Owner + ?Sized,
    {
        if self.is_anchored() {
            owner.push_event(Intent::CancelSelection);
        }
        self.clear(surface);
    }

    /// Put the markers back after a render replaced the rows. Only the previously marked span
    /// and the live one are touched.
    pub fn restyle<S: GridSurface + ?Sized>(&mut self, surface: &mut S) {
        let next = self.selection.range();
        if let Some(old) = self.marked {
            let (low, high) = old.normalized();
            for line in (low..=high).filter(|line| !next.is_some_and(|r| r.contains(*line))) {
                surface.set_line_selected(line, false);
            }
        }
        if let Some(range) = next {
            let (low, high) = range.normalized();
            for line in low..=high {
                surface.set_line_selected(line, true);
            }
        }
        self.marked = next;
    }

    fn clear<S: GridSurface + ?Sized>(&mut self, surface: &mut S) {
        self.selection.clear();
        self.gesture = None;
        self.apply_markers(surface, None);
    }

    /// Mark lines entering the span and unmark lines leaving it.
    fn apply_markers<S: GridSurface + ?Sized>(&mut self, surface: &mut S, next: Option<LineRange>) {
        let within = |span: Option<LineRange>, line: usize| span.is_some_and(|r| r.contains(line));

        if let Some(old) = self.marked {
            let (low, high) = old.normalized();
            for line in (low..=high).filter(|line| !within(next, *line)) {
                surface.set_line_selected(line, false);
            }
        }
        if let Some(range) = next {
            let (low, high) = range.normalized();
            for line in (low..=high).filter(|line| !within(self.marked, *line)) {
                surface.set_line_selected(line, true);
            }
        }
        self.marked = next;
    }
}
