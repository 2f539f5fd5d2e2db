use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ropey::Rope;

/// The text input the owner mounts inside a cell while it is being edited.
///
/// Selection offsets are char indices, `start <= end`, both within `0..=len_chars()`.
#[derive(Debug, Clone)]
pub struct EditAffordance {
    rope: Rope,
    selection_start: usize,
    selection_end: usize,
}

impl EditAffordance {
    pub fn new(value: &str) -> Self {
        Self {
            rope: Rope::from_str(value),
            selection_start: 0,
            selection_end: 0,
        }
    }

    pub fn value(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Out-of-range offsets clamp to the end of the value; a start past the end collapses onto it.
    pub fn set_selection_range(&mut self, start: usize, end: usize) {
        let len = self.rope.len_chars();
        let end = end.min(len);
        self.selection_start = start.min(end);
        self.selection_end = end;
    }

    pub fn caret_to_end(&mut self) {
        self.set_selection_range(usize::MAX, usize::MAX);
    }

    /// Replace the whole value. The selection is clamped to the new length.
    pub fn set_value(&mut self, value: &str) {
        self.rope = Rope::from_str(value);
        let (start, end) = self.selection();
        self.set_selection_range(start, end);
    }

    /// Caret row/col (char offsets) of the selection end, for drawing.
    pub fn caret_line_col(&self) -> (usize, usize) {
        let line = self.rope.char_to_line(self.selection_end);
        let col = self.selection_end - self.rope.line_to_char(line);
        (line, col)
    }

    /// Insert a character, replacing any selected text.
    pub fn insert_char(&mut self, ch: char) {
        self.remove_selection();
        self.rope.insert_char(self.selection_start, ch);
        self.selection_start += 1;
        self.selection_end = self.selection_start;
    }

    /// Delete the selection, or the character before the caret.
    pub fn delete_backward(&mut self) {
        if self.remove_selection() || self.selection_start == 0 {
            return;
        }
        let at = self.selection_start;
        self.rope.remove(at - 1..at);
        self.selection_start = at - 1;
        self.selection_end = self.selection_start;
    }

    /// Delete the selection, or the character after the caret.
    pub fn delete_forward(&mut self) {
        if self.remove_selection() || self.selection_end >= self.rope.len_chars() {
            return;
        }
        let at = self.selection_start;
        self.rope.remove(at..at + 1);
    }

    pub fn move_caret_left(&mut self) {
        let target = if self.selection_start == self.selection_end {
            self.selection_start.saturating_sub(1)
        } else {
            self.selection_start
        };
        self.set_selection_range(target, target);
    }

    pub fn move_caret_right(&mut self) {
        let target = if self.selection_start == self.selection_end {
            self.selection_end + 1
        } else {
            self.selection_end
        };
        self.set_selection_range(target, target);
    }

    /// Run the input's own handling for a key the controller left alone.
    /// Returns whether the key did anything.
    pub fn apply_default_key(&mut self, key: KeyEvent) -> bool {
        let plain = key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT;
        match key.code {
            KeyCode::Char(ch) if plain => self.insert_char(ch),
            KeyCode::Enter if plain => self.insert_char('\n'),
            KeyCode::Backspace => self.delete_backward(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_caret_left(),
            KeyCode::Right => self.move_caret_right(),
            KeyCode::Home => self.set_selection_range(0, 0),
            KeyCode::End => self.caret_to_end(),
            _ => return false,
        }
        true
    }

    fn remove_selection(&mut self) -> bool {
        if self.selection_start == self.selection_end {
            return false;
        }
        self.rope.remove(self.selection_start..self.selection_end);
        self.selection_end = self.selection_start;
        true
    }
}
