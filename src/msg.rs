use crossterm::event::{KeyEvent, MouseEvent};
use std::path::PathBuf;

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,

    // -- File I/O
    SaveDocument,
    DocumentChanged(PathBuf),
}
